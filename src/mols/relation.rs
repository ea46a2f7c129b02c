//! Relation descriptors for pairs of orthogonal Latin squares

use super::{ORDER, PARALLEL_CLASSES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// Errors raised while reading or validating a relation descriptor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("relation descriptor is not a JSON array of integer arrays: {0}")]
    Json(String),
    #[error("relation descriptor must have {expected} groups, found {found}")]
    GroupCount { expected: usize, found: usize },
    #[error("group {group} must have exactly 3 class sizes, found {found}")]
    TripleArity { group: usize, found: usize },
    #[error("group {group} has negative class size {value}")]
    Negative { group: usize, value: i64 },
    #[error("group {group} class sizes {sizes:?} sum to {sum}, more than {max}", max = ORDER)]
    SumTooLarge { group: usize, sizes: [usize; 3], sum: usize },
}

/// The four index axes of an orthogonal array built from two squares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Row,
    Column,
    SymbolA,
    SymbolB,
}

impl Axis {
    pub const ALL: [Axis; PARALLEL_CLASSES] = [Axis::Row, Axis::Column, Axis::SymbolA, Axis::SymbolB];

    /// Position of the axis inside a descriptor and inside the 40-column incidence space
    pub fn index(self) -> usize {
        match self {
            Axis::Row => 0,
            Axis::Column => 1,
            Axis::SymbolA => 2,
            Axis::SymbolB => 3,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Row => "row",
            Axis::Column => "column",
            Axis::SymbolA => "symbol of A",
            Axis::SymbolB => "symbol of B",
        };
        f.write_str(name)
    }
}

/// Prescribed intersection pattern between the two resolvable designs.
///
/// Each group holds the sizes of the first three equivalence classes of one
/// axis; the fourth class takes whatever remains of the ten indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<usize>>")]
pub struct RelationDescriptor {
    groups: [[usize; 3]; PARALLEL_CLASSES],
}

impl RelationDescriptor {
    /// Create a descriptor, checking every group sums to at most the square order
    pub fn new(groups: [[usize; 3]; PARALLEL_CLASSES]) -> Result<Self, DescriptorError> {
        for (group, sizes) in groups.iter().enumerate() {
            match sizes.iter().try_fold(0usize, |acc, &size| acc.checked_add(size)) {
                Some(sum) if sum <= ORDER => {}
                sum => {
                    let sum = sum.unwrap_or(usize::MAX);
                    return Err(DescriptorError::SumTooLarge { group, sizes: *sizes, sum });
                }
            }
        }
        Ok(Self { groups })
    }

    /// Parse the JSON array-of-arrays form, e.g. `[[1,3,3],[1,3,3],[1,3,3],[1,3,3]]`
    pub fn from_json(text: &str) -> Result<Self, DescriptorError> {
        let raw: Vec<Vec<i64>> =
            serde_json::from_str(text.trim()).map_err(|e| DescriptorError::Json(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Serialize back to the compact JSON form
    pub fn to_json(&self) -> String {
        self.to_string()
    }

    /// Class sizes of one axis (the implicit fourth size is not included)
    pub fn group(&self, axis: Axis) -> [usize; 3] {
        self.groups[axis.index()]
    }

    pub fn groups(&self) -> &[[usize; 3]; PARALLEL_CLASSES] {
        &self.groups
    }

    /// The four contiguous equivalence classes of an axis
    pub fn class_ranges(&self, axis: Axis) -> [Range<usize>; 4] {
        let [a, b, c] = self.group(axis);
        [0..a, a..a + b, a + b..a + b + c, a + b + c..ORDER]
    }

    /// Rows and columns share a descriptor, so the transpose symmetry applies
    pub fn rows_match_columns(&self) -> bool {
        self.group(Axis::Row) == self.group(Axis::Column)
    }

    /// Both symbol axes share a descriptor, so the square swap symmetry applies
    pub fn symbols_match(&self) -> bool {
        self.group(Axis::SymbolA) == self.group(Axis::SymbolB)
    }
}

impl Default for RelationDescriptor {
    fn default() -> Self {
        Self { groups: [[1, 3, 3]; PARALLEL_CLASSES] }
    }
}

impl TryFrom<Vec<Vec<i64>>> for RelationDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: Vec<Vec<i64>>) -> Result<Self, Self::Error> {
        if raw.len() != PARALLEL_CLASSES {
            return Err(DescriptorError::GroupCount { expected: PARALLEL_CLASSES, found: raw.len() });
        }

        let mut groups = [[0usize; 3]; PARALLEL_CLASSES];
        for (group, triple) in raw.iter().enumerate() {
            if triple.len() != 3 {
                return Err(DescriptorError::TripleArity { group, found: triple.len() });
            }
            for (slot, &value) in triple.iter().enumerate() {
                if value < 0 {
                    return Err(DescriptorError::Negative { group, value });
                }
                // anything this large fails the sum check below anyway
                groups[group][slot] = usize::try_from(value).unwrap_or(usize::MAX);
            }
        }

        Self::new(groups)
    }
}

impl From<RelationDescriptor> for Vec<Vec<usize>> {
    fn from(descriptor: RelationDescriptor) -> Self {
        descriptor.groups.iter().map(|g| g.to_vec()).collect()
    }
}

impl fmt::Display for RelationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, [a, b, c]) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "[{},{},{}]", a, b, c)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_documented_example() {
        let descriptor = RelationDescriptor::from_json("[[1,3,3],[1,3,3],[1,3,3],[1,3,3]]").unwrap();
        assert_eq!(descriptor, RelationDescriptor::default());
        assert!(descriptor.rows_match_columns());
        assert!(descriptor.symbols_match());
        assert_eq!(descriptor.to_json(), "[[1,3,3],[1,3,3],[1,3,3],[1,3,3]]");
    }

    #[test]
    fn test_class_ranges() {
        let descriptor = RelationDescriptor::new([[1, 3, 3], [2, 2, 2], [0, 5, 1], [10, 0, 0]]).unwrap();
        assert_eq!(descriptor.class_ranges(Axis::Row), [0..1, 1..4, 4..7, 7..10]);
        assert_eq!(descriptor.class_ranges(Axis::SymbolA), [0..0, 0..5, 5..6, 6..10]);
        assert_eq!(descriptor.class_ranges(Axis::SymbolB), [0..10, 10..10, 10..10, 10..10]);
        assert!(!descriptor.rows_match_columns());
        assert!(!descriptor.symbols_match());
    }

    #[test]
    fn test_malformed_descriptors() {
        assert!(matches!(
            RelationDescriptor::from_json("[[1,3,3],[1,3,3],[1,3,3]]"),
            Err(DescriptorError::GroupCount { expected: 4, found: 3 })
        ));
        assert!(matches!(
            RelationDescriptor::from_json("[[1,3,3],[1,3],[1,3,3],[1,3,3]]"),
            Err(DescriptorError::TripleArity { group: 1, found: 2 })
        ));
        assert!(matches!(
            RelationDescriptor::from_json("[[1,3,3],[1,3,3],[-1,3,3],[1,3,3]]"),
            Err(DescriptorError::Negative { group: 2, value: -1 })
        ));
        assert!(matches!(
            RelationDescriptor::from_json("[[1,3,3],[1,3,3],[1,3,3],[4,4,3]]"),
            Err(DescriptorError::SumTooLarge { group: 3, sum: 11, .. })
        ));
        assert!(matches!(
            RelationDescriptor::from_json("not json"),
            Err(DescriptorError::Json(_))
        ));
    }

    #[test]
    fn test_huge_sizes_do_not_overflow() {
        let groups = [[usize::MAX, 1, 0], [1, 3, 3], [1, 3, 3], [1, 3, 3]];
        assert_eq!(
            RelationDescriptor::new(groups),
            Err(DescriptorError::SumTooLarge { group: 0, sizes: [usize::MAX, 1, 0], sum: usize::MAX })
        );
        assert!(matches!(
            RelationDescriptor::from_json(&format!("[[1,3,3],[{0},{0},{0}],[1,3,3],[1,3,3]]", i64::MAX)),
            Err(DescriptorError::SumTooLarge { group: 1, .. })
        ));
    }

    #[test]
    fn test_serde_validates() {
        let descriptor: RelationDescriptor = serde_yaml::from_str("[[10, 0, 0], [10, 0, 0], [10, 0, 0], [10, 0, 0]]").unwrap();
        assert_eq!(descriptor.group(Axis::Column), [10, 0, 0]);

        let bad: Result<RelationDescriptor, _> = serde_yaml::from_str("[[9, 9, 9], [1, 3, 3], [1, 3, 3], [1, 3, 3]]");
        assert!(bad.is_err());
    }
}
