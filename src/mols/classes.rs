//! Delisle's equivalence classes and the two parity sets R1 / R2

use super::relation::{Axis, RelationDescriptor};
use super::{INCIDENCE_COLUMNS, ORDER};
use std::ops::Range;

/// Class partition derived from a relation descriptor.
///
/// Each axis is cut into four contiguous classes. Class membership is folded
/// into two bits per incidence column: R1 holds the first two classes of every
/// axis, R2 holds the first and third. Combining the bits of two axes gives the
/// class value shared by the encoder and the verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPartition {
    descriptor: RelationDescriptor,
    in_r1: [bool; INCIDENCE_COLUMNS],
    in_r2: [bool; INCIDENCE_COLUMNS],
}

impl ClassPartition {
    pub fn new(descriptor: &RelationDescriptor) -> Self {
        let mut in_r1 = [false; INCIDENCE_COLUMNS];
        let mut in_r2 = [false; INCIDENCE_COLUMNS];

        for axis in Axis::ALL {
            let [a, b, c] = descriptor.group(axis);
            let base = axis.index() * ORDER;
            for x in 0..ORDER {
                in_r1[base + x] = x < a + b;
                in_r2[base + x] = x < a || (a + b <= x && x < a + b + c);
            }
        }

        Self { descriptor: *descriptor, in_r1, in_r2 }
    }

    pub fn descriptor(&self) -> &RelationDescriptor {
        &self.descriptor
    }

    /// The four classes of an axis, in order
    pub fn classes(&self, axis: Axis) -> [Range<usize>; 4] {
        self.descriptor.class_ranges(axis)
    }

    /// Index of the class holding `value` on `axis`
    pub fn class_of(&self, axis: Axis, value: usize) -> usize {
        assert!(value < ORDER, "value {} out of range", value);
        self.classes(axis)
            .iter()
            .position(|range| range.contains(&value))
            .unwrap_or(3)
    }

    /// Membership of incidence column `column` in R1
    pub fn in_r1(&self, column: usize) -> bool {
        self.in_r1[column]
    }

    /// Membership of incidence column `column` in R2
    pub fn in_r2(&self, column: usize) -> bool {
        self.in_r2[column]
    }

    fn bits(&self, axis: Axis, value: usize) -> (usize, usize) {
        assert!(value < ORDER, "value {} out of range", value);
        let column = axis.index() * ORDER + value;
        (self.in_r1[column] as usize, self.in_r2[column] as usize)
    }

    /// Class value of a cell, in {0, 1, 2, 3}
    pub fn rc_class(&self, row: usize, col: usize) -> u8 {
        let (r1, r2) = self.bits(Axis::Row, row);
        let (c1, c2) = self.bits(Axis::Column, col);
        (2 * ((r1 + c1) % 2) + (r2 + c2) % 2) as u8
    }

    /// Class value of a symbol pair (A-symbol, B-symbol), in {0, 1, 2, 3}
    pub fn st_class(&self, s: usize, t: usize) -> u8 {
        let (s1, s2) = self.bits(Axis::SymbolA, s);
        let (t1, t2) = self.bits(Axis::SymbolB, t);
        (2 * ((s1 + t1) % 2) + (s2 + t2) % 2) as u8
    }

    /// Number of columns of `row` that fall in R1 / R2
    pub fn parity_counts(&self, row: &[bool; INCIDENCE_COLUMNS]) -> (usize, usize) {
        row.iter().enumerate().filter(|(_, &set)| set).fold((0, 0), |(r1, r2), (column, _)| {
            (r1 + self.in_r1[column] as usize, r2 + self.in_r2[column] as usize)
        })
    }
}
