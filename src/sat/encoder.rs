//! Builds the complete CNF instance for a relation descriptor

use super::clauses::{ClauseSink, Cnf, CnfBuilder};
use super::constraints::ConstraintGenerator;
use super::symmetry::{SymmetryBreaker, SymmetryCounts};
use super::variables::{VariableLayout, VariableStatistics};
use crate::mols::{ClassPartition, RelationDescriptor, ORDER};
use std::fmt;
use tracing::{debug, info};

/// Knobs of the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingOptions {
    pub symmetry_breaking: bool,
    /// Generate the non-allocating families on the rayon pool
    pub parallel: bool,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self { symmetry_breaking: true, parallel: true }
    }
}

/// A finished encoding together with its statistics
#[derive(Debug, Clone)]
pub struct Encoding {
    pub cnf: Cnf,
    pub layout: VariableLayout,
    pub statistics: EncodingStatistics,
}

/// Main encoder for the MOLS(10) relation problem
pub struct MolsEncoder {
    descriptor: RelationDescriptor,
    partition: ClassPartition,
    options: EncodingOptions,
}

impl MolsEncoder {
    pub fn new(descriptor: RelationDescriptor, options: EncodingOptions) -> Self {
        Self { partition: ClassPartition::new(&descriptor), descriptor, options }
    }

    pub fn descriptor(&self) -> &RelationDescriptor {
        &self.descriptor
    }

    /// Variable count shared by every encoding: the structural variables plus
    /// one exactly-one counter (ORDER - 1 auxiliaries) per Latin line
    pub fn variable_count() -> usize {
        let latin_lines = 3 * 3 * ORDER * ORDER;
        VariableLayout::standard().structural_count() + latin_lines * (ORDER - 1)
    }

    /// Allocate every variable, then append the families in their fixed order:
    /// Latin, orthogonality, fixed prefix, symmetry breaking, relation
    pub fn encode(&self) -> Encoding {
        let mut builder = CnfBuilder::new();
        let layout = VariableLayout::allocate(builder.allocator_mut());
        let generator = ConstraintGenerator::new(&layout, &self.partition);

        generator.latin_squares(&mut builder);
        let latin = builder.clause_count();
        debug!(clauses = latin, variables = builder.variable_count(), "latin square constraints");

        let families = if self.options.parallel {
            let ((orthogonality, fixed_prefix), (symmetry, relation)) = rayon::join(
                || rayon::join(|| generator.orthogonality(), || generator.fixed_prefix()),
                || rayon::join(|| self.symmetry(&layout), || generator.relation()),
            );
            Families { orthogonality, fixed_prefix, symmetry, relation }
        } else {
            Families {
                orthogonality: generator.orthogonality(),
                fixed_prefix: generator.fixed_prefix(),
                symmetry: self.symmetry(&layout),
                relation: generator.relation(),
            }
        };

        let (symmetry_sink, symmetry_counts) = families.symmetry;
        debug!(clauses = families.orthogonality.len(), "orthogonality constraints");
        debug!(clauses = families.fixed_prefix.len(), "fixed prefix constraints");
        debug!(clauses = symmetry_counts.total(), "symmetry breaking constraints");
        debug!(clauses = families.relation.len(), "relation constraints");

        let orthogonality = families.orthogonality.len();
        let fixed_prefix = families.fixed_prefix.len();
        let relation = families.relation.len();
        builder.append(families.orthogonality);
        builder.append(families.fixed_prefix);
        builder.append(symmetry_sink);
        builder.append(families.relation);

        let cnf = builder.finish();
        let statistics = EncodingStatistics {
            descriptor: self.descriptor,
            variables: VariableStatistics::new(&layout, cnf.variable_count()),
            latin,
            orthogonality,
            fixed_prefix,
            symmetry: symmetry_counts,
            relation,
            total_clauses: cnf.clause_count(),
        };

        info!(
            relation = %self.descriptor,
            variables = cnf.variable_count(),
            clauses = cnf.clause_count(),
            "encoding complete"
        );

        Encoding { cnf, layout, statistics }
    }

    fn symmetry(&self, layout: &VariableLayout) -> (ClauseSink, SymmetryCounts) {
        if self.options.symmetry_breaking {
            SymmetryBreaker::new(layout, &self.descriptor).generate()
        } else {
            (ClauseSink::new(), SymmetryCounts::default())
        }
    }
}

struct Families {
    orthogonality: ClauseSink,
    fixed_prefix: ClauseSink,
    symmetry: (ClauseSink, SymmetryCounts),
    relation: ClauseSink,
}

/// Statistics about the SAT encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingStatistics {
    pub descriptor: RelationDescriptor,
    pub variables: VariableStatistics,
    pub latin: usize,
    pub orthogonality: usize,
    pub fixed_prefix: usize,
    pub symmetry: SymmetryCounts,
    pub relation: usize,
    pub total_clauses: usize,
}

impl fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Relation: {}", self.descriptor)?;
        writeln!(f, "  Total variables: {}", self.variables.total_variables)?;
        writeln!(f, "  Counter auxiliaries: {}", self.variables.auxiliary_variables)?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        writeln!(f, "    Latin squares: {}", self.latin)?;
        writeln!(f, "    Orthogonality: {}", self.orthogonality)?;
        writeln!(f, "    Fixed prefix: {}", self.fixed_prefix)?;
        writeln!(f, "    Symmetry breaking: {}", self.symmetry.total())?;
        writeln!(f, "      rows {} / columns {} / A symbols {} / B symbols {}",
                 self.symmetry.rows, self.symmetry.columns, self.symmetry.symbols_a, self.symmetry.symbols_b)?;
        writeln!(f, "      transpose {} / swap {}", self.symmetry.transpose, self.symmetry.swap)?;
        writeln!(f, "    Relation: {}", self.relation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(groups: [[usize; 3]; 4], options: EncodingOptions) -> Encoding {
        MolsEncoder::new(RelationDescriptor::new(groups).unwrap(), options).encode()
    }

    #[test]
    fn test_delisle_totals() {
        let encoding = encode([[1, 3, 3]; 4], EncodingOptions::default());
        assert_eq!(encoding.cnf.variable_count(), 13_100);
        assert_eq!(encoding.cnf.clause_count(), 73_958);
        assert_eq!(encoding.statistics.relation, 7_488);
        assert_eq!(encoding.cnf.max_variable() as usize, encoding.cnf.variable_count());
        assert_eq!(MolsEncoder::variable_count(), 13_100);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let groups = [[1, 3, 3], [2, 2, 2], [0, 5, 1], [4, 0, 3]];
        let parallel = encode(groups, EncodingOptions { symmetry_breaking: true, parallel: true });
        let sequential = encode(groups, EncodingOptions { symmetry_breaking: true, parallel: false });
        assert_eq!(parallel.cnf, sequential.cnf);
        assert_eq!(parallel.cnf.clause_count(), 73_049);
    }

    #[test]
    fn test_without_symmetry_breaking() {
        let encoding = encode([[1, 3, 3]; 4], EncodingOptions { symmetry_breaking: false, parallel: false });
        assert_eq!(encoding.statistics.symmetry.total(), 0);
        assert_eq!(encoding.cnf.clause_count(), 73_958 - 2_070);
    }

    #[test]
    fn test_statistics_display() {
        let encoding = encode([[10, 0, 0]; 4], EncodingOptions::default());
        let text = encoding.statistics.to_string();
        assert!(text.contains("Total clauses: 67010"));
        assert!(text.contains("Relation: 0"));
    }
}
