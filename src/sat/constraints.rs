//! Constraint families over the shared variable layout

use super::cardinality::exactly_one;
use super::clauses::{ClauseSink, CnfBuilder};
use super::literal::{Literal, Term};
use super::variables::VariableLayout;
use crate::mols::{ClassPartition, CELLS, ORDER};
use itertools::iproduct;

/// Generates the Latin, orthogonality, fixed-prefix and relation families
#[derive(Debug, Clone)]
pub struct ConstraintGenerator<'a> {
    layout: &'a VariableLayout,
    partition: &'a ClassPartition,
}

impl<'a> ConstraintGenerator<'a> {
    pub fn new(layout: &'a VariableLayout, partition: &'a ClassPartition) -> Self {
        Self { layout, partition }
    }

    /// Exactly-one constraints making LA, LB and LZ Latin-square shaped.
    ///
    /// This is the only family that allocates (counter auxiliaries), so it
    /// runs against the builder directly.
    pub fn latin_squares(&self, builder: &mut CnfBuilder) {
        for i in 0..ORDER {
            for j in 0..ORDER {
                Self::latin_lines(builder, |a, b, c| self.layout.la.encode(a, b, c).positive(), i, j);
                Self::latin_lines(builder, |a, b, c| self.layout.lb.encode(a, b, c).positive(), i, j);
                Self::latin_lines(builder, |a, b, c| self.layout.lz.encode(a, b, c).positive(), i, j);
            }
        }
    }

    /// Cell (i, j) holds one symbol, row i holds symbol j once, column i holds symbol j once
    fn latin_lines<F: Fn(usize, usize, usize) -> Literal>(builder: &mut CnfBuilder, cube: F, i: usize, j: usize) {
        let cell: Vec<Literal> = (0..ORDER).map(|k| cube(i, j, k)).collect();
        let row: Vec<Literal> = (0..ORDER).map(|k| cube(i, k, j)).collect();
        let column: Vec<Literal> = (0..ORDER).map(|k| cube(k, i, j)).collect();
        exactly_one(builder, &cell);
        exactly_one(builder, &row);
        exactly_one(builder, &column);
    }

    /// Link LA and LB through LZ so every symbol pair occurs
    pub fn orthogonality(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();
        let VariableLayout { la, lb, lz, .. } = self.layout;

        for (i, j, k, l) in iproduct!(0..ORDER, 0..ORDER, 0..ORDER, 0..ORDER) {
            let b: Term = lb.encode(i, j, k).into();
            let a: Term = la.encode(i, j, l).into();
            let z: Term = lz.encode(i, k, l).into();
            sink.implication(&[b, a], &[z]);
            sink.implication(&[b, z], &[a]);
            sink.implication(&[a, z], &[b]);
        }

        sink
    }

    /// Pin the row and column parallel classes: cell row `r` sits in row `r / 10`
    /// and column `r % 10`
    pub fn fixed_prefix(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();
        let adjacency = &self.layout.adjacency;

        for row in 0..CELLS {
            for col in 0..ORDER {
                let variable = adjacency.encode(row, col);
                sink.clause([if col == row / ORDER { variable.positive() } else { variable.negative() }]);
            }
            for col in ORDER..2 * ORDER {
                let variable = adjacency.encode(row, col);
                sink.clause([if col == ORDER + row % ORDER { variable.positive() } else { variable.negative() }]);
            }
        }

        sink
    }

    /// Forbid symbol pairs whose class differs from the class of their cell
    pub fn relation(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();

        for (r, c, s, t) in iproduct!(0..ORDER, 0..ORDER, 0..ORDER, 0..ORDER) {
            if self.partition.rc_class(r, c) != self.partition.st_class(s, t) {
                sink.clause([
                    self.layout.la.encode(r, c, s).negative(),
                    self.layout.lb.encode(r, c, t).negative(),
                ]);
            }
        }

        sink
    }
}
