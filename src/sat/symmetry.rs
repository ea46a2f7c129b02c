//! Symmetry breaking following Delisle's canonical ordering

use super::clauses::ClauseSink;
use super::literal::Term;
use super::variables::VariableLayout;
use crate::mols::{Axis, RelationDescriptor, ORDER};
use std::ops::Range;

/// Clause counts of each symmetry-breaking part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SymmetryCounts {
    pub rows: usize,
    pub columns: usize,
    pub symbols_a: usize,
    pub symbols_b: usize,
    pub transpose: usize,
    pub swap: usize,
}

impl SymmetryCounts {
    pub fn total(&self) -> usize {
        self.rows + self.columns + self.symbols_a + self.symbols_b + self.transpose + self.swap
    }
}

/// Orders rows, columns and symbols inside their classes, and breaks the
/// transpose and square-swap equivalences when the descriptor allows them
pub struct SymmetryBreaker<'a> {
    layout: &'a VariableLayout,
    descriptor: &'a RelationDescriptor,
}

impl<'a> SymmetryBreaker<'a> {
    pub fn new(layout: &'a VariableLayout, descriptor: &'a RelationDescriptor) -> Self {
        Self { layout, descriptor }
    }

    /// Every part, in emission order, together with its clause counts
    pub fn generate(&self) -> (ClauseSink, SymmetryCounts) {
        let parts = [self.rows(), self.columns(), self.symbols_a(), self.symbols_b(), self.transpose(), self.swap()];
        let [rows, columns, symbols_a, symbols_b, transpose, swap] = parts.each_ref().map(ClauseSink::len);
        let counts = SymmetryCounts { rows, columns, symbols_a, symbols_b, transpose, swap };

        let mut sink = ClauseSink::new();
        for part in parts {
            sink.append(part);
        }

        (sink, counts)
    }

    /// Column 0 of A increases down each row class
    pub fn rows(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();
        let la = &self.layout.la;

        for class in self.descriptor.class_ranges(Axis::Row) {
            for i in all_but_last(&class) {
                for s in 0..ORDER {
                    for s2 in 0..s {
                        sink.implication(&[la.encode(i, 0, s).into()], &[la.encode(i + 1, 0, s2).negative().into()]);
                    }
                }
            }
        }

        sink
    }

    /// Row 0 of A increases along each column class. The first class is only
    /// ordered when rows and columns share a descriptor.
    pub fn columns(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();
        let la = &self.layout.la;
        let first = if self.descriptor.rows_match_columns() { 0 } else { 1 };

        for class in self.descriptor.class_ranges(Axis::Column).into_iter().skip(first) {
            for j in all_but_last(&class) {
                for s in 0..ORDER {
                    for s2 in 0..s {
                        sink.implication(&[la.encode(0, j, s).into()], &[la.encode(0, j + 1, s2).negative().into()]);
                    }
                }
            }
        }

        sink
    }

    pub fn symbols_a(&self) -> ClauseSink {
        self.symbol_order(Axis::SymbolA)
    }

    pub fn symbols_b(&self) -> ClauseSink {
        self.symbol_order(Axis::SymbolB)
    }

    /// Inside a symbol class, symbol s first occurs in column 0 before s + 1
    fn symbol_order(&self, axis: Axis) -> ClauseSink {
        let mut sink = ClauseSink::new();
        let square = if axis == Axis::SymbolA { &self.layout.la } else { &self.layout.lb };

        for class in self.descriptor.class_ranges(axis) {
            for j in 0..ORDER {
                for j2 in 0..j {
                    for s in all_but_last(&class) {
                        sink.implication(&[square.encode(j, 0, s).into()], &[square.encode(j2, 0, s + 1).negative().into()]);
                    }
                }
            }
        }

        sink
    }

    /// (A[1][0], B[1][0]) is lexicographically at most (A[0][1], B[0][1])
    pub fn transpose(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();
        if !self.descriptor.rows_match_columns() {
            return sink;
        }
        let (la, lb) = (&self.layout.la, &self.layout.lb);

        for sp in 0..ORDER {
            for s in 0..sp {
                sink.implication(&[la.encode(1, 0, sp).into()], &[la.encode(0, 1, s).negative().into()]);
            }
            for tp in 0..ORDER {
                for t in 0..tp {
                    let antecedents: [Term; 3] =
                        [la.encode(1, 0, sp).into(), la.encode(0, 1, sp).into(), lb.encode(1, 0, tp).into()];
                    sink.implication(&antecedents, &[lb.encode(0, 1, t).negative().into()]);
                }
            }
        }

        sink
    }

    /// A[1][0] <= B[1][0], and A[2][0] <= B[2][0] when the first two agree
    pub fn swap(&self) -> ClauseSink {
        let mut sink = ClauseSink::new();
        if !self.descriptor.symbols_match() {
            return sink;
        }
        let (la, lb) = (&self.layout.la, &self.layout.lb);

        for tp in 0..ORDER {
            for t in 0..tp {
                sink.implication(&[la.encode(1, 0, tp).into()], &[lb.encode(1, 0, t).negative().into()]);
            }
        }
        for t in 0..ORDER {
            for up in 0..ORDER {
                for u in 0..up {
                    let antecedents: [Term; 3] =
                        [la.encode(1, 0, t).into(), lb.encode(1, 0, t).into(), la.encode(2, 0, up).into()];
                    sink.implication(&antecedents, &[lb.encode(2, 0, u).negative().into()]);
                }
            }
        }

        sink
    }
}

/// The class without its last element; empty classes stay empty
fn all_but_last(class: &Range<usize>) -> Range<usize> {
    class.start..class.end.saturating_sub(1).max(class.start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(groups: [[usize; 3]; 4]) -> SymmetryCounts {
        let layout = VariableLayout::standard();
        let descriptor = RelationDescriptor::new(groups).unwrap();
        SymmetryBreaker::new(&layout, &descriptor).generate().1
    }

    #[test]
    fn test_delisle_counts() {
        let counts = counts([[1, 3, 3]; 4]);
        assert_eq!(
            counts,
            SymmetryCounts { rows: 270, columns: 270, symbols_a: 270, symbols_b: 270, transpose: 495, swap: 495 }
        );
        assert_eq!(counts.total(), 2_070);
    }

    #[test]
    fn test_single_class_counts() {
        let counts = counts([[10, 0, 0]; 4]);
        assert_eq!(counts.rows, 405);
        assert_eq!(counts.columns, 405);
        assert_eq!(counts.symbols_a, 405);
        assert_eq!(counts.symbols_b, 405);
        assert_eq!(counts.transpose, 495);
        assert_eq!(counts.swap, 495);
    }

    #[test]
    fn test_mismatched_groups_skip_equivalences() {
        let counts = counts([[1, 3, 3], [2, 2, 2], [0, 5, 1], [4, 0, 3]]);
        assert_eq!(counts.rows, 270);
        assert_eq!(counts.columns, 225);
        assert_eq!(counts.symbols_a, 315);
        assert_eq!(counts.symbols_b, 315);
        assert_eq!(counts.transpose, 0);
        assert_eq!(counts.swap, 0);
    }

    #[test]
    fn test_row_clause_shape() {
        let layout = VariableLayout::standard();
        let descriptor = RelationDescriptor::default();
        let sink = SymmetryBreaker::new(&layout, &descriptor).rows();
        // first ordered row pair is (1, 2); s = 1, s2 = 0
        let first: Vec<i32> = sink.clauses()[0].literals.iter().map(|l| l.to_dimacs()).collect();
        assert_eq!(
            first,
            vec![-(layout.la.encode(1, 0, 1).id() as i32), -(layout.la.encode(2, 0, 0).id() as i32)]
        );
    }
}
