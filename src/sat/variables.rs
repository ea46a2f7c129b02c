//! Variable allocation and the coordinate <-> id bijections

use super::clauses::Clause;
use super::literal::Variable;
use crate::mols::{MolsPair, CELLS, INCIDENCE_COLUMNS, ORDER};
use std::fmt;

/// Hands out fresh variable ids, starting from 1
#[derive(Debug, Clone)]
pub struct VariableAllocator {
    /// Next available variable ID
    next_id: u32,
}

impl VariableAllocator {
    pub fn new() -> Self {
        Self { next_id: 1 } // DIMACS variables start from 1
    }

    pub fn new_variable(&mut self) -> Variable {
        let variable = Variable::new(self.next_id);
        self.next_id += 1;
        variable
    }

    /// Allocate `count` consecutive variables and return the first one
    pub fn new_block(&mut self, count: usize) -> Variable {
        assert!(count > 0);
        let first = Variable::new(self.next_id);
        self.next_id += count as u32;
        first
    }

    /// Get the total number of variables created
    pub fn variable_count(&self) -> usize {
        (self.next_id - 1) as usize
    }
}

impl Default for VariableAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// The 100 x 40 adjacency matrix: row `10i + j` is cell (i, j), column `10p + v`
/// is value `v` of parallel class `p` (row, column, A-symbol, B-symbol)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyIndex {
    first: u32,
}

impl AdjacencyIndex {
    pub fn allocate(allocator: &mut VariableAllocator) -> Self {
        Self { first: allocator.new_block(CELLS * INCIDENCE_COLUMNS).id() }
    }

    pub fn encode(&self, row: usize, col: usize) -> Variable {
        assert!(row < CELLS && col < INCIDENCE_COLUMNS, "adjacency ({}, {}) out of bounds", row, col);
        Variable::new(self.first + (row * INCIDENCE_COLUMNS + col) as u32)
    }

    pub fn decode(&self, variable: Variable) -> Option<(usize, usize)> {
        let offset = variable.id().checked_sub(self.first)? as usize;
        (offset < CELLS * INCIDENCE_COLUMNS).then(|| (offset / INCIDENCE_COLUMNS, offset % INCIDENCE_COLUMNS))
    }

    pub fn range(&self) -> std::ops::RangeInclusive<u32> {
        self.first..=self.first + (CELLS * INCIDENCE_COLUMNS) as u32 - 1
    }
}

/// One of the two squares, viewed through the adjacency matrix:
/// `(i, j, k)` aliases adjacency cell `(10i + j, offset + k)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareIndex {
    adjacency: AdjacencyIndex,
    offset: usize,
}

impl SquareIndex {
    pub fn encode(&self, row: usize, col: usize, symbol: usize) -> Variable {
        assert!(row < ORDER && col < ORDER && symbol < ORDER, "square ({}, {}, {}) out of bounds", row, col, symbol);
        self.adjacency.encode(row * ORDER + col, self.offset + symbol)
    }

    pub fn decode(&self, variable: Variable) -> Option<(usize, usize, usize)> {
        let (cell, column) = self.adjacency.decode(variable)?;
        let symbol = column.checked_sub(self.offset).filter(|&s| s < ORDER)?;
        Some((cell / ORDER, cell % ORDER, symbol))
    }
}

/// LZ: `(i, k, l)` is "in row i the pair (B-symbol k, A-symbol l) occurs"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CubeIndex {
    first: u32,
}

impl CubeIndex {
    pub fn allocate(allocator: &mut VariableAllocator) -> Self {
        Self { first: allocator.new_block(ORDER * ORDER * ORDER).id() }
    }

    pub fn encode(&self, i: usize, k: usize, l: usize) -> Variable {
        assert!(i < ORDER && k < ORDER && l < ORDER, "cube ({}, {}, {}) out of bounds", i, k, l);
        Variable::new(self.first + (i * ORDER * ORDER + k * ORDER + l) as u32)
    }

    pub fn decode(&self, variable: Variable) -> Option<(usize, usize, usize)> {
        let offset = variable.id().checked_sub(self.first)? as usize;
        (offset < ORDER * ORDER * ORDER).then(|| (offset / (ORDER * ORDER), offset / ORDER % ORDER, offset % ORDER))
    }
}

/// Which family a variable id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Adjacency { row: usize, col: usize },
    Pair { row: usize, b_symbol: usize, a_symbol: usize },
    Auxiliary,
}

/// The structural variables of the encoding, allocated in a fixed order:
/// adjacency matrix first (ids 1..=4000), then LZ (4001..=5000)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    pub adjacency: AdjacencyIndex,
    pub la: SquareIndex,
    pub lb: SquareIndex,
    pub lz: CubeIndex,
}

impl VariableLayout {
    pub fn allocate(allocator: &mut VariableAllocator) -> Self {
        let adjacency = AdjacencyIndex::allocate(allocator);
        let lz = CubeIndex::allocate(allocator);
        Self {
            adjacency,
            la: SquareIndex { adjacency, offset: 2 * ORDER },
            lb: SquareIndex { adjacency, offset: 3 * ORDER },
            lz,
        }
    }

    /// The layout every encoding uses, without keeping the allocator around
    pub fn standard() -> Self {
        Self::allocate(&mut VariableAllocator::new())
    }

    /// Number of ids reserved by the layout itself
    pub fn structural_count(&self) -> usize {
        CELLS * INCIDENCE_COLUMNS + ORDER * ORDER * ORDER
    }

    pub fn kind(&self, variable: Variable) -> VariableKind {
        if let Some((row, col)) = self.adjacency.decode(variable) {
            VariableKind::Adjacency { row, col }
        } else if let Some((row, b_symbol, a_symbol)) = self.lz.decode(variable) {
            VariableKind::Pair { row, b_symbol, a_symbol }
        } else {
            VariableKind::Auxiliary
        }
    }

    /// Unit clauses fixing every LA / LB variable to the given squares
    pub fn pin(&self, pair: &MolsPair) -> Vec<Clause> {
        let mut clauses = Vec::with_capacity(2 * ORDER * ORDER * ORDER);
        for (square, index) in [(&pair.a, &self.la), (&pair.b, &self.lb)] {
            for row in 0..ORDER {
                for col in 0..ORDER {
                    for symbol in 0..ORDER {
                        let variable = index.encode(row, col, symbol);
                        let literal = if square.get(row, col) == symbol {
                            variable.positive()
                        } else {
                            variable.negative()
                        };
                        clauses.push(Clause::unit(literal));
                    }
                }
            }
        }
        clauses
    }
}

impl Default for VariableLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub adjacency_variables: usize,
    pub pair_variables: usize,
    pub auxiliary_variables: usize,
}

impl VariableStatistics {
    pub fn new(layout: &VariableLayout, total_variables: usize) -> Self {
        Self {
            total_variables,
            adjacency_variables: CELLS * INCIDENCE_COLUMNS,
            pair_variables: ORDER * ORDER * ORDER,
            auxiliary_variables: total_variables.saturating_sub(layout.structural_count()),
        }
    }
}

impl fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Adjacency matrix: {}", self.adjacency_variables)?;
        writeln!(f, "  Symbol pairs (LZ): {}", self.pair_variables)?;
        writeln!(f, "  Counter auxiliaries: {}", self.auxiliary_variables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mols::square::tests::relation_pair;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut allocator = VariableAllocator::new();
        assert_eq!(allocator.new_variable().id(), 1);
        assert_eq!(allocator.new_variable().id(), 2);
        assert_eq!(allocator.new_block(5).id(), 3);
        assert_eq!(allocator.new_variable().id(), 8);
        assert_eq!(allocator.variable_count(), 8);
    }

    #[test]
    fn test_layout_ids() {
        let layout = VariableLayout::standard();
        assert_eq!(layout.adjacency.encode(0, 0).id(), 1);
        assert_eq!(layout.adjacency.encode(99, 39).id(), 4000);
        assert_eq!(layout.la.encode(0, 0, 0).id(), 21);
        assert_eq!(layout.lb.encode(1, 2, 3).id(), 40 * 12 + 33 + 1);
        assert_eq!(layout.lz.encode(0, 0, 0).id(), 4001);
        assert_eq!(layout.lz.encode(9, 9, 9).id(), 5000);
        assert_eq!(layout.structural_count(), 5000);
    }

    #[test]
    fn test_adjacency_bijection() {
        let layout = VariableLayout::standard();
        for id in layout.adjacency.range() {
            let (row, col) = layout.adjacency.decode(Variable::new(id)).unwrap();
            assert_eq!(layout.adjacency.encode(row, col).id(), id);
        }
        assert_eq!(layout.adjacency.decode(Variable::new(4001)), None);
    }

    #[test]
    fn test_square_and_cube_bijections() {
        let layout = VariableLayout::standard();
        for i in 0..ORDER {
            for j in 0..ORDER {
                for k in 0..ORDER {
                    assert_eq!(layout.la.decode(layout.la.encode(i, j, k)), Some((i, j, k)));
                    assert_eq!(layout.lb.decode(layout.lb.encode(i, j, k)), Some((i, j, k)));
                    assert_eq!(layout.lz.decode(layout.lz.encode(i, j, k)), Some((i, j, k)));
                    assert_eq!(layout.la.decode(layout.lb.encode(i, j, k)), None);
                }
            }
        }
        // adjacency columns of the first two classes are not square variables
        assert_eq!(layout.la.decode(layout.adjacency.encode(5, 3)), None);
    }

    #[test]
    fn test_variable_kinds() {
        let layout = VariableLayout::standard();
        assert_eq!(layout.kind(Variable::new(41)), VariableKind::Adjacency { row: 1, col: 0 });
        assert_eq!(layout.kind(Variable::new(4012)), VariableKind::Pair { row: 0, b_symbol: 1, a_symbol: 1 });
        assert_eq!(layout.kind(Variable::new(5001)), VariableKind::Auxiliary);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_panics() {
        VariableLayout::standard().la.encode(10, 0, 0);
    }

    #[test]
    fn test_pin() {
        let layout = VariableLayout::standard();
        let pair = relation_pair();
        let clauses = layout.pin(&pair);
        assert_eq!(clauses.len(), 2000);
        assert!(clauses.iter().all(Clause::is_unit));
        let positives = clauses.iter().filter(|c| c.literals[0].is_positive()).count();
        assert_eq!(positives, 200);
        assert!(clauses.contains(&Clause::unit(layout.la.encode(0, 1, 7).positive())));
    }

    #[test]
    fn test_statistics() {
        let layout = VariableLayout::standard();
        let stats = VariableStatistics::new(&layout, 13100);
        assert_eq!(stats.auxiliary_variables, 8100);
        assert!(stats.to_string().contains("Total variables: 13100"));
    }
}
