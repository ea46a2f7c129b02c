//! The vertex-colored graph of a pair of squares

use crate::mols::{MolsPair, CELLS, INCIDENCE_COLUMNS, ORDER, PARALLEL_CLASSES};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("cell vertex {vertex} has {found} value neighbours, expected one per axis")]
    MalformedCell { vertex: usize, found: usize },
    #[error("axes {first} and {second} do not determine a unique cell: values ({x}, {y}) occur {count} times")]
    NotOrthogonalArray { first: usize, second: usize, x: usize, y: usize, count: usize },
}

/// Colour tier of a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexColor {
    Axis,
    Value,
    Cell,
}

/// 4 axis vertices, 40 value vertices and 100 cell vertices.
///
/// Axis `p` is joined to its ten values `4 + 10p + v`; cell `(i, j)` is joined
/// to the value vertices of its row, column, A-symbol and B-symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColoredGraph {
    adjacency: Vec<Vec<usize>>,
}

const VALUE_BASE: usize = PARALLEL_CLASSES;
const CELL_BASE: usize = PARALLEL_CLASSES + INCIDENCE_COLUMNS;

impl ColoredGraph {
    pub fn from_pair(pair: &MolsPair) -> Self {
        let mut graph = Self { adjacency: vec![Vec::new(); CELL_BASE + CELLS] };

        for axis in 0..PARALLEL_CLASSES {
            for value in 0..ORDER {
                graph.add_edge(axis, VALUE_BASE + axis * ORDER + value);
            }
        }
        for (cell, block) in pair.orthogonal_array().into_iter().enumerate() {
            for (axis, value) in block.into_iter().enumerate() {
                graph.add_edge(CELL_BASE + cell, VALUE_BASE + axis * ORDER + value);
            }
        }

        graph
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        self.adjacency[u].push(v);
        self.adjacency[v].push(u);
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbours(&self, vertex: usize) -> &[usize] {
        &self.adjacency[vertex]
    }

    pub fn color(&self, vertex: usize) -> VertexColor {
        match vertex {
            v if v < VALUE_BASE => VertexColor::Axis,
            v if v < CELL_BASE => VertexColor::Value,
            _ => VertexColor::Cell,
        }
    }

    /// The three colour classes, in tier order
    pub fn color_classes(&self) -> [std::ops::Range<usize>; 3] {
        [0..VALUE_BASE, VALUE_BASE..CELL_BASE, CELL_BASE..self.vertex_count()]
    }

    /// Read the blocks `(row, column, A-symbol, B-symbol)` back off the cell
    /// vertices, checking that any two axes determine the block
    pub fn orthogonal_array(&self) -> Result<Vec<[usize; PARALLEL_CLASSES]>, GraphError> {
        let mut blocks = Vec::with_capacity(CELLS);
        for vertex in self.color_classes()[2].clone() {
            let neighbours = self.neighbours(vertex);
            let mut block = [usize::MAX; PARALLEL_CLASSES];
            for &value_vertex in neighbours {
                let offset = value_vertex - VALUE_BASE;
                block[offset / ORDER] = offset % ORDER;
            }
            if neighbours.len() != PARALLEL_CLASSES || block.contains(&usize::MAX) {
                return Err(GraphError::MalformedCell { vertex, found: neighbours.len() });
            }
            blocks.push(block);
        }

        for first in 0..PARALLEL_CLASSES {
            for second in first + 1..PARALLEL_CLASSES {
                let mut counts = [[0usize; ORDER]; ORDER];
                for block in &blocks {
                    counts[block[first]][block[second]] += 1;
                }
                for (x, row) in counts.iter().enumerate() {
                    if let Some((y, &count)) = row.iter().enumerate().find(|&(_, &count)| count != 1) {
                        return Err(GraphError::NotOrthogonalArray { first, second, x, y, count });
                    }
                }
            }
        }

        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mols::square::tests::relation_pair;

    #[test]
    fn test_graph_shape() {
        let graph = ColoredGraph::from_pair(&relation_pair());
        assert_eq!(graph.vertex_count(), 144);
        assert_eq!(graph.edge_count(), 40 + 400);
        assert_eq!(graph.color(3), VertexColor::Axis);
        assert_eq!(graph.color(43), VertexColor::Value);
        assert_eq!(graph.color(44), VertexColor::Cell);
        // cell (0, 1): row 0, column 1, A = 7, B = 5
        assert_eq!(graph.neighbours(45), &[4, 15, 31, 39]);
    }

    #[test]
    fn test_orthogonal_array_round_trip() {
        let pair = relation_pair();
        let blocks = ColoredGraph::from_pair(&pair).orthogonal_array().unwrap();
        assert_eq!(blocks, pair.orthogonal_array());
    }

    #[test]
    fn test_rejects_non_orthogonal_pair() {
        let pair = relation_pair();
        let error = ColoredGraph::from_pair(&MolsPair::new(pair.a, pair.a)).orthogonal_array().unwrap_err();
        assert!(matches!(error, GraphError::NotOrthogonalArray { first: 2, second: 3, .. }));
    }
}
