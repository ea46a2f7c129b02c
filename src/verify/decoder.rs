//! Turns the positive literals of a record back into squares and the incidence matrix

use super::record::SolutionRecord;
use crate::mols::{MolsPair, Square, CELLS, INCIDENCE_COLUMNS, ORDER};
use crate::sat::{VariableKind, VariableLayout};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which of the two squares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SquareName {
    A,
    B,
}

impl fmt::Display for SquareName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SquareName::A => "A",
            SquareName::B => "B",
        })
    }
}

/// The assignment does not name exactly one symbol for some cell
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeError {
    #[error("square {square}, cell ({row}, {col}) has no symbol")]
    MissingSymbol { square: SquareName, row: usize, col: usize },
    #[error("square {square}, cell ({row}, {col}) has several symbols {symbols:?}")]
    AmbiguousSymbol { square: SquareName, row: usize, col: usize, symbols: Vec<usize> },
}

/// 100 x 40 incidence matrix of the two resolvable designs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    rows: Vec<[bool; INCIDENCE_COLUMNS]>,
}

impl IncidenceMatrix {
    /// Every row starts with its fixed row and column incidences
    fn with_fixed_prefix() -> Self {
        let mut rows = vec![[false; INCIDENCE_COLUMNS]; CELLS];
        for (cell, row) in rows.iter_mut().enumerate() {
            row[cell / ORDER] = true;
            row[ORDER + cell % ORDER] = true;
        }
        Self { rows }
    }

    /// Incidence implied by a pair of squares
    pub fn from_pair(pair: &MolsPair) -> Self {
        let mut matrix = Self::with_fixed_prefix();
        for (cell, row) in matrix.rows.iter_mut().enumerate() {
            let (i, j) = (cell / ORDER, cell % ORDER);
            row[2 * ORDER + pair.a.get(i, j)] = true;
            row[3 * ORDER + pair.b.get(i, j)] = true;
        }
        matrix
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.rows[row][col]
    }

    pub fn row(&self, row: usize) -> &[bool; INCIDENCE_COLUMNS] {
        &self.rows[row]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool; INCIDENCE_COLUMNS]> {
        self.rows.iter()
    }
}

/// A record decoded into its squares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSolution {
    pub pair: MolsPair,
    pub incidence: IncidenceMatrix,
}

impl DecodedSolution {
    /// Wrap a pair read from a square file; the incidence is derived from it
    pub fn from_pair(pair: MolsPair) -> Self {
        Self { incidence: IncidenceMatrix::from_pair(&pair), pair }
    }
}

/// Decodes records over the standard variable layout
#[derive(Debug, Clone, Default)]
pub struct SolutionDecoder {
    layout: VariableLayout,
}

impl SolutionDecoder {
    pub fn new(layout: VariableLayout) -> Self {
        Self { layout }
    }

    pub fn decode(&self, record: &SolutionRecord) -> Result<DecodedSolution, DecodeError> {
        let mut incidence = IncidenceMatrix::with_fixed_prefix();
        let mut symbols: [Vec<Vec<usize>>; 2] = [vec![Vec::new(); CELLS], vec![Vec::new(); CELLS]];

        for literal in record.positives() {
            if let VariableKind::Adjacency { row, col } = self.layout.kind(literal.variable()) {
                incidence.rows[row][col] = true;
                if col >= 2 * ORDER {
                    let square = (col - 2 * ORDER) / ORDER;
                    symbols[square][row].push(col % ORDER);
                }
            }
        }

        let mut squares = [Square::new(), Square::new()];
        for (index, name) in [SquareName::A, SquareName::B].into_iter().enumerate() {
            for (cell, found) in symbols[index].iter_mut().enumerate() {
                let (row, col) = (cell / ORDER, cell % ORDER);
                found.sort_unstable();
                found.dedup();
                match found.as_slice() {
                    [symbol] => squares[index].set(row, col, *symbol),
                    [] => return Err(DecodeError::MissingSymbol { square: name, row, col }),
                    _ => {
                        return Err(DecodeError::AmbiguousSymbol { square: name, row, col, symbols: found.clone() })
                    }
                }
            }
        }

        let [a, b] = squares;
        Ok(DecodedSolution { pair: MolsPair::new(a, b), incidence })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::mols::square::tests::relation_pair;

    /// The solver line a SAT solver would print for `pair` (positive adjacency literals only)
    pub(crate) fn record_line(pair: &MolsPair) -> String {
        let layout = VariableLayout::standard();
        let mut ids = Vec::new();
        for i in 0..ORDER {
            for j in 0..ORDER {
                let cell = i * ORDER + j;
                for col in [i, ORDER + j, 2 * ORDER + pair.a.get(i, j), 3 * ORDER + pair.b.get(i, j)] {
                    ids.push(layout.adjacency.encode(cell, col).id());
                }
            }
        }
        ids.sort_unstable();
        let body: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        format!("v s SAT {} 0", body.join(" "))
    }

    fn parse(line: &str) -> SolutionRecord {
        SolutionRecord::parse(line, 1, 13_100).unwrap()
    }

    #[test]
    fn test_decode_round_trip() {
        let pair = relation_pair();
        let decoded = SolutionDecoder::default().decode(&parse(&record_line(&pair))).unwrap();
        assert_eq!(decoded.pair, pair);
        assert_eq!(decoded.incidence, IncidenceMatrix::from_pair(&pair));
    }

    #[test]
    fn test_incidence_rows() {
        let pair = relation_pair();
        let matrix = IncidenceMatrix::from_pair(&pair);
        // cell (0, 1): A = 7, B = 5
        let row = matrix.row(1);
        let ones: Vec<usize> = (0..INCIDENCE_COLUMNS).filter(|&c| row[c]).collect();
        assert_eq!(ones, vec![0, 11, 27, 35]);
        assert!(matrix.rows().all(|r| r.iter().filter(|&&b| b).count() == 4));
    }

    #[test]
    fn test_missing_symbol() {
        let line = record_line(&relation_pair()).replacen(" 21 ", " ", 1);
        let error = SolutionDecoder::default().decode(&parse(&line)).unwrap_err();
        assert_eq!(error, DecodeError::MissingSymbol { square: SquareName::A, row: 0, col: 0 });
    }

    #[test]
    fn test_ambiguous_symbol() {
        let line = record_line(&relation_pair()).replacen(" 0", " 32 0", 1);
        let error = SolutionDecoder::default().decode(&parse(&line)).unwrap_err();
        assert_eq!(
            error,
            DecodeError::AmbiguousSymbol { square: SquareName::B, row: 0, col: 0, symbols: vec![0, 1] }
        );
    }

    #[test]
    fn test_ignores_negatives_and_auxiliaries() {
        let line = record_line(&relation_pair()).replacen(" 0", " -22 4001 13100 0", 1);
        let decoded = SolutionDecoder::default().decode(&parse(&line)).unwrap();
        assert_eq!(decoded.pair, relation_pair());
    }
}
