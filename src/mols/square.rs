//! Decoded squares and the `.sol` text format

use super::ORDER;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairParseError {
    #[error("expected {expected} non-empty rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} symbols, expected {expected}", expected = ORDER)]
    RowLength { row: usize, found: usize },
    #[error("row {row} contains invalid symbol '{token}'")]
    Symbol { row: usize, token: String },
}

/// A 10x10 array of symbols. Nothing here forces it to be Latin; that is
/// checked by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    cells: [[u8; ORDER]; ORDER],
}

impl Square {
    pub fn new() -> Self {
        Self { cells: [[0; ORDER]; ORDER] }
    }

    pub fn from_rows(cells: [[u8; ORDER]; ORDER]) -> Self {
        for row in &cells {
            assert!(row.iter().all(|&s| (s as usize) < ORDER), "symbol out of range");
        }
        Self { cells }
    }

    pub fn get(&self, row: usize, col: usize) -> usize {
        self.cells[row][col] as usize
    }

    pub fn set(&mut self, row: usize, col: usize, symbol: usize) {
        assert!(symbol < ORDER, "symbol {} out of range", symbol);
        self.cells[row][col] = symbol as u8;
    }

    pub fn row(&self, row: usize) -> [u8; ORDER] {
        self.cells[row]
    }

    pub fn column(&self, col: usize) -> [u8; ORDER] {
        std::array::from_fn(|row| self.cells[row][col])
    }

    pub fn transpose(&self) -> Self {
        Self { cells: std::array::from_fn(|row| self.column(row)) }
    }

    /// Apply a symbol relabeling `symbol -> map[symbol]`
    pub fn relabel(&self, map: &[u8; ORDER]) -> Self {
        Self { cells: self.cells.map(|row| row.map(|s| map[s as usize])) }
    }
}

impl Default for Square {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|s| s.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// Two squares A and B of the same order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MolsPair {
    pub a: Square,
    pub b: Square,
}

impl MolsPair {
    pub fn new(a: Square, b: Square) -> Self {
        Self { a, b }
    }

    /// Parse the `.sol` layout: ten rows of A, then ten rows of B; blank lines are ignored
    pub fn parse(text: &str) -> Result<Self, PairParseError> {
        let rows: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if rows.len() != 2 * ORDER {
            return Err(PairParseError::RowCount { expected: 2 * ORDER, found: rows.len() });
        }

        let mut squares = [Square::new(), Square::new()];
        for (index, line) in rows.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != ORDER {
                return Err(PairParseError::RowLength { row: index + 1, found: tokens.len() });
            }
            for (col, token) in tokens.iter().enumerate() {
                let symbol = token
                    .parse::<usize>()
                    .ok()
                    .filter(|&s| s < ORDER)
                    .ok_or_else(|| PairParseError::Symbol { row: index + 1, token: token.to_string() })?;
                squares[index / ORDER].set(index % ORDER, col, symbol);
            }
        }

        let [a, b] = squares;
        Ok(Self { a, b })
    }

    /// Render in the `.sol` layout, with a blank line after each square
    pub fn to_sol_string(&self) -> String {
        format!("{}\n{}\n", self.a, self.b)
    }

    /// Transpose both squares (exchanges the row and column axes)
    pub fn transpose(&self) -> Self {
        Self { a: self.a.transpose(), b: self.b.transpose() }
    }

    /// Exchange the two squares (exchanges the two symbol axes)
    pub fn swap(&self) -> Self {
        Self { a: self.b, b: self.a }
    }

    /// The 100 blocks `(row, column, A-symbol, B-symbol)` in row-major cell order
    pub fn orthogonal_array(&self) -> Vec<[usize; 4]> {
        let mut blocks = Vec::with_capacity(ORDER * ORDER);
        for row in 0..ORDER {
            for col in 0..ORDER {
                blocks.push([row, col, self.a.get(row, col), self.b.get(row, col)]);
            }
        }
        blocks
    }
}

impl fmt::Display for MolsPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "A:")?;
        write!(f, "{}", self.a)?;
        writeln!(f, "B:")?;
        write!(f, "{}", self.b)
    }
}
