//! Replays every structural invariant against a decoded solution

use super::decoder::{DecodedSolution, SquareName};
use crate::mols::{Axis, ClassPartition, MolsPair, RelationDescriptor, Square, ORDER};
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

/// The invariant a violation breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Latin,
    RowOrder,
    ColumnOrder,
    SymbolOrder,
    Transpose,
    Swap,
    Orthogonality,
    Relation,
    Parity,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Property::Latin => "latin",
            Property::RowOrder => "row order",
            Property::ColumnOrder => "column order",
            Property::SymbolOrder => "symbol order",
            Property::Transpose => "transpose",
            Property::Swap => "swap",
            Property::Orthogonality => "orthogonality",
            Property::Relation => "relation",
            Property::Parity => "parity",
        };
        f.write_str(name)
    }
}

/// One failed check, with the coordinates that failed it
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "property", rename_all = "snake_case")]
pub enum Violation {
    #[error("row {row} of square {square} is not a permutation")]
    LatinRow { square: SquareName, row: usize },
    #[error("column {col} of square {square} is not a permutation")]
    LatinColumn { square: SquareName, col: usize },
    #[error("row class {class}: A[{row}][0] = {first} > A[{next}][0] = {second}", next = row + 1)]
    RowOrder { class: usize, row: usize, first: usize, second: usize },
    #[error("column class {class}: A[0][{col}] = {first} > A[0][{next}] = {second}", next = col + 1)]
    ColumnOrder { class: usize, col: usize, first: usize, second: usize },
    #[error("square {square}, symbol class {class}: symbol {next} appears in column 0 at row {earlier_row} before symbol {symbol} at row {row}", next = symbol + 1)]
    SymbolOrder { square: SquareName, class: usize, symbol: usize, row: usize, earlier_row: usize },
    #[error("transpose order: (A[1][0], B[1][0]) = ({a_below}, {b_below}) exceeds (A[0][1], B[0][1]) = ({a_above}, {b_above})")]
    Transpose { a_below: usize, b_below: usize, a_above: usize, b_above: usize },
    #[error("swap order: A[{row}][0] = {a} > B[{row}][0] = {b}")]
    Swap { row: usize, a: usize, b: usize },
    #[error("symbol pair ({a_symbol}, {b_symbol}) occurs {count} times")]
    Orthogonality { a_symbol: usize, b_symbol: usize, count: usize },
    #[error("cell ({row}, {col}) has class {cell_class} but its symbols ({a_symbol}, {b_symbol}) have class {symbol_class}")]
    Relation { row: usize, col: usize, a_symbol: usize, b_symbol: usize, cell_class: u8, symbol_class: u8 },
    #[error("incidence row {row} meets R{set} in {count} columns")]
    Parity { row: usize, set: u8, count: usize },
}

impl Violation {
    pub fn property(&self) -> Property {
        match self {
            Violation::LatinRow { .. } | Violation::LatinColumn { .. } => Property::Latin,
            Violation::RowOrder { .. } => Property::RowOrder,
            Violation::ColumnOrder { .. } => Property::ColumnOrder,
            Violation::SymbolOrder { .. } => Property::SymbolOrder,
            Violation::Transpose { .. } => Property::Transpose,
            Violation::Swap { .. } => Property::Swap,
            Violation::Orthogonality { .. } => Property::Orthogonality,
            Violation::Relation { .. } => Property::Relation,
            Violation::Parity { .. } => Property::Parity,
        }
    }
}

/// Every violation found in one solution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn has(&self, property: Property) -> bool {
        self.violations.iter().any(|v| v.property() == property)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return writeln!(f, "All invariants hold");
        }
        writeln!(f, "{} violations:", self.violations.len())?;
        for violation in self.violations.iter().take(5) {
            writeln!(f, "  [{}] {}", violation.property(), violation)?;
        }
        if self.violations.len() > 5 {
            writeln!(f, "  ... and {} more", self.violations.len() - 5)?;
        }
        Ok(())
    }
}

/// Checks a decoded solution against the invariants the encoding enforces
#[derive(Debug, Clone)]
pub struct InvariantVerifier {
    partition: ClassPartition,
    symmetry_breaking: bool,
}

impl InvariantVerifier {
    pub fn new(descriptor: &RelationDescriptor, symmetry_breaking: bool) -> Self {
        Self { partition: ClassPartition::new(descriptor), symmetry_breaking }
    }

    fn descriptor(&self) -> &RelationDescriptor {
        self.partition.descriptor()
    }

    pub fn verify(&self, solution: &DecodedSolution) -> VerificationReport {
        let pair = &solution.pair;
        let mut violations = Vec::new();

        self.check_latin(pair, &mut violations);
        if self.symmetry_breaking {
            self.check_row_order(&pair.a, &mut violations);
            self.check_column_order(&pair.a, &mut violations);
            self.check_symbol_order(&pair.a, SquareName::A, Axis::SymbolA, &mut violations);
            self.check_symbol_order(&pair.b, SquareName::B, Axis::SymbolB, &mut violations);
            if self.descriptor().rows_match_columns() {
                self.check_transpose(pair, &mut violations);
            }
            if self.descriptor().symbols_match() {
                self.check_swap(pair, &mut violations);
            }
        }
        self.check_orthogonality(pair, &mut violations);
        self.check_relation(pair, &mut violations);
        self.check_parity(solution, &mut violations);

        VerificationReport { violations }
    }

    fn check_latin(&self, pair: &MolsPair, violations: &mut Vec<Violation>) {
        for (square, name) in [(&pair.a, SquareName::A), (&pair.b, SquareName::B)] {
            for row in 0..ORDER {
                if !is_permutation(&square.row(row)) {
                    violations.push(Violation::LatinRow { square: name, row });
                }
            }
            for col in 0..ORDER {
                if !is_permutation(&square.column(col)) {
                    violations.push(Violation::LatinColumn { square: name, col });
                }
            }
        }
    }

    fn check_row_order(&self, a: &Square, violations: &mut Vec<Violation>) {
        for (class, range) in self.partition.classes(Axis::Row).iter().enumerate() {
            for row in all_but_last(range) {
                let (first, second) = (a.get(row, 0), a.get(row + 1, 0));
                if first > second {
                    violations.push(Violation::RowOrder { class, row, first, second });
                }
            }
        }
    }

    fn check_column_order(&self, a: &Square, violations: &mut Vec<Violation>) {
        let skip = if self.descriptor().rows_match_columns() { 0 } else { 1 };
        for (class, range) in self.partition.classes(Axis::Column).iter().enumerate().skip(skip) {
            for col in all_but_last(range) {
                let (first, second) = (a.get(0, col), a.get(0, col + 1));
                if first > second {
                    violations.push(Violation::ColumnOrder { class, col, first, second });
                }
            }
        }
    }

    fn check_symbol_order(&self, square: &Square, name: SquareName, axis: Axis, violations: &mut Vec<Violation>) {
        for (class, range) in self.partition.classes(axis).iter().enumerate() {
            for symbol in all_but_last(range) {
                let conflict = (0..ORDER)
                    .filter(|&row| square.get(row, 0) == symbol)
                    .find_map(|row| {
                        (0..row).find(|&earlier| square.get(earlier, 0) == symbol + 1).map(|earlier| (row, earlier))
                    });
                if let Some((row, earlier_row)) = conflict {
                    violations.push(Violation::SymbolOrder { square: name, class, symbol, row, earlier_row });
                }
            }
        }
    }

    fn check_transpose(&self, pair: &MolsPair, violations: &mut Vec<Violation>) {
        let (a_below, a_above) = (pair.a.get(1, 0), pair.a.get(0, 1));
        let (b_below, b_above) = (pair.b.get(1, 0), pair.b.get(0, 1));
        if a_below > a_above || (a_below == a_above && b_below > b_above) {
            violations.push(Violation::Transpose { a_below, b_below, a_above, b_above });
        }
    }

    fn check_swap(&self, pair: &MolsPair, violations: &mut Vec<Violation>) {
        let (a1, b1) = (pair.a.get(1, 0), pair.b.get(1, 0));
        if a1 > b1 {
            violations.push(Violation::Swap { row: 1, a: a1, b: b1 });
        } else if a1 == b1 {
            let (a2, b2) = (pair.a.get(2, 0), pair.b.get(2, 0));
            if a2 > b2 {
                violations.push(Violation::Swap { row: 2, a: a2, b: b2 });
            }
        }
    }

    fn check_orthogonality(&self, pair: &MolsPair, violations: &mut Vec<Violation>) {
        let mut counts = [[0usize; ORDER]; ORDER];
        for [_, _, a, b] in pair.orthogonal_array() {
            counts[a][b] += 1;
        }
        for (a_symbol, row) in counts.iter().enumerate() {
            for (b_symbol, &count) in row.iter().enumerate() {
                if count != 1 {
                    violations.push(Violation::Orthogonality { a_symbol, b_symbol, count });
                }
            }
        }
    }

    fn check_relation(&self, pair: &MolsPair, violations: &mut Vec<Violation>) {
        for [row, col, a_symbol, b_symbol] in pair.orthogonal_array() {
            let cell_class = self.partition.rc_class(row, col);
            let symbol_class = self.partition.st_class(a_symbol, b_symbol);
            if cell_class != symbol_class {
                violations.push(Violation::Relation { row, col, a_symbol, b_symbol, cell_class, symbol_class });
            }
        }
    }

    fn check_parity(&self, solution: &DecodedSolution, violations: &mut Vec<Violation>) {
        for (row, incidence) in solution.incidence.rows().enumerate() {
            let (r1, r2) = self.partition.parity_counts(incidence);
            if r1 % 2 != 0 {
                violations.push(Violation::Parity { row, set: 1, count: r1 });
            }
            if r2 % 2 != 0 {
                violations.push(Violation::Parity { row, set: 2, count: r2 });
            }
        }
    }
}

fn is_permutation(line: &[u8; ORDER]) -> bool {
    let mut seen = [false; ORDER];
    line.iter().all(|&s| !std::mem::replace(&mut seen[s as usize], true))
}

fn all_but_last(class: &Range<usize>) -> Range<usize> {
    class.start..class.end.saturating_sub(1).max(class.start)
}
