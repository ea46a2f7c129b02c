//! One line of solver output

use crate::sat::Literal;
use serde::Serialize;
use std::io::BufRead;
use thiserror::Error;

/// A solver-output line that cannot be read as an assignment
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordError {
    #[error("line {line}: expected at least 4 tokens, found {found}")]
    TooShort { line: usize, found: usize },
    #[error("line {line}: token '{token}' is not an integer literal")]
    NotInteger { line: usize, token: String },
    #[error("line {line}: literal 0 inside the assignment")]
    ZeroLiteral { line: usize },
    #[error("line {line}: literal {literal} exceeds the variable count {max}")]
    OutOfRange { line: usize, literal: i64, max: usize },
    #[error("line {line}: not valid UTF-8")]
    NotUtf8 { line: usize },
}

impl RecordError {
    pub fn line(&self) -> usize {
        match self {
            RecordError::TooShort { line, .. }
            | RecordError::NotInteger { line, .. }
            | RecordError::ZeroLiteral { line }
            | RecordError::OutOfRange { line, .. }
            | RecordError::NotUtf8 { line } => *line,
        }
    }
}

/// A numbered line of solver output, or the reason its bytes are not text
pub type RawLine = (usize, Result<String, RecordError>);

/// Split `reader` on newlines. Undecodable bytes fail only their own line;
/// read errors fail the whole stream.
pub fn read_lines<R: BufRead>(reader: R) -> std::io::Result<Vec<RawLine>> {
    reader
        .split(b'\n')
        .enumerate()
        .map(|(index, chunk)| {
            let line = index + 1;
            let mut bytes = chunk?;
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Ok((line, String::from_utf8(bytes).map_err(|_| RecordError::NotUtf8 { line })))
        })
        .collect()
}

/// The literals of one candidate assignment and the 1-based line they came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionRecord {
    pub line: usize,
    pub literals: Vec<Literal>,
}

impl SolutionRecord {
    /// Parse one line: the first three tokens and the trailing terminator are skipped
    pub fn parse(text: &str, line: usize, max_variable: usize) -> Result<Self, RecordError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(RecordError::TooShort { line, found: tokens.len() });
        }

        let literals = tokens[3..tokens.len() - 1]
            .iter()
            .map(|token| {
                let value: i64 = token
                    .parse()
                    .map_err(|_| RecordError::NotInteger { line, token: token.to_string() })?;
                if value == 0 {
                    return Err(RecordError::ZeroLiteral { line });
                }
                if value.unsigned_abs() > max_variable as u64 {
                    return Err(RecordError::OutOfRange { line, literal: value, max: max_variable });
                }
                Literal::from_dimacs(value as i32).ok_or(RecordError::ZeroLiteral { line })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { line, literals })
    }

    /// Literals assigned true
    pub fn positives(&self) -> impl Iterator<Item = Literal> + '_ {
        self.literals.iter().copied().filter(|l| l.is_positive())
    }
}
