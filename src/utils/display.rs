//! Display and output formatting utilities

use crate::config::ReportFormat;
use crate::mols::{MolsPair, ORDER};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Display;

/// Format pairs of squares for display
pub struct PairFormatter;

impl PairFormatter {
    /// Both squares side by side, one cell as `ab` (symbol of A, symbol of B)
    pub fn format_superimposed(pair: &MolsPair) -> String {
        let mut output = String::new();
        for row in 0..ORDER {
            let cells: Vec<String> = pair
                .a
                .row(row)
                .iter()
                .zip(pair.b.row(row).iter())
                .map(|(a, b)| format!("{}{}", a, b))
                .collect();
            output.push_str(&cells.join(" "));
            output.push('\n');
        }
        output
    }

    /// Squares next to each other with row and column coordinates
    pub fn format_with_coords(pair: &MolsPair) -> String {
        let mut output = String::new();

        let header: String = (0..ORDER).map(|col| format!("{:2}", col)).collect();
        output.push_str(&format!("   {}   |    {}\n", header, header));

        for row in 0..ORDER {
            let a: String = pair.a.row(row).iter().map(|s| format!("{:2}", s)).collect();
            let b: String = pair.b.row(row).iter().map(|s| format!("{:2}", s)).collect();
            output.push_str(&format!("{:2} {}   | {:2} {}\n", row, a, row, b));
        }

        output
    }
}

/// Renders a report in the configured format
pub struct ReportWriter;

impl ReportWriter {
    pub fn render<T: Serialize + Display>(value: &T, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(value.to_string()),
            ReportFormat::Json => serde_json::to_string_pretty(value).context("Failed to serialize report"),
        }
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").map_or(true, |term| term != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mols::square::tests::relation_pair;
    use crate::verify::VerificationReport;

    #[test]
    fn test_superimposed_format() {
        let pair = relation_pair();
        let text = PairFormatter::format_superimposed(&pair);
        let first_row: Vec<&str> = text.lines().next().unwrap().split(' ').collect();
        assert_eq!(text.lines().count(), ORDER);
        assert_eq!(first_row.len(), ORDER);
        assert_eq!(first_row[0], format!("{}{}", pair.a.get(0, 0), pair.b.get(0, 0)));
    }

    #[test]
    fn test_coords_format() {
        let text = PairFormatter::format_with_coords(&relation_pair());
        assert_eq!(text.lines().count(), ORDER + 1);
        assert!(text.lines().next().unwrap().contains(" 0 1 2 3 4 5 6 7 8 9"));
    }

    #[test]
    fn test_report_rendering() {
        let report = VerificationReport::default();
        assert_eq!(ReportWriter::render(&report, ReportFormat::Text).unwrap(), "All invariants hold\n");
        assert_eq!(ReportWriter::render(&report, ReportFormat::Json).unwrap(), "{\n  \"violations\": []\n}");
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
        assert!(ColorOutput::warning("line 3 skipped").contains("line 3 skipped"));
        assert_eq!(Color::Yellow.code(), 33);
    }
}
