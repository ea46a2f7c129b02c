//! DIMACS CNF output

use super::clauses::Cnf;
use anyhow::{Context, Result};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `cnf` as `p cnf <vars> <clauses>` followed by one zero-terminated line per clause
pub fn write_dimacs<W: Write>(cnf: &Cnf, writer: W) -> Result<()> {
    let mut out = BufWriter::new(writer);
    writeln!(out, "p cnf {} {}", cnf.variable_count(), cnf.clause_count()).context("Failed to write DIMACS header")?;

    for clause in cnf.clauses() {
        for literal in &clause.literals {
            write!(out, "{} ", literal)?;
        }
        writeln!(out, "0")?;
    }

    out.flush().context("Failed to flush DIMACS output")?;
    Ok(())
}

/// Write `cnf` to a file, creating parent directories as needed
pub fn save_dimacs<P: AsRef<Path>>(cnf: &Cnf, path: P) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create DIMACS file: {}", path.as_ref().display()))?;
    write_dimacs(cnf, file).with_context(|| format!("Failed to write DIMACS file: {}", path.as_ref().display()))
}

/// Render to a string (mostly for tests and small instances)
pub fn to_dimacs_string(cnf: &Cnf) -> Result<String> {
    let mut buffer = Vec::new();
    write_dimacs(cnf, &mut buffer)?;
    String::from_utf8(buffer).context("DIMACS output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::clauses::Clause;
    use crate::sat::literal::Literal;
    use tempfile::tempdir;

    fn sample() -> Cnf {
        let lit = |v| Literal::from_dimacs(v).unwrap();
        Cnf::new(3, vec![Clause::new(vec![lit(1), lit(-3)]), Clause::unit(lit(2)), Clause::new(vec![])])
    }

    #[test]
    fn test_dimacs_format() {
        let text = to_dimacs_string(&sample()).unwrap();
        assert_eq!(text, "p cnf 3 3\n1 -3 0\n2 0\n0\n");
    }

    #[test]
    fn test_save_dimacs() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("out").join("instance.cnf");
        save_dimacs(&sample(), &path).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().starts_with("p cnf 3 3\n"));
    }
}
