//! Streams solver output through the decoder and the verifier

use super::decoder::{DecodeError, DecodedSolution, SolutionDecoder};
use super::record::{read_lines, RawLine, RecordError, SolutionRecord};
use super::validator::{InvariantVerifier, VerificationReport};
use crate::mols::{MolsPair, RelationDescriptor};
use crate::sat::MolsEncoder;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::io::BufRead;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a batch is processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop at the first record that fails
    pub fail_fast: bool,
    pub parallel: bool,
    /// Print every record's literals and squares before checking it
    pub verbose: bool,
    /// Apply the symmetry-breaking checks
    pub symmetry_breaking: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { fail_fast: false, parallel: true, verbose: false, symmetry_breaking: true }
    }
}

/// What happened to one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RecordStatus {
    Verified,
    Rejected(VerificationReport),
    Malformed(RecordError),
    Undecodable(DecodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    pub line: usize,
    #[serde(flatten)]
    pub status: RecordStatus,
}

impl RecordOutcome {
    pub fn is_verified(&self) -> bool {
        self.status == RecordStatus::Verified
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            RecordStatus::Verified => write!(f, "line {}: verified", self.line),
            RecordStatus::Rejected(report) => {
                write!(f, "line {}: {} violations", self.line, report.violations.len())?;
                if let Some(first) = report.violations.first() {
                    write!(f, " (first: [{}] {})", first.property(), first)?;
                }
                Ok(())
            }
            RecordStatus::Malformed(error) => write!(f, "malformed record, {}", error),
            RecordStatus::Undecodable(error) => write!(f, "line {}: cannot decode, {}", self.line, error),
        }
    }
}

/// Outcome of a whole batch
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub verified: usize,
    pub failed: usize,
    pub elapsed_seconds: f64,
    /// Failing records only; verified ones are counted
    pub failures: Vec<RecordOutcome>,
    /// Set when fail-fast stopped the batch early
    pub stopped_early: bool,
}

impl RunSummary {
    fn from_outcomes(outcomes: Vec<RecordOutcome>, elapsed: Duration, stopped_early: bool) -> Self {
        let records = outcomes.len();
        let failures: Vec<RecordOutcome> = outcomes.into_iter().filter(|o| !o.is_verified()).collect();
        Self {
            records,
            verified: records - failures.len(),
            failed: failures.len(),
            elapsed_seconds: elapsed.as_secs_f64(),
            failures,
            stopped_early,
        }
    }

    pub fn all_verified(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{}", failure)?;
        }
        if self.stopped_early {
            writeln!(f, "Stopped at the first failing record")?;
        }
        write!(f, "{} solutions verified in {:.2} seconds", self.verified, self.elapsed_seconds)?;
        if self.failed > 0 {
            write!(f, " ({} failed)", self.failed)?;
        }
        Ok(())
    }
}

/// Decodes and verifies a stream of solver output lines
pub struct VerificationRun {
    decoder: SolutionDecoder,
    verifier: InvariantVerifier,
    options: RunOptions,
    max_variable: usize,
}

impl VerificationRun {
    pub fn new(descriptor: &RelationDescriptor, options: RunOptions) -> Self {
        Self {
            decoder: SolutionDecoder::default(),
            verifier: InvariantVerifier::new(descriptor, options.symmetry_breaking),
            options,
            max_variable: MolsEncoder::variable_count(),
        }
    }

    /// Verify a pair of squares directly, deriving the incidence matrix from it
    pub fn check_pair(&self, pair: &MolsPair) -> VerificationReport {
        self.verifier.verify(&DecodedSolution::from_pair(*pair))
    }

    /// Process one line; blank lines yield `None`
    pub fn check_line(&self, line: usize, text: &str) -> Option<RecordOutcome> {
        if text.trim().is_empty() {
            return None;
        }

        let status = match SolutionRecord::parse(text, line, self.max_variable) {
            Err(error) => RecordStatus::Malformed(error),
            Ok(record) => match self.decoder.decode(&record) {
                Err(error) => RecordStatus::Undecodable(error),
                Ok(solution) => {
                    if self.options.verbose {
                        let positives: Vec<i32> = record.positives().map(|l| l.to_dimacs()).collect();
                        info!(line, "positive literals: {:?}", positives);
                        info!(line, "decoded squares:\n{}", solution.pair);
                    }
                    let report = self.verifier.verify(&solution);
                    if report.is_valid() {
                        RecordStatus::Verified
                    } else {
                        RecordStatus::Rejected(report)
                    }
                }
            },
        };

        let outcome = RecordOutcome { line, status };
        if outcome.is_verified() {
            debug!(line, "record verified");
        } else {
            warn!("{}", outcome);
        }
        Some(outcome)
    }

    /// Read every line of `reader` and verify it
    pub fn run<R: BufRead>(&self, reader: R) -> Result<RunSummary> {
        let start_time = Instant::now();

        let lines = read_lines(reader).context("Failed to read solver output")?;

        // verbose output stays readable only in record order
        let (outcomes, stopped_early) = if self.options.parallel && !self.options.verbose {
            let outcomes: Vec<RecordOutcome> =
                lines.par_iter().filter_map(|raw| self.check_raw(raw)).collect();
            self.apply_fail_fast(outcomes)
        } else {
            let mut outcomes = Vec::new();
            let mut stopped_early = false;
            for raw in &lines {
                if let Some(outcome) = self.check_raw(raw) {
                    let failed = !outcome.is_verified();
                    outcomes.push(outcome);
                    if failed && self.options.fail_fast {
                        stopped_early = true;
                        break;
                    }
                }
            }
            (outcomes, stopped_early)
        };

        let summary = RunSummary::from_outcomes(outcomes, start_time.elapsed(), stopped_early);
        info!(records = summary.records, verified = summary.verified, failed = summary.failed, "verification finished");
        Ok(summary)
    }

    fn check_raw(&self, (line, text): &RawLine) -> Option<RecordOutcome> {
        match text {
            Ok(text) => self.check_line(*line, text),
            Err(error) => {
                let outcome = RecordOutcome { line: *line, status: RecordStatus::Malformed(error.clone()) };
                warn!("{}", outcome);
                Some(outcome)
            }
        }
    }

    fn apply_fail_fast(&self, mut outcomes: Vec<RecordOutcome>) -> (Vec<RecordOutcome>, bool) {
        if !self.options.fail_fast {
            return (outcomes, false);
        }
        match outcomes.iter().position(|o| !o.is_verified()) {
            Some(first) => {
                outcomes.truncate(first + 1);
                (outcomes, true)
            }
            None => (outcomes, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mols::square::tests::relation_pair;
    use crate::verify::decoder::tests::record_line;
    use crate::verify::validator::Property;
    use std::io::Cursor;

    fn stream() -> String {
        let good = record_line(&relation_pair());
        let swapped = record_line(&relation_pair().swap());
        format!("{}\n\n{}\nv s 0\n{}\n", good, swapped, good)
    }

    fn run(options: RunOptions) -> RunSummary {
        VerificationRun::new(&RelationDescriptor::default(), options)
            .run(Cursor::new(stream()))
            .unwrap()
    }

    #[test]
    fn test_isolated_failures() {
        let summary = run(RunOptions::default());
        assert_eq!(summary.records, 4);
        assert_eq!(summary.verified, 2);
        assert_eq!(summary.failed, 2);
        assert!(!summary.stopped_early);

        assert_eq!(summary.failures[0].line, 3);
        match &summary.failures[0].status {
            RecordStatus::Rejected(report) => assert!(report.has(Property::Swap)),
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(summary.failures[1].status, RecordStatus::Malformed(RecordError::TooShort { line: 4, found: 3 }));
        let text = summary.to_string();
        assert!(text.contains("2 solutions verified in"));
        assert!(text.ends_with("(2 failed)"));
    }

    #[test]
    fn test_fail_fast_stops_at_first_failure() {
        for parallel in [true, false] {
            let summary = run(RunOptions { fail_fast: true, parallel, ..RunOptions::default() });
            assert_eq!(summary.records, 2);
            assert_eq!(summary.failed, 1);
            assert!(summary.stopped_early);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = run(RunOptions { parallel: true, ..RunOptions::default() });
        let sequential = run(RunOptions { parallel: false, ..RunOptions::default() });
        assert_eq!(parallel.failures, sequential.failures);
        assert_eq!(parallel.verified, sequential.verified);
    }

    #[test]
    fn test_invalid_utf8_line_is_isolated() {
        let good = record_line(&relation_pair());
        let bytes = [good.as_bytes(), &b"\nv s SAT \xff\xfe 0\n"[..], good.as_bytes(), &b"\n"[..]].concat();

        for parallel in [true, false] {
            let summary = VerificationRun::new(&RelationDescriptor::default(), RunOptions { parallel, ..RunOptions::default() })
                .run(Cursor::new(bytes.clone()))
                .unwrap();
            assert_eq!(summary.records, 3);
            assert_eq!(summary.verified, 2);
            assert_eq!(summary.failures.len(), 1);
            assert_eq!(summary.failures[0].line, 2);
            assert_eq!(summary.failures[0].status, RecordStatus::Malformed(RecordError::NotUtf8 { line: 2 }));
        }
    }

    #[test]
    fn test_check_pair() {
        let run = VerificationRun::new(&RelationDescriptor::default(), RunOptions::default());
        assert!(run.check_pair(&relation_pair()).is_valid());
        assert!(run.check_line(1, "   ").is_none());
    }

    #[test]
    fn test_json_summary() {
        let summary = run(RunOptions::default());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["verified"], 2);
        assert_eq!(json["failures"][0]["status"], "rejected");
        assert_eq!(json["failures"][1]["status"], "malformed");
        assert_eq!(json["failures"][1]["line"], 4);
    }
}
