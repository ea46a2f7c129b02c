//! Deduplication of solutions up to isomorphism

pub mod certificate;
pub mod graph;

pub use certificate::{Certificate, CertificateRegistry, Registration};
pub use graph::{ColoredGraph, GraphError, VertexColor};

use crate::mols::{save_pair_to_file, MolsPair};
use crate::sat::MolsEncoder;
use crate::verify::{read_lines, RecordError, SolutionDecoder, SolutionRecord};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// What happened to one line of the stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DedupEvent {
    New { graph: usize, line: usize, distinct: usize },
    Duplicate { graph: usize, line: usize, of: usize, distinct: usize },
    Skipped { line: usize, reason: String },
}

impl fmt::Display for DedupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupEvent::New { graph, distinct, .. } => {
                write!(f, "graph {} is new... {}/{} distinct graphs", graph, distinct, graph)
            }
            DedupEvent::Duplicate { graph, of, distinct, .. } => {
                write!(f, "graph {} is a duplicate of graph {}... {}/{} distinct graphs", graph, of, distinct, graph)
            }
            DedupEvent::Skipped { line, reason } => write!(f, "line {} skipped: {}", line, reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DedupSummary {
    pub graphs: usize,
    pub distinct: usize,
    pub elapsed_seconds: f64,
    pub events: Vec<DedupEvent>,
}

impl fmt::Display for DedupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checked {} graphs in {:.2} seconds", self.graphs, self.elapsed_seconds)
    }
}

/// Reads solver output and keeps the first representative of every isomorphism class
pub struct Deduplicator {
    decoder: SolutionDecoder,
    save_dir: Option<PathBuf>,
    parallel: bool,
}

impl Deduplicator {
    pub fn new(save_dir: Option<PathBuf>, parallel: bool) -> Self {
        Self { decoder: SolutionDecoder::default(), save_dir, parallel }
    }

    fn certify(&self, line: usize, text: &Result<String, RecordError>) -> Result<(MolsPair, Certificate), String> {
        let text = text.as_ref().map_err(|e| e.to_string())?;
        let record = SolutionRecord::parse(text, line, MolsEncoder::variable_count()).map_err(|e| e.to_string())?;
        let solution = self.decoder.decode(&record).map_err(|e| format!("line {}: {}", line, e))?;
        let certificate = Certificate::of(&ColoredGraph::from_pair(&solution.pair)).map_err(|e| e.to_string())?;
        Ok((solution.pair, certificate))
    }

    pub fn run<R: BufRead>(&self, reader: R) -> Result<DedupSummary> {
        let start_time = Instant::now();

        let mut lines = read_lines(reader).context("Failed to read solver output")?;
        lines.retain(|(_, text)| !matches!(text, Ok(text) if text.trim().is_empty()));

        // certificates are independent; registration below stays in input order
        let certified: Vec<(usize, Result<(MolsPair, Certificate), String>)> = if self.parallel {
            lines.par_iter().map(|(line, text)| (*line, self.certify(*line, text))).collect()
        } else {
            lines.iter().map(|(line, text)| (*line, self.certify(*line, text))).collect()
        };

        if let Some(dir) = &self.save_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        let mut registry = CertificateRegistry::new();
        let mut events = Vec::with_capacity(certified.len());
        let mut graphs = 0;

        for (line, result) in certified {
            let (pair, certificate) = match result {
                Ok(found) => found,
                Err(reason) => {
                    warn!(line, "{}", reason);
                    events.push(DedupEvent::Skipped { line, reason });
                    continue;
                }
            };

            graphs += 1;
            match registry.register(certificate, graphs) {
                Registration::New { distinct } => {
                    if let Some(dir) = &self.save_dir {
                        save_pair_to_file(&pair, dir.join(format!("{}.sol", graphs)))?;
                    }
                    events.push(DedupEvent::New { graph: graphs, line, distinct });
                }
                Registration::Duplicate { of } => {
                    events.push(DedupEvent::Duplicate { graph: graphs, line, of, distinct: registry.distinct() });
                }
            }
        }

        let summary = DedupSummary {
            graphs,
            distinct: registry.distinct(),
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            events,
        };
        info!(graphs = summary.graphs, distinct = summary.distinct, "deduplication finished");
        Ok(summary)
    }
}
