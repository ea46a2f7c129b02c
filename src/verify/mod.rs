//! Decoding and verification of solver output

pub mod decoder;
pub mod record;
pub mod run;
pub mod validator;

pub use decoder::{DecodeError, DecodedSolution, IncidenceMatrix, SolutionDecoder, SquareName};
pub use record::{read_lines, RawLine, RecordError, SolutionRecord};
pub use run::{RecordOutcome, RecordStatus, RunOptions, RunSummary, VerificationRun};
pub use validator::{InvariantVerifier, Property, VerificationReport, Violation};
