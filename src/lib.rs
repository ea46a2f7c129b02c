//! MOLS(10) relation SAT encoder
//!
//! This library encodes the search for a pair of orthogonal Latin squares of
//! order ten whose parallel classes meet in a prescribed pattern as a DIMACS
//! CNF instance, and verifies and deduplicates the solutions an external SAT
//! solver reports for it.

pub mod config;
pub mod dedup;
pub mod mols;
pub mod sat;
pub mod utils;
pub mod verify;

pub use config::Settings;
pub use mols::{MolsPair, RelationDescriptor};
pub use sat::{Encoding, MolsEncoder};
pub use verify::{RunSummary, VerificationRun};

/// Main entry point for encoding the relation configured in `settings`
pub fn encode_relation(settings: &Settings) -> Encoding {
    MolsEncoder::new(settings.relation, settings.encoding_options()).encode()
}
