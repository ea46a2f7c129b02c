//! Configuration management for the MOLS relation tools

pub mod settings;

pub use settings::{
    Settings, EncodingConfig, VerificationConfig, OutputConfig, ReportFormat, CliOverrides
};
