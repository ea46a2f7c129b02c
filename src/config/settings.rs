//! Configuration settings for the MOLS relation encoder and verifier

use crate::mols::RelationDescriptor;
use crate::sat::EncodingOptions;
use crate::verify::RunOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub relation: RelationDescriptor,
    pub encoding: EncodingConfig,
    pub verification: VerificationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    pub symmetry_breaking: bool,
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub fail_fast: bool,
    pub parallel: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dimacs_file: Option<PathBuf>,
    pub report_format: ReportFormat,
    pub solutions_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relation: RelationDescriptor::default(),
            encoding: EncodingConfig {
                symmetry_breaking: true,
                parallel: true,
            },
            verification: VerificationConfig {
                fail_fast: false,
                parallel: true,
                verbose: false,
            },
            output: OutputConfig {
                dimacs_file: None,
                report_format: ReportFormat::Text,
                solutions_directory: None,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        RelationDescriptor::new(*self.relation.groups())
            .context("Invalid relation descriptor")?;

        if let Some(ref dimacs_file) = self.output.dimacs_file {
            if dimacs_file.is_dir() {
                anyhow::bail!("DIMACS output path is a directory: {}", dimacs_file.display());
            }
        }

        if let Some(ref directory) = self.output.solutions_directory {
            if directory.is_file() {
                anyhow::bail!("Solutions directory is a file: {}", directory.display());
            }
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(relation) = cli_overrides.relation {
            self.relation = relation;
        }
        if cli_overrides.no_symmetry_breaking {
            self.encoding.symmetry_breaking = false;
        }
        if cli_overrides.sequential {
            self.encoding.parallel = false;
            self.verification.parallel = false;
        }
        if cli_overrides.fail_fast {
            self.verification.fail_fast = true;
        }
        if cli_overrides.verbose {
            self.verification.verbose = true;
        }
        if let Some(ref dimacs_file) = cli_overrides.dimacs_file {
            self.output.dimacs_file = Some(dimacs_file.clone());
        }
        if let Some(report_format) = cli_overrides.report_format {
            self.output.report_format = report_format;
        }
        if let Some(ref directory) = cli_overrides.solutions_directory {
            self.output.solutions_directory = Some(directory.clone());
        }
    }

    pub fn encoding_options(&self) -> EncodingOptions {
        EncodingOptions {
            symmetry_breaking: self.encoding.symmetry_breaking,
            parallel: self.encoding.parallel,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            fail_fast: self.verification.fail_fast,
            parallel: self.verification.parallel,
            verbose: self.verification.verbose,
            symmetry_breaking: self.encoding.symmetry_breaking,
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub relation: Option<RelationDescriptor>,
    pub no_symmetry_breaking: bool,
    pub sequential: bool,
    pub fail_fast: bool,
    pub verbose: bool,
    pub dimacs_file: Option<PathBuf>,
    pub report_format: Option<ReportFormat>,
    pub solutions_directory: Option<PathBuf>,
}
