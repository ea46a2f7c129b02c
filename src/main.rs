//! Main CLI application for the MOLS(10) relation encoder

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mols_relation_sat::{
    config::{CliOverrides, ReportFormat, Settings},
    dedup::{DedupEvent, Deduplicator},
    encode_relation,
    mols::{create_example_descriptors, load_descriptor_from_file, load_pair_from_file, RelationDescriptor},
    sat::{save_dimacs, write_dimacs},
    utils::{ColorOutput, PairFormatter, ReportWriter},
    VerificationRun,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "mols_relation_sat")]
#[command(about = "SAT encoder and verifier for MOLS(10) with prescribed class relations")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the relation descriptor comes from, when not taken from the config
#[derive(Args, Debug)]
struct RelationArgs {
    /// Relation descriptor as JSON, e.g. '[[1,3,3],[1,3,3],[1,3,3],[1,3,3]]'
    #[arg(short, long, value_parser = RelationDescriptor::from_json)]
    relation: Option<RelationDescriptor>,

    /// JSON file holding the relation descriptor
    #[arg(long, conflicts_with = "relation")]
    relation_file: Option<PathBuf>,
}

impl RelationArgs {
    fn resolve(self) -> Result<Option<RelationDescriptor>> {
        match self.relation_file {
            Some(path) => load_descriptor_from_file(&path).map(Some),
            None => Ok(self.relation),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the DIMACS CNF for a relation descriptor
    Encode {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        #[command(flatten)]
        relation: RelationArgs,

        /// DIMACS output file (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Append a known pair of squares as unit clauses
        #[arg(long)]
        pin: Option<PathBuf>,

        #[arg(long)]
        no_symmetry_breaking: bool,

        /// Generate every clause family on the calling thread
        #[arg(long)]
        sequential: bool,
    },

    /// Decode and verify SAT solver output
    Verify {
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        #[command(flatten)]
        relation: RelationArgs,

        /// Solver output file (stdin when absent)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Stop at the first failing record
        #[arg(long)]
        fail_fast: bool,

        #[arg(long)]
        no_symmetry_breaking: bool,

        #[arg(long)]
        sequential: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify a single pair of squares stored in a .sol file
    Check {
        /// Square file (A then B, ten rows each)
        file: PathBuf,

        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        #[command(flatten)]
        relation: RelationArgs,

        #[arg(long)]
        no_symmetry_breaking: bool,

        #[arg(long)]
        json: bool,
    },

    /// Keep one solution per isomorphism class
    Dedup {
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Solver output file (stdin when absent)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Directory receiving one .sol file per new graph
        #[arg(short, long)]
        save_dir: Option<PathBuf>,

        #[arg(long)]
        sequential: bool,
    },

    /// Show encoding statistics for a relation descriptor
    Stats {
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        #[command(flatten)]
        relation: RelationArgs,

        #[arg(long)]
        no_symmetry_breaking: bool,
    },

    /// Create example configuration and descriptor files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout is reserved for DIMACS and reports
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    match cli.command {
        Commands::Encode { config, relation, output, pin, no_symmetry_breaking, sequential } => {
            let overrides = CliOverrides {
                relation: relation.resolve()?,
                no_symmetry_breaking,
                sequential,
                dimacs_file: output,
                ..CliOverrides::default()
            };
            encode_command(&config, &overrides, pin)
        }
        Commands::Verify { config, relation, input, fail_fast, no_symmetry_breaking, sequential, json } => {
            let overrides = CliOverrides {
                relation: relation.resolve()?,
                no_symmetry_breaking,
                sequential,
                fail_fast,
                verbose: cli.verbose,
                report_format: json.then_some(ReportFormat::Json),
                ..CliOverrides::default()
            };
            verify_command(&config, &overrides, input)
        }
        Commands::Check { file, config, relation, no_symmetry_breaking, json } => {
            let overrides = CliOverrides {
                relation: relation.resolve()?,
                no_symmetry_breaking,
                report_format: json.then_some(ReportFormat::Json),
                ..CliOverrides::default()
            };
            check_command(&config, &overrides, &file)
        }
        Commands::Dedup { config, input, save_dir, sequential } => {
            let overrides = CliOverrides {
                sequential,
                solutions_directory: save_dir,
                ..CliOverrides::default()
            };
            dedup_command(&config, &overrides, input, cli.verbose)
        }
        Commands::Stats { config, relation, no_symmetry_breaking } => {
            let overrides = CliOverrides {
                relation: relation.resolve()?,
                no_symmetry_breaking,
                ..CliOverrides::default()
            };
            stats_command(&config, &overrides)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

/// Load the configuration file, falling back to defaults, then apply CLI overrides
fn load_settings(config_path: &PathBuf, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        warn!("Config file {} not found, using defaults", config_path.display());
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn open_input(input: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open solver output: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn encode_command(config_path: &PathBuf, overrides: &CliOverrides, pin: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    info!("Encoding relation {}", settings.relation);

    let encoding = encode_relation(&settings);
    let cnf = match pin {
        Some(path) => {
            let pair = load_pair_from_file(&path)
                .with_context(|| format!("Failed to load pinned pair from {}", path.display()))?;
            info!("Pinning the pair from {}", path.display());
            encoding.cnf.with_clauses(encoding.layout.pin(&pair))
        }
        None => encoding.cnf,
    };

    match &settings.output.dimacs_file {
        Some(path) => {
            save_dimacs(&cnf, path)?;
            eprintln!("{}", ColorOutput::success(&format!(
                "Wrote {} variables and {} clauses to {}",
                cnf.variable_count(),
                cnf.clause_count(),
                path.display()
            )));
        }
        None => write_dimacs(&cnf, io::stdout().lock()).context("Failed to write DIMACS to stdout")?,
    }

    Ok(())
}

fn verify_command(config_path: &PathBuf, overrides: &CliOverrides, input: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    let run = VerificationRun::new(&settings.relation, settings.run_options());

    let summary = run.run(open_input(input.as_deref())?)?;
    println!("{}", ReportWriter::render(&summary, settings.output.report_format)?);

    if !summary.all_verified() {
        anyhow::bail!("{} of {} records failed verification", summary.failed, summary.records);
    }
    Ok(())
}

fn check_command(config_path: &PathBuf, overrides: &CliOverrides, file: &Path) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    let pair = load_pair_from_file(file)?;

    if settings.output.report_format == ReportFormat::Text {
        println!("{}", PairFormatter::format_with_coords(&pair));
    }

    let run = VerificationRun::new(&settings.relation, settings.run_options());
    let report = run.check_pair(&pair);
    print!("{}", ReportWriter::render(&report, settings.output.report_format)?);

    if report.is_valid() {
        eprintln!("{}", ColorOutput::success("Pair satisfies every invariant"));
        Ok(())
    } else {
        eprintln!("{}", ColorOutput::error("Pair violates the encoded invariants"));
        anyhow::bail!("{} violations in {}", report.violations.len(), file.display())
    }
}

fn dedup_command(config_path: &PathBuf, overrides: &CliOverrides, input: Option<PathBuf>, verbose: bool) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    let deduplicator = Deduplicator::new(
        settings.output.solutions_directory.clone(),
        settings.verification.parallel,
    );

    let summary = deduplicator.run(open_input(input.as_deref())?)?;
    for event in &summary.events {
        match event {
            DedupEvent::New { .. } => println!("{}", event),
            DedupEvent::Duplicate { .. } if verbose => println!("{}", event),
            DedupEvent::Skipped { .. } => eprintln!("{}", ColorOutput::warning(&event.to_string())),
            _ => {}
        }
    }
    println!("{}", summary);

    if let Some(dir) = &settings.output.solutions_directory {
        eprintln!("{}", ColorOutput::info(&format!(
            "{} representatives saved to {}",
            summary.distinct,
            dir.display()
        )));
    }
    Ok(())
}

fn stats_command(config_path: &PathBuf, overrides: &CliOverrides) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    let encoding = encode_relation(&settings);
    print!("{}", encoding.statistics);
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let relations_dir = directory.join("relations");
    let solutions_dir = directory.join("output/solutions");

    for dir in [&config_dir, &relations_dir, &solutions_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    if relations_dir.join("delisle.json").exists() && !force {
        println!("Skipped: {} (already populated)", relations_dir.display());
    } else {
        create_example_descriptors(&relations_dir)
            .context("Failed to create example descriptors")?;
        println!("Created example relation descriptors in: {}", relations_dir.display());
    }

    // dedup writes representatives here by default
    let dedup_path = config_dir.join("dedup.yaml");
    if !dedup_path.exists() || force {
        let mut dedup_config = Settings::default();
        dedup_config.output.solutions_directory = Some(PathBuf::from("output/solutions"));
        dedup_config.to_file(&dedup_path)?;
        println!("Created: {}", dedup_path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit the relation in {}", config_path.display());
    println!("2. Run: cargo run -- encode --output relation.cnf");
    println!("3. Pipe your solver's models into: cargo run -- verify");

    Ok(())
}
