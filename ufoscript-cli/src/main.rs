use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use ufoscript_core::{format_diagnostic, parse_script, BlockOutcome, Diagnostics, ParseOutput, Registry};

mod config;
mod watch;

use config::{OutputFormat, Overrides, UfoConfig};

#[derive(Parser)]
#[command(name = "ufoscript")]
#[command(about = "Checker for UFO:AI block scripts", long_about = None)]
struct Cli {
    /// Configuration file layered over ./ufoscript.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse scripts and report diagnostics
    Check {
        /// Script files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Check again whenever a file changes
        #[arg(long)]
        watch: bool,
        /// Fail on warnings as well as errors
        #[arg(long)]
        warnings_as_errors: bool,
    },
    /// Print the parsed blocks of a script
    Dump {
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// List the registered block kinds
    Kinds,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = match &cli.command {
        Commands::Check {
            warnings_as_errors, ..
        } => Overrides {
            warnings_as_errors: *warnings_as_errors,
            format: None,
        },
        Commands::Dump { format, .. } => Overrides {
            warnings_as_errors: false,
            format: *format,
        },
        Commands::Kinds => Overrides::default(),
    };

    let config = match config::load(cli.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config);

    let registry = match config.registry.build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    for diagnostic in registry.duplicate_diagnostics() {
        eprintln!("{}", diagnostic);
    }

    let result = match cli.command {
        Commands::Check { files, watch, .. } => {
            if watch {
                watch_and_check(&files, &registry, &config)
            } else {
                check_files(&files, &registry, &config)
            }
        }
        Commands::Dump { file, .. } => dump_file(&file, &registry, config.output.format),
        Commands::Kinds => {
            list_kinds(&registry);
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG wins over the configured level
fn init_logging(config: &UfoConfig) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.level)),
        )
        .try_init();
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    errors: usize,
    warnings: usize,
    diagnostics: &'a Diagnostics,
}

/// Returns whether every file passed
fn check_files(
    files: &[PathBuf],
    registry: &Registry,
    config: &UfoConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut passed = true;
    for file in files {
        passed &= check_file(file, registry, config)?;
    }
    Ok(passed)
}

fn check_file(
    file: &Path,
    registry: &Registry,
    config: &UfoConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let output = parse_script(&source, registry);
    let name = file.display().to_string();
    let errors = output.diagnostics.errors().count();
    let warnings = output.diagnostics.warnings().count();

    match config.output.format {
        OutputFormat::Text => {
            for diagnostic in &output.diagnostics {
                eprintln!("{}", format_diagnostic(diagnostic, &source, Some(&name)));
            }
            println!(
                "{}: {} blocks, {} errors, {} warnings",
                name,
                output.blocks.len(),
                errors,
                warnings
            );
        }
        OutputFormat::Json => {
            let report = FileReport {
                file: name,
                errors,
                warnings,
                diagnostics: &output.diagnostics,
            };
            println!("{}", serde_json::to_string(&report)?);
        }
    }

    Ok(!config.diagnostics.fails(errors, warnings))
}

fn watch_and_check(
    files: &[PathBuf],
    registry: &Registry,
    config: &UfoConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    check_files(files, registry, config)?;
    watch::watch_files(files, |file| {
        if let Err(e) = check_file(file, registry, config) {
            eprintln!("Error: {}: {}", file.display(), e);
        }
    })?;
    Ok(true)
}

fn dump_file(
    file: &Path,
    registry: &Registry,
    format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(file)?;
    let output = parse_script(&source, registry);

    match format {
        OutputFormat::Text => print!("{}", render_blocks(&output)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(!output.diagnostics.has_errors())
}

/// Parsed blocks in script syntax; failed blocks become comments
fn render_blocks(output: &ParseOutput) -> String {
    let mut text = String::new();
    for outcome in &output.blocks {
        let header = match outcome.name() {
            Some(name) => format!("{} {}", outcome.keyword(), name),
            None => outcome.keyword().to_string(),
        };
        match outcome {
            BlockOutcome::Parsed(block) => {
                text.push_str(&format!("{} {{\n", header));
                for field in &block.fields {
                    text.push_str(&format!("\t{} {}\n", field.key, field.value));
                }
                text.push_str("}\n");
            }
            BlockOutcome::Failed(_) => text.push_str(&format!("// failed: {}\n", header)),
        }
    }
    text
}

fn list_kinds(registry: &Registry) {
    for kind in registry.iter() {
        let form = if kind.is_id_name() { "<name> { ... }" } else { "{ ... }" };
        println!("{} {}", kind.id(), form);
    }
}
