use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use edi_core::{Charset, EdiCore, ParseOptions, ValidateOptions};
use edi_validate::{Diagnostic, FieldValidationMode};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "edi-cli")]
#[command(about = "Parse or validate an X12/EDIFACT document against the bundled grammars")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document and print its assembled message count plus diagnostics.
    Parse {
        /// Path to the document to parse.
        file: PathBuf,

        #[command(flatten)]
        options: CommonOptions,
    },

    /// Validate a document, surfacing every diagnostic in one pass.
    Validate {
        /// Path to the document to validate.
        file: PathBuf,

        #[command(flatten)]
        options: CommonOptions,
    },
}

#[derive(clap::Args)]
struct CommonOptions {
    /// Demote length and code-set violations to warnings instead of errors.
    #[arg(long)]
    lenient: bool,

    /// Reject documents larger than this many bytes before parsing begins.
    #[arg(long)]
    max_bytes: Option<usize>,

    /// Warn if the document does not contain a message of this type.
    #[arg(long)]
    expect_message_type: Option<String>,

    /// Trace every tree-builder state transition as an info diagnostic.
    #[arg(long)]
    debug: bool,

    /// Output format for diagnostics.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl CommonOptions {
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_field_validation_mode(if self.lenient {
                FieldValidationMode::Lenient
            } else {
                FieldValidationMode::Strict
            })
            .with_max_input_bytes(self.max_bytes)
            .with_charset(Charset::Utf8)
            .with_debug(self.debug);
        if let Some(message_type) = &self.expect_message_type {
            options = options.with_expected_message_type(message_type.clone());
        }
        options
    }

    fn validate_options(&self) -> ValidateOptions {
        let mut options = ValidateOptions::new()
            .with_field_validation_mode(if self.lenient {
                FieldValidationMode::Lenient
            } else {
                FieldValidationMode::Strict
            })
            .with_max_input_bytes(self.max_bytes)
            .with_debug(self.debug);
        if let Some(message_type) = &self.expect_message_type {
            options = options.with_expected_message_type(message_type.clone());
        }
        options
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("edi-cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool, CliError> {
    let core = EdiCore::with_bundled_grammars().unwrap_or_else(|err| {
        tracing::warn!(%err, "bundled grammars failed to load; continuing with an empty cache");
        EdiCore::new()
    });

    match cli.command {
        Commands::Parse { file, options } => {
            let content = read_file(&file)?;
            let result = core.parse(&content, &options.parse_options());
            print_diagnostics(&result.diagnostics, options.format)?;
            match options.format {
                OutputFormat::Text => {
                    println!(
                        "{} message(s) assembled, success={}",
                        result.message_count, result.success
                    );
                }
                OutputFormat::Json => {}
            }
            Ok(result.success)
        }
        Commands::Validate { file, options } => {
            let content = read_file(&file)?;
            let result = core.validate(&content, &options.validate_options());
            print_diagnostics(&result.diagnostics, options.format)?;
            match options.format {
                OutputFormat::Text => println!("{}", result.summary),
                OutputFormat::Json => {}
            }
            Ok(result.valid)
        }
    }
}

fn read_file(path: &PathBuf) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })
}

fn print_diagnostics(diagnostics: &[Diagnostic], format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => {
            for diagnostic in diagnostics {
                println!("{diagnostic}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(diagnostics)?);
        }
    }
    Ok(())
}
