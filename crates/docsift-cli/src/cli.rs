//! CLI command definitions and argument parsing.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Docsift - Extract structured data from documents with an LLM.
#[derive(Debug, Parser)]
#[command(name = "docsift")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DOCSIFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (minimal)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an extraction job for one document
    Extract(ExtractArgs),

    /// Ask the model to propose a schema for a document
    Suggest(SuggestArgs),

    /// Show how a document would be split into chunks
    Chunks(ChunksArgs),

    /// Print the output shape a schema translates to
    Shape(ShapeArgs),

    /// List built-in schema presets, or print one as a schema file
    Presets(PresetsArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Text file to extract from
    #[arg(short, long)]
    pub document: PathBuf,

    /// Schema file (JSON: name, description, fields)
    #[arg(short, long, required_unless_present = "preset", conflicts_with = "preset")]
    pub schema: Option<PathBuf>,

    /// Built-in schema preset (see `docsift presets`)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Model identifier (overrides the schema file and config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write the result JSON to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail on the first error instead of retrying with backoff
    #[arg(long)]
    pub no_retry: bool,
}

/// Arguments for the suggest command.
#[derive(Debug, Parser)]
pub struct SuggestArgs {
    /// Text file to analyze
    #[arg(short, long)]
    pub document: PathBuf,

    /// Model identifier (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write the suggested schema to a file usable with `extract --schema`
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the chunks command.
#[derive(Debug, Parser)]
pub struct ChunksArgs {
    /// Text file to split
    #[arg(short, long)]
    pub document: PathBuf,
}

/// Arguments for the shape command.
#[derive(Debug, Parser)]
pub struct ShapeArgs {
    /// Schema file (JSON: name, description, fields)
    #[arg(short, long)]
    pub schema: PathBuf,
}

/// Arguments for the presets command.
#[derive(Debug, Parser)]
pub struct PresetsArgs {
    /// Preset to print as a schema file
    pub key: Option<String>,

    /// Write the preset schema file here instead of printing it
    #[arg(short, long, requires = "key")]
    pub output: Option<PathBuf>,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
