//! Docsift CLI - schema-driven document extraction from the command line.

use anyhow::Context;
use clap::Parser;
use docsift_cli::commands;
use docsift_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter).await?,
        Command::Suggest(args) => commands::execute_suggest(args, &config, &formatter).await?,
        Command::Chunks(args) => commands::execute_chunks(args, &config, &formatter)?,
        Command::Shape(args) => commands::execute_shape(args, &formatter)?,
        Command::Presets(args) => commands::execute_presets(args, &formatter)?,
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
