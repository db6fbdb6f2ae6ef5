//! Docsift CLI library.
//!
//! This library provides the core functionality for the `docsift` command-line
//! interface, including configuration loading, command execution, and output
//! formatting.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod schema_file;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use schema_file::SchemaFile;
