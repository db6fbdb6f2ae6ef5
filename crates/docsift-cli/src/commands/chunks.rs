//! Chunks command implementation.

use super::read_document;
use crate::cli::ChunksArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use docsift_extractor::{should_chunk, TextChunker};

/// Execute the chunks command.
pub fn execute_chunks(args: ChunksArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let document = read_document(&args.document)?;
    let chunker = TextChunker::from_config(&config.extractor)?;

    if formatter.format() == OutputFormat::Table
        && !should_chunk(&document.text, config.extractor.chunk_threshold)
    {
        eprintln!(
            "{}",
            formatter.info(&format!(
                "{} chars is within the {} char threshold; extraction runs in a single call",
                document.char_len(),
                config.extractor.chunk_threshold
            ))
        );
    }

    println!("{}", formatter.format_chunks(&chunker.chunk(&document.text))?);
    Ok(())
}
