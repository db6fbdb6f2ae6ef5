//! Presets command implementation.

use crate::cli::PresetsArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::schema_file::SchemaFile;
use docsift_extractor::presets;
use std::fs;

/// Execute the presets command.
///
/// Without a key, lists every preset. With one, prints that preset as a
/// schema file that `extract --schema` accepts after editing.
pub fn execute_presets(args: PresetsArgs, formatter: &Formatter) -> Result<()> {
    let Some(key) = args.key else {
        println!("{}", formatter.format_presets(&presets())?);
        return Ok(());
    };

    let schema = SchemaFile::from_preset(&key)?;
    match args.output {
        Some(path) => {
            fs::write(&path, serde_json::to_string_pretty(&schema)?)?;
            println!(
                "{}",
                formatter.success(&format!("Preset '{}' written to {}", key, path.display()))
            );
        }
        None => println!("{}", formatter.format_schema(&schema)?),
    }
    Ok(())
}
