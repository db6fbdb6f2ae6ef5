//! Shape command implementation.

use crate::cli::ShapeArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::schema_file::SchemaFile;
use docsift_extractor::translate;

/// Execute the shape command.
pub fn execute_shape(args: ShapeArgs, formatter: &Formatter) -> Result<()> {
    let schema = SchemaFile::load(&args.schema)?;
    let shape = translate(&schema.definition)?;
    println!("{}", formatter.format_value(shape.as_value())?);
    Ok(())
}
