//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::schema_file::SchemaFile;
use colored::*;
use docsift_domain::{FieldNode, ItemNode, Job};
use docsift_extractor::{Chunk, SchemaPreset};
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

const PREVIEW_CHARS: usize = 40;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// The selected format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an extraction result or output shape.
    ///
    /// Structured data has no table form; table mode prints it pretty.
    pub fn format_value(&self, value: &Value) -> Result<String> {
        match self.format {
            OutputFormat::Quiet => Ok(serde_json::to_string(value)?),
            OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    /// Format a chunk plan.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = chunks
                    .iter()
                    .map(|c| {
                        json!({
                            "index": c.index,
                            "start": c.start,
                            "end": c.end,
                            "chars": c.char_len(),
                            "overlap": c.overlap,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(chunks.len().to_string()),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("No chunks (empty document).", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["#", "Start", "End", "Chars", "Overlap", "Begins with"]);
                for chunk in chunks {
                    builder.push_record([
                        format!("{}/{}", chunk.index + 1, chunk.total),
                        chunk.start.to_string(),
                        chunk.end.to_string(),
                        chunk.char_len().to_string(),
                        chunk.overlap.to_string(),
                        preview(chunk.fresh_text()),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a finished job.
    pub fn format_job(&self, job: &Job) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(job)?),
            OutputFormat::Quiet => Ok(job.status.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Job", "Status", "Retries", "Chunks", "Error"]);
                let chunks = if job.is_chunked {
                    format!("{}/{}", job.processed_chunks, job.total_chunks)
                } else {
                    "-".to_string()
                };
                builder.push_record([
                    job.id.to_string()[..8].to_string(),
                    job.status.to_string(),
                    format!("{}/{}", job.retry_count, job.max_retries),
                    chunks,
                    job.error_message.clone(),
                ]);
                Ok(self.render(builder))
            }
        }
    }

    /// Format a schema file.
    pub fn format_schema(&self, schema: &SchemaFile) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(schema)?),
            OutputFormat::Quiet => Ok(schema.name.clone()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Type", "Required", "Description"]);
                for field in &schema.definition.fields {
                    push_field_rows(&mut builder, "", field);
                }
                let mut out = self.colorize(&schema.name, "cyan");
                if !schema.description.is_empty() {
                    out.push_str(&format!(" - {}", schema.description));
                }
                out.push('\n');
                out.push_str(&self.render(builder));
                Ok(out)
            }
        }
    }

    /// Format the built-in preset listing.
    pub fn format_presets(&self, presets: &[SchemaPreset]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = presets
                    .iter()
                    .map(|p| -> Result<Value> {
                        Ok(json!({
                            "key": p.key,
                            "label": p.label,
                            "description": p.summary,
                            "schema": serde_json::to_value(SchemaFile::from(p.clone()))?,
                        }))
                    })
                    .collect::<Result<_>>()?;
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(presets.iter().map(|p| p.key).collect::<Vec<_>>().join("\n")),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Key", "Label", "Fields", "Description"]);
                for preset in presets {
                    builder.push_record([
                        preset.key.to_string(),
                        preset.label.to_string(),
                        preset.schema.definition.field_count().to_string(),
                        preset.summary.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn push_field_rows(builder: &mut Builder, prefix: &str, field: &FieldNode) {
    let path = format!("{}{}", prefix, field.name);
    builder.push_record([
        path.clone(),
        field.field_type.as_str().to_string(),
        if field.required { "yes" } else { "" }.to_string(),
        field.description.clone().unwrap_or_default(),
    ]);
    for child in field.fields.iter().flatten() {
        push_field_rows(builder, &format!("{}.", path), child);
    }
    if let Some(item) = &field.items {
        push_item_rows(builder, &format!("{}[]", path), item);
    }
}

fn push_item_rows(builder: &mut Builder, path: &str, item: &ItemNode) {
    for child in item.fields.iter().flatten() {
        push_field_rows(builder, &format!("{}.", path), child);
    }
    if let Some(inner) = &item.items {
        push_item_rows(builder, &format!("{}[]", path), inner);
    }
}

fn preview(text: &str) -> String {
    let flat: String = text
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    if text.chars().count() > PREVIEW_CHARS {
        format!("{}…", flat)
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::{DocumentId, FieldType, SchemaDefinition, SchemaId};
    use docsift_extractor::TextChunker;

    fn chunks() -> Vec<Chunk> {
        let text = format!("{}\n\n{}", "a".repeat(50), "b".repeat(50));
        TextChunker::new(60, 10).unwrap().chunk(&text)
    }

    fn schema() -> SchemaFile {
        SchemaFile {
            name: "Invoice".to_string(),
            description: "Vendor invoices".to_string(),
            definition: SchemaDefinition::new(vec![
                FieldNode::scalar("number", FieldType::String).required(),
                FieldNode::array(
                    "lines",
                    ItemNode::object(vec![FieldNode::scalar("amount", FieldType::Number)]),
                ),
            ]),
            model: None,
        }
    }

    #[test]
    fn test_chunks_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_chunks(&chunks()).unwrap();
        assert!(output.contains("Overlap"));
        assert!(output.contains("1/2"));
        assert!(output.contains("2/2"));
    }

    #[test]
    fn test_chunks_json_and_quiet() {
        let json = Formatter::new(OutputFormat::Json, false)
            .format_chunks(&chunks())
            .unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1]["overlap"], 10);

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_chunks(&chunks())
            .unwrap();
        assert_eq!(quiet, "2");
    }

    #[test]
    fn test_empty_chunks() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_chunks(&[]).unwrap().contains("No chunks"));
    }

    #[test]
    fn test_schema_table_flattens_paths() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_schema(&schema()).unwrap();
        assert!(output.starts_with("Invoice - Vendor invoices"));
        assert!(output.contains("lines[].amount"));
        assert!(output.contains("yes"));
    }

    #[test]
    fn test_presets_listing() {
        let presets = docsift_extractor::presets();

        let table = Formatter::new(OutputFormat::Table, false)
            .format_presets(&presets)
            .unwrap();
        assert!(table.contains("Table of Contents"));
        assert!(table.contains("key_values"));

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_presets(&presets)
            .unwrap();
        assert_eq!(quiet, "toc\ntables\nkey_values\nsummary");

        let json = Formatter::new(OutputFormat::Json, false)
            .format_presets(&presets)
            .unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[1]["key"], "tables");
        assert_eq!(parsed[1]["schema"]["fields"][0]["name"], "tables");
    }

    #[test]
    fn test_job_quiet_is_status() {
        let job = Job::new(DocumentId::new(), SchemaId::new());
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        assert_eq!(formatter.format_job(&job).unwrap(), "pending");
    }

    #[test]
    fn test_value_quiet_is_compact() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_value(&json!({"a": [1, 2]})).unwrap();
        assert_eq!(output, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
