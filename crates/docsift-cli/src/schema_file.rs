//! Schema files read by `extract` and `shape` and written by `suggest`.

use crate::error::{CliError, Result};
use docsift_domain::{ExtractionSchema, SchemaDefinition};
use docsift_extractor::{preset, SchemaPreset, PRESET_KEYS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk schema: `{"name": ..., "description": ..., "fields": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    /// Schema name, also used to name the model's output
    pub name: String,

    /// Free-text description handed to the model
    #[serde(default)]
    pub description: String,

    /// Field tree
    #[serde(flatten)]
    pub definition: SchemaDefinition,

    /// Preferred model for this schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl SchemaFile {
    /// Read and validate a schema file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let file: SchemaFile = serde_json::from_str(&contents)?;
        if file.name.trim().is_empty() {
            return Err(CliError::InvalidInput(format!(
                "{}: schema name must not be empty",
                path.display()
            )));
        }
        file.definition
            .validate()
            .map_err(|v| CliError::InvalidInput(format!("{}: {}", path.display(), v)))?;
        Ok(file)
    }

    /// Load a built-in preset by key
    pub fn from_preset(key: &str) -> Result<Self> {
        preset(key).map(Self::from).ok_or_else(|| {
            CliError::InvalidInput(format!(
                "unknown preset '{}' (available: {})",
                key,
                PRESET_KEYS.join(", ")
            ))
        })
    }

    /// Build the stored schema, using `model` for extraction
    pub fn into_schema(self, model: impl Into<String>) -> ExtractionSchema {
        ExtractionSchema::new(self.name, self.definition, model).with_description(self.description)
    }
}

impl From<SchemaPreset> for SchemaFile {
    fn from(preset: SchemaPreset) -> Self {
        Self {
            name: preset.schema.name,
            description: preset.schema.description,
            definition: preset.schema.definition,
            model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_domain::FieldType;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_schema_file() {
        let file = write_temp(
            r#"{
                "name": "Invoice",
                "description": "Vendor invoices",
                "fields": [
                    {"name": "number", "type": "string", "required": true},
                    {"name": "lines", "type": "array", "items": {"type": "object", "fields": [
                        {"name": "amount", "type": "number"}
                    ]}}
                ]
            }"#,
        );

        let schema = SchemaFile::load(file.path()).unwrap();
        assert_eq!(schema.name, "Invoice");
        assert_eq!(schema.definition.fields.len(), 2);
        assert_eq!(schema.definition.fields[0].field_type, FieldType::String);
        assert!(schema.model.is_none());

        let stored = schema.into_schema("llama3.1");
        assert_eq!(stored.description, "Vendor invoices");
        assert_eq!(stored.llm_model, "llama3.1");
    }

    #[test]
    fn test_malformed_tree_rejected() {
        let file = write_temp(r#"{"name": "x", "fields": [{"name": "tags", "type": "array"}]}"#);
        assert!(matches!(SchemaFile::load(file.path()), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_every_preset_loads() {
        for key in PRESET_KEYS {
            let file = SchemaFile::from_preset(key).unwrap();
            assert!(file.definition.validate().is_ok());
            assert!(file.model.is_none());
        }
        assert_eq!(SchemaFile::from_preset("toc").unwrap().name, "Table of Contents");
    }

    #[test]
    fn test_unknown_preset_lists_keys() {
        match SchemaFile::from_preset("invoice") {
            Err(CliError::InvalidInput(msg)) => assert!(msg.contains("toc, tables, key_values, summary")),
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_model_is_omitted() {
        let file = SchemaFile {
            name: "Receipt".to_string(),
            description: String::new(),
            definition: SchemaDefinition::default(),
            model: None,
        };
        let json = serde_json::to_value(file).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Receipt", "description": "", "fields": []}));
    }
}
