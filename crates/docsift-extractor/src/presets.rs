//! Built-in schemas for documents whose structure is not known up front
//!
//! Every call builds fresh field trees with new field ids.

use crate::suggest::assign_ids;
use crate::types::SuggestedSchema;
use docsift_domain::{FieldNode, FieldType, ItemNode, SchemaDefinition};

/// A ready-made extraction schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaPreset {
    /// Stable lookup key (`toc`, `tables`, ...)
    pub key: &'static str,
    /// Short human-readable label
    pub label: &'static str,
    /// What the preset pulls out of a document
    pub summary: &'static str,
    /// Schema name, description and field tree
    pub schema: SuggestedSchema,
}

/// Keys of every built-in preset, in listing order
pub const PRESET_KEYS: [&str; 4] = ["toc", "tables", "key_values", "summary"];

/// All built-in presets
pub fn presets() -> Vec<SchemaPreset> {
    vec![
        table_of_contents(),
        tables(),
        key_values(),
        document_summary(),
    ]
}

/// Look up a preset by key
pub fn preset(key: &str) -> Option<SchemaPreset> {
    presets().into_iter().find(|p| p.key == key)
}

fn build(
    key: &'static str,
    label: &'static str,
    summary: &'static str,
    name: &str,
    description: &str,
    mut fields: Vec<FieldNode>,
) -> SchemaPreset {
    assign_ids(&mut fields);
    SchemaPreset {
        key,
        label,
        summary,
        schema: SuggestedSchema {
            name: name.to_string(),
            description: description.to_string(),
            definition: SchemaDefinition::new(fields),
        },
    }
}

fn text(name: &str, description: &str) -> FieldNode {
    FieldNode::scalar(name, FieldType::String).with_description(description)
}

fn heading_fields(heading: &str, level: &str) -> Vec<FieldNode> {
    vec![
        text("heading", heading).required(),
        FieldNode::scalar("level", FieldType::Integer)
            .with_description(level)
            .required(),
    ]
}

fn table_of_contents() -> SchemaPreset {
    let mut section = heading_fields("Section heading text.", "Heading level (1=top, 2=sub, etc.).");
    section.push(
        FieldNode::array(
            "subsections",
            ItemNode::object(heading_fields("Subsection heading.", "Heading level.")),
        )
        .with_description("Child sections under this heading."),
    );

    build(
        "toc",
        "Table of Contents",
        "Extract the hierarchical structure / headings of a document.",
        "Table of Contents",
        "Extract the document's hierarchical heading structure.",
        vec![
            text("title", "The document title or main heading.").required(),
            FieldNode::array("sections", ItemNode::object(section))
                .with_description("Top-level sections/headings in order.")
                .required(),
        ],
    )
}

fn tables() -> SchemaPreset {
    let table = vec![
        text("table_title", "Title or caption of the table, if any."),
        FieldNode::array("headers", ItemNode::scalar(FieldType::String))
            .with_description("Column headers of the table.")
            .required(),
        FieldNode::array(
            "rows",
            ItemNode::array(ItemNode::scalar(FieldType::String)),
        )
        .with_description("Data rows. Each row is an array of cell values.")
        .required(),
    ];

    build(
        "tables",
        "Tables Extractor",
        "Find and extract all tables embedded in unstructured text.",
        "Tables Extractor",
        "Extract all tables found in the document, including headers and rows.",
        vec![FieldNode::array("tables", ItemNode::object(table))
            .with_description("All tables found in the document.")
            .required()],
    )
}

fn key_values() -> SchemaPreset {
    let entry = vec![
        text("key", "The label, field name, or key.").required(),
        text("value", "The corresponding value.").required(),
        text("category", "Optional category or section this pair belongs to."),
    ];

    build(
        "key_values",
        "Key-Value Pairs",
        "Extract all key-value pairs, labels and their values from the document.",
        "Key-Value Extractor",
        "Extract all identifiable key-value pairs from the document.",
        vec![FieldNode::array("entries", ItemNode::object(entry))
            .with_description("All key-value pairs found in the document.")
            .required()],
    )
}

fn document_summary() -> SchemaPreset {
    let entity = vec![
        text("name", "Entity name or value.").required(),
        text("type", "Entity type (person, org, date, amount, location, etc.).").required(),
    ];

    build(
        "summary",
        "Document Summary",
        "Extract a structured summary with metadata, key points, and entities.",
        "Document Summary",
        "Extract a structured summary of the document including metadata and key information.",
        vec![
            text("title", "Document title or subject.").required(),
            text(
                "document_type",
                "Type of document (report, letter, invoice, contract, etc.).",
            )
            .required(),
            text("language", "Primary language of the document."),
            text("summary", "A concise summary of the document content.").required(),
            FieldNode::array("key_points", ItemNode::scalar(FieldType::String))
                .with_description("Main points or findings in the document.")
                .required(),
            FieldNode::array("entities", ItemNode::object(entity))
                .with_description("Named entities (people, organizations, dates, amounts) found."),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::translate;

    fn all_ids(fields: &[FieldNode], out: &mut Vec<String>) {
        for field in fields {
            out.extend(field.id.clone());
            if let Some(children) = &field.fields {
                all_ids(children, out);
            }
            let mut item = field.items.as_deref();
            while let Some(node) = item {
                if let Some(children) = &node.fields {
                    all_ids(children, out);
                }
                item = node.items.as_deref();
            }
        }
    }

    #[test]
    fn test_every_preset_is_valid() {
        for preset in presets() {
            assert!(
                preset.schema.definition.validate().is_ok(),
                "preset {} is malformed",
                preset.key
            );
            assert!(translate(&preset.schema.definition).is_ok());
        }
    }

    #[test]
    fn test_keys_match_listing() {
        let keys: Vec<&str> = presets().iter().map(|p| p.key).collect();
        assert_eq!(keys, PRESET_KEYS);
        for key in PRESET_KEYS {
            assert_eq!(preset(key).map(|p| p.key), Some(key));
        }
        assert!(preset("invoice").is_none());
    }

    #[test]
    fn test_every_field_has_an_id() {
        for preset in presets() {
            let mut ids = Vec::new();
            all_ids(&preset.schema.definition.fields, &mut ids);
            assert!(!ids.is_empty());
            assert!(ids.iter().all(|id| !id.is_empty()));
        }
    }

    #[test]
    fn test_table_rows_are_nested_arrays() {
        let tables = preset("tables").unwrap();
        let table = tables.schema.definition.fields[0].items.as_deref().unwrap();
        let rows = table
            .fields
            .as_ref()
            .unwrap()
            .iter()
            .find(|f| f.name == "rows")
            .unwrap();
        let row = rows.items.as_deref().unwrap();
        assert_eq!(row.item_type, FieldType::Array);
        assert_eq!(row.items.as_deref().unwrap().item_type, FieldType::String);
    }

    #[test]
    fn test_toc_subsections_are_optional() {
        let toc = preset("toc").unwrap();
        let section = toc.schema.definition.fields[1].items.as_deref().unwrap();
        let sub = section
            .fields
            .as_ref()
            .unwrap()
            .iter()
            .find(|f| f.name == "subsections")
            .unwrap();
        assert!(!sub.required);
    }
}
