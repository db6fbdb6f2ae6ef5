//! LLM prompt engineering for structured extraction

use crate::error::ExtractorError;
use crate::types::Chunk;
use docsift_domain::OutputShape;
use serde_json::{json, Value};

/// System prompt plus user message for one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions
    pub system: String,
    /// Content to work on
    pub user: String,
}

/// Prompt for a document small enough for one call
pub fn single_pass(text: &str) -> Prompt {
    Prompt {
        system: SINGLE_PASS_INSTRUCTIONS.to_string(),
        user: text.to_string(),
    }
}

/// Prompt for chunk 0 of a chunked document
pub fn first_chunk(chunk: &Chunk) -> Prompt {
    Prompt {
        system: format!(
            "{}\nThis document is long and arrives in {} chunks. This is the FIRST chunk.\n{}",
            ROLE, chunk.total, FIRST_CHUNK_RULES
        ),
        user: chunk.text.clone(),
    }
}

/// Prompt for chunk `i > 0`: the accumulated result plus the new text
pub fn next_chunk(chunk: &Chunk, accumulated: &Value) -> Result<Prompt, ExtractorError> {
    let previous = serde_json::to_string_pretty(accumulated)?;
    Ok(Prompt {
        system: format!(
            "{}\nThis is chunk {} of {} of a long document.\n\n{}",
            ROLE,
            chunk.index + 1,
            chunk.total,
            MERGE_RULES
        ),
        user: format!(
            "=== PREVIOUS RESULT (preserve ALL of this data) ===\n```json\n{}\n```\n\n\
             === NEW CHUNK (extract new data from this and merge) ===\n{}",
            previous, chunk.text
        ),
    })
}

/// Prompt asking the model to propose a schema for a document sample
pub fn suggestion(sample: &str) -> Prompt {
    Prompt {
        system: SUGGESTION_INSTRUCTIONS.to_string(),
        user: format!(
            "Analyze this document and suggest an extraction schema:\n\n{}",
            sample
        ),
    }
}

/// Output name derived from a schema name (spaces and dashes become `_`)
pub fn output_name(schema_name: &str) -> String {
    schema_name.replace([' ', '-'], "_")
}

/// Output description: the schema description, or a generic one
pub fn output_description(schema_name: &str, schema_description: &str) -> String {
    if schema_description.trim().is_empty() {
        format!("Extract structured data using the '{}' schema.", schema_name)
    } else {
        schema_description.to_string()
    }
}

/// Output shape the model fills in when suggesting a schema
pub fn suggestion_shape() -> OutputShape {
    let leaf_field = json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "type": {"type": "string", "enum": ["string", "number", "integer", "boolean"]},
            "description": {"type": "string"},
            "required": {"type": "boolean"}
        },
        "required": ["name", "type", "description", "required"]
    });

    OutputShape::new(json!({
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "Short descriptive schema name, e.g. 'Invoice Extractor'."
            },
            "description": {
                "type": "string",
                "description": "One sentence on what the schema extracts."
            },
            "fields": {
                "type": "array",
                "description": "Fields to extract from documents like this one.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string", "description": "Field name in snake_case."},
                        "type": {
                            "type": "string",
                            "enum": ["string", "number", "integer", "boolean", "object", "array"],
                            "description": "Data type of the field."
                        },
                        "description": {
                            "type": "string",
                            "description": "What the field captures, as guidance for the extractor."
                        },
                        "required": {"type": "boolean", "description": "Whether the field is essential."},
                        "fields": {
                            "type": "array",
                            "description": "Sub-fields, for object fields.",
                            "items": leaf_field.clone()
                        },
                        "items": {
                            "type": "object",
                            "description": "Element definition, for array fields.",
                            "properties": {
                                "type": {
                                    "type": "string",
                                    "enum": ["string", "number", "integer", "boolean", "object"]
                                },
                                "fields": {
                                    "type": "array",
                                    "description": "Sub-fields, for arrays of objects.",
                                    "items": leaf_field
                                }
                            }
                        }
                    },
                    "required": ["name", "type", "description", "required"]
                }
            }
        },
        "required": ["name", "description", "fields"]
    }))
}

const ROLE: &str = "You are a document data extraction specialist.";

const SINGLE_PASS_INSTRUCTIONS: &str = r#"You are a document data extraction specialist.
Extract structured information from the document strictly according to the provided schema.
Use the field descriptions as guidance for what to extract.
Be thorough and accurate. If the document does not contain a field's data, use null.
Return ONLY the structured data, with no explanations."#;

const FIRST_CHUNK_RULES: &str = r#"Extract structured information strictly according to the provided schema.
Use the field descriptions as guidance.
If a field's data has not appeared yet, use null.
For array fields, include every item found in this chunk.
Return ONLY the structured data, with no explanations."#;

const MERGE_RULES: &str = r#"CRITICAL RULES:
- You will receive a PREVIOUS RESULT (JSON) and a NEW CHUNK of text.
- The PREVIOUS RESULT holds ALL data extracted from earlier chunks. Preserve every value in it.
- Read the NEW CHUNK and extract any additional information according to the schema.
- MERGE the new data INTO the previous result:
   * Array fields: APPEND new items to the existing array. NEVER remove existing items.
   * Scalar fields (string, number, boolean): KEEP the existing value UNLESS it is null and the new chunk has a value.
   * Object fields: merge sub-fields recursively with the same rules.
- The output MUST contain ALL data from the previous result PLUS any new data from this chunk.
- If the new chunk has nothing relevant, return the previous result unchanged.
- Return ONLY the structured JSON, with no explanations."#;

const SUGGESTION_INSTRUCTIONS: &str = r#"You are a document analysis specialist. Analyze the document and suggest an extraction schema: a set of structured fields that captures the key information in documents like this one.

Guidelines:
- Identify ALL meaningful data points in the document.
- Use snake_case for field names.
- Choose types from: string, number, integer, boolean, object, array.
- Use 'array' for lists of items (line items on an invoice, skills on a resume).
- Use 'object' for groups of related fields (an address with street, city, zip).
- For array fields, define 'items' with a type and, for objects, its fields.
- For object fields, define nested 'fields'.
- Write descriptions that tell an extractor what to look for.
- Mark essential fields as required.
- Give the schema a descriptive name and description.
Return ONLY the structured suggestion, with no explanations."#;
