//! Types for extraction requests and results

use docsift_domain::{Document, ExtractionSchema, SchemaDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A contiguous piece of a document sent to one LLM call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the sequence (0-based)
    pub index: usize,

    /// Number of chunks in the sequence
    pub total: usize,

    /// Chunk text, including the overlap prefix
    pub text: String,

    /// Character offset of the first character in the document
    pub start: usize,

    /// Character offset one past the last character
    pub end: usize,

    /// Leading characters repeated from the previous chunk
    pub overlap: usize,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }

    /// The part of the text not already covered by the previous chunk
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((byte, _)) => &self.text[byte..],
            None => "",
        }
    }
}

/// Request to extract one document against one schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Document text
    pub text: String,

    /// Schema name (shown to the model and used as output name)
    pub schema_name: String,

    /// Schema description (shown to the model)
    pub schema_description: String,

    /// Field schema tree to extract
    pub definition: SchemaDefinition,

    /// Model identifier
    pub model: String,
}

impl ExtractionRequest {
    /// Build a request from stored entities
    pub fn new(document: &Document, schema: &ExtractionSchema) -> Self {
        Self {
            text: document.text.clone(),
            schema_name: schema.name.clone(),
            schema_description: schema.description.clone(),
            definition: schema.definition.clone(),
            model: schema.llm_model.clone(),
        }
    }
}

/// Result of a successful extraction attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Extracted (and, for chunked documents, merged) data
    pub result: Value,

    /// Whether the document was processed chunk by chunk
    pub is_chunked: bool,

    /// Number of chunks (1 for single-pass, 0 for empty input)
    pub total_chunks: usize,

    /// Model that produced the result
    pub model_name: String,

    /// Wall-clock time of the attempt
    pub processing_time_ms: u64,
}

/// A named field tree, proposed by the model or taken from a preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedSchema {
    /// Proposed schema name
    pub name: String,

    /// Proposed schema description
    pub description: String,

    /// Proposed field tree; every node carries an `id`
    pub definition: SchemaDefinition,
}
