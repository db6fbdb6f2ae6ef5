//! Documents and the schemas they are extracted against

use crate::ids::{DocumentId, SchemaId};
use crate::schema::SchemaDefinition;
use serde::{Deserialize, Serialize};

/// An uploaded document's plain-text content
///
/// Text extraction from binary formats happens before a document reaches
/// this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Human-readable title
    pub title: String,

    /// Full document text
    pub text: String,
}

impl Document {
    /// Create a document with a fresh identifier
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new(),
            title: title.into(),
            text: text.into(),
        }
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// A user-defined extraction schema plus the model it runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSchema {
    /// Unique identifier
    pub id: SchemaId,

    /// Display name, also used to name the structured output
    pub name: String,

    /// What the schema extracts; passed to the model as output guidance
    #[serde(default)]
    pub description: String,

    /// The field tree
    pub definition: SchemaDefinition,

    /// Model identifier handed to the LLM-calling capability
    pub llm_model: String,
}

impl ExtractionSchema {
    /// Create a schema with a fresh identifier
    pub fn new(
        name: impl Into<String>,
        definition: SchemaDefinition,
        llm_model: impl Into<String>,
    ) -> Self {
        Self {
            id: SchemaId::new(),
            name: name.into(),
            description: String::new(),
            definition,
            llm_model: llm_model.into(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
