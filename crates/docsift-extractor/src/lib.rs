//! Docsift Extractor
//!
//! Extracts structured data from free text by calling an LLM against a
//! user-defined field schema.
//!
//! # Architecture
//!
//! ```text
//! Document → should_chunk? ─no──→ one LLM call ───────────────→ result
//!                 │
//!                yes
//!                 ↓
//!          TextChunker → chunk 0 → LLM → accumulated
//!                        chunk i → LLM(accumulated, chunk) → merge → accumulated
//!                        ...
//! ```
//!
//! Each later chunk's prompt carries the accumulated result and asks the
//! model to merge into it. The deterministic [`merge`] then runs on top of the
//! model's answer, so data found in earlier chunks is never lost even when
//! the model drops it.
//!
//! # Key Features
//!
//! - **Paragraph-aware chunking** with verbatim overlap between chunks
//! - **Lossless merge** of partial results
//! - **Schema translation** from field trees to JSON Schema output shapes
//! - **Progress reporting** after every chunk via [`ExtractionObserver`]
//! - **Schema suggestion** from a head-and-tail document sample
//! - **Built-in presets** for tables of contents, tables, key-value pairs and
//!   summaries
//!
//! # Example Usage
//!
//! ```no_run
//! use docsift_domain::{FieldNode, FieldType, SchemaDefinition};
//! use docsift_extractor::{ExtractionRequest, Extractor, ExtractorConfig};
//! use docsift_llm::MockProvider;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(json!({"vendor": "Acme"}));
//! let extractor = Extractor::new(llm, ExtractorConfig::default())?;
//!
//! let request = ExtractionRequest {
//!     text: "Invoice from Acme Corp.".to_string(),
//!     schema_name: "Invoice".to_string(),
//!     schema_description: String::new(),
//!     definition: SchemaDefinition::new(vec![FieldNode::scalar("vendor", FieldType::String)]),
//!     model: "llama3.1".to_string(),
//! };
//!
//! let outcome = extractor.extract(&request).await?;
//! println!("{}", outcome.result);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod merge;
mod presets;
mod prompt;
mod shape;
mod suggest;
mod types;


pub use chunking::{should_chunk, TextChunker};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::{ExtractionObserver, Extractor};
pub use merge::{canonical, merge};
pub use presets::{preset, presets, SchemaPreset, PRESET_KEYS};
pub use shape::translate;
pub use suggest::{parse_suggestion, sample_document, DEFAULT_SUGGESTION_NAME};
pub use types::{Chunk, ExtractionOutcome, ExtractionRequest, SuggestedSchema};
