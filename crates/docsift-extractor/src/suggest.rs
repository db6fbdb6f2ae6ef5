//! Schema suggestion: ask the model to propose a field tree for a document

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::extractor::Extractor;
use crate::prompt;
use crate::types::SuggestedSchema;
use docsift_domain::{FieldNode, ItemNode, LlmCaller, LlmRequest, SchemaDefinition};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

/// Name used when the model does not provide one
pub const DEFAULT_SUGGESTION_NAME: &str = "Suggested Schema";

const TRUNCATION_MARKER: &str = "\n\n... [document truncated for analysis] ...\n\n";

/// Bounded view of a document for schema analysis
///
/// Documents over `suggestion_sample_threshold` characters are reduced to
/// their head and tail joined by a truncation marker.
pub fn sample_document(text: &str, config: &ExtractorConfig) -> String {
    let len = text.chars().count();
    if len <= config.suggestion_sample_threshold {
        return text.to_string();
    }
    let head: String = text.chars().take(config.suggestion_head_chars).collect();
    let tail: String = text
        .chars()
        .skip(len - config.suggestion_tail_chars)
        .collect();
    format!("{}{}{}", head, TRUNCATION_MARKER, tail)
}

impl<L> Extractor<L>
where
    L: LlmCaller,
{
    /// Propose a schema for `text` using `model`
    ///
    /// A proposal whose field tree is not well formed is reported as
    /// `InvalidFormat`, which is retryable.
    pub async fn suggest_schema(
        &self,
        text: &str,
        model: &str,
    ) -> Result<SuggestedSchema, ExtractorError> {
        let sample = sample_document(text, self.config());
        info!(
            "Suggesting schema from {} of {} chars",
            sample.chars().count(),
            text.chars().count()
        );

        let prompt = prompt::suggestion(&sample);
        let request = LlmRequest {
            model: model.to_string(),
            system_prompt: prompt.system,
            user_message: prompt.user,
            output_shape: prompt::suggestion_shape(),
            output_name: "SchemaSuggestion".to_string(),
            output_description: "Suggest an extraction schema for the given document.".to_string(),
        };
        let value = self.call_llm(&request).await?;
        parse_suggestion(value)
    }
}

/// Turn the model's answer into a validated suggestion with field ids
pub fn parse_suggestion(value: Value) -> Result<SuggestedSchema, ExtractorError> {
    let Value::Object(mut map) = value else {
        return Err(ExtractorError::InvalidFormat(
            "schema suggestion must be a JSON object".to_string(),
        ));
    };

    let name = match map.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => DEFAULT_SUGGESTION_NAME.to_string(),
    };
    let description = map
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut fields: Vec<FieldNode> = match map.remove("fields") {
        Some(Value::Null) | None => Vec::new(),
        Some(raw) => serde_json::from_value(raw)?,
    };
    assign_ids(&mut fields);

    let definition = SchemaDefinition::new(fields);
    definition
        .validate()
        .map_err(|violation| ExtractorError::InvalidFormat(violation.to_string()))?;

    Ok(SuggestedSchema {
        name,
        description,
        definition,
    })
}

pub(crate) fn assign_ids(fields: &mut [FieldNode]) {
    for field in fields {
        if field.id.as_deref().is_none_or(str::is_empty) {
            field.id = Some(Uuid::now_v7().to_string());
        }
        if let Some(children) = field.fields.as_mut() {
            assign_ids(children);
        }
        if let Some(item) = field.items.as_mut() {
            assign_item_ids(item);
        }
    }
}

fn assign_item_ids(item: &mut ItemNode) {
    if let Some(children) = item.fields.as_mut() {
        assign_ids(children);
    }
    if let Some(inner) = item.items.as_mut() {
        assign_item_ids(inner);
    }
}
