//! Field schema tree - the user-authored description of what to extract
//!
//! A schema is an ordered list of [`FieldNode`]s. A node's `type` decides
//! which children it may carry:
//!
//! | type | `fields` | `items` |
//! |------|----------|---------|
//! | string, number, integer, boolean | absent | absent |
//! | object | required | absent |
//! | array | absent | required |
//!
//! Array element shapes are [`ItemNode`]s, which follow the same rule but have
//! no name of their own.

use crate::error::SchemaViolation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Value type of a field or array item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    String,
    /// Any JSON number
    Number,
    /// Whole number
    Integer,
    /// true / false
    Boolean,
    /// Nested group of named fields
    Object,
    /// Ordered list of items
    Array,
}

impl FieldType {
    /// Get the type name as used in schemas and output shapes
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }

    /// Whether this is a leaf type
    pub fn is_scalar(&self) -> bool {
        !matches!(self, FieldType::Object | FieldType::Array)
    }
}

/// A named field in a schema tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    /// Stable identifier assigned by the schema builder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Field name, unique among its siblings
    pub name: String,

    /// Value type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the output shape lists this field as required
    #[serde(default)]
    pub required: bool,

    /// Extraction guidance for the model; never affects validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Child fields (object only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldNode>>,

    /// Element shape (array only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ItemNode>>,
}

/// Shape of the elements of an array field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemNode {
    /// Element type
    #[serde(rename = "type")]
    pub item_type: FieldType,

    /// Extraction guidance for the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Child fields (object elements only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldNode>>,

    /// Nested element shape (array elements only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ItemNode>>,
}

/// Root of a field schema tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Top-level fields, in declaration order
    #[serde(default)]
    pub fields: Vec<FieldNode>,
}

/// Declarative output description handed to the LLM-calling capability
///
/// A JSON Schema document (nested `type` / `properties` / `required`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputShape(Value);

impl OutputShape {
    /// Wrap an already-built shape description
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the underlying JSON value
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the underlying JSON value
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl FieldNode {
    /// Create a scalar field
    pub fn scalar(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: None,
            name: name.into(),
            field_type,
            required: false,
            description: None,
            fields: None,
            items: None,
        }
    }

    /// Create an object field with the given children
    pub fn object(name: impl Into<String>, fields: Vec<FieldNode>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::scalar(name, FieldType::Object)
        }
    }

    /// Create an array field with the given element shape
    pub fn array(name: impl Into<String>, items: ItemNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::scalar(name, FieldType::Array)
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach extraction guidance
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn validate_at(&self, parent: &str) -> Result<(), SchemaViolation> {
        let path = if parent.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", parent, self.name)
        };
        if self.name.trim().is_empty() {
            return Err(SchemaViolation::new(path, "name must not be empty"));
        }
        validate_shape(
            &path,
            self.field_type,
            self.fields.as_deref(),
            self.items.as_deref(),
        )
    }
}

impl ItemNode {
    /// Create a scalar element shape
    pub fn scalar(item_type: FieldType) -> Self {
        Self {
            item_type,
            description: None,
            fields: None,
            items: None,
        }
    }

    /// Create an object element shape
    pub fn object(fields: Vec<FieldNode>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::scalar(FieldType::Object)
        }
    }

    /// Create a nested-array element shape
    pub fn array(items: ItemNode) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::scalar(FieldType::Array)
        }
    }
}

impl SchemaDefinition {
    /// Create a definition from top-level fields
    pub fn new(fields: Vec<FieldNode>) -> Self {
        Self { fields }
    }

    /// Check the type/fields/items invariant and sibling-name uniqueness
    /// across the whole tree
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        validate_siblings("", &self.fields)
    }

    /// Number of top-level fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

fn validate_siblings(parent: &str, fields: &[FieldNode]) -> Result<(), SchemaViolation> {
    let mut seen = HashSet::new();
    for field in fields {
        field.validate_at(parent)?;
        if !seen.insert(field.name.as_str()) {
            let path = if parent.is_empty() {
                field.name.clone()
            } else {
                format!("{}.{}", parent, field.name)
            };
            return Err(SchemaViolation::new(path, "duplicate field name"));
        }
    }
    Ok(())
}

fn validate_shape(
    path: &str,
    field_type: FieldType,
    fields: Option<&[FieldNode]>,
    items: Option<&ItemNode>,
) -> Result<(), SchemaViolation> {
    match field_type {
        FieldType::Object => {
            if items.is_some() {
                return Err(SchemaViolation::new(path, "object fields cannot declare 'items'"));
            }
            let children = fields
                .ok_or_else(|| SchemaViolation::new(path, "object fields must declare 'fields'"))?;
            validate_siblings(path, children)
        }
        FieldType::Array => {
            if fields.is_some() {
                return Err(SchemaViolation::new(path, "array fields cannot declare 'fields'"));
            }
            let item = items
                .ok_or_else(|| SchemaViolation::new(path, "array fields must declare 'items'"))?;
            let item_path = format!("{}[]", path);
            validate_shape(
                &item_path,
                item.item_type,
                item.fields.as_deref(),
                item.items.as_deref(),
            )
        }
        scalar => {
            if fields.is_some() || items.is_some() {
                return Err(SchemaViolation::new(
                    path,
                    format!("{} fields cannot declare 'fields' or 'items'", scalar.as_str()),
                ));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> SchemaDefinition {
        SchemaDefinition::new(vec![
            FieldNode::scalar("invoice_number", FieldType::String).required(),
            FieldNode::object(
                "vendor",
                vec![
                    FieldNode::scalar("name", FieldType::String),
                    FieldNode::scalar("vat_id", FieldType::String),
                ],
            ),
            FieldNode::array(
                "line_items",
                ItemNode::object(vec![
                    FieldNode::scalar("description", FieldType::String).required(),
                    FieldNode::scalar("amount", FieldType::Number),
                ]),
            ),
        ])
    }

    #[test]
    fn test_valid_tree() {
        assert!(invoice().validate().is_ok());
    }

    #[test]
    fn test_empty_definition_is_valid() {
        assert!(SchemaDefinition::default().validate().is_ok());
    }

    #[test]
    fn test_scalar_with_children_rejected() {
        let mut field = FieldNode::scalar("total", FieldType::Number);
        field.fields = Some(vec![]);
        let err = SchemaDefinition::new(vec![field]).validate().unwrap_err();
        assert_eq!(err.path, "total");
    }

    #[test]
    fn test_object_without_fields_rejected() {
        let mut field = FieldNode::scalar("vendor", FieldType::Object);
        field.fields = None;
        assert!(SchemaDefinition::new(vec![field]).validate().is_err());
    }

    #[test]
    fn test_array_without_items_rejected() {
        let field = FieldNode::scalar("tags", FieldType::Array);
        let err = SchemaDefinition::new(vec![field]).validate().unwrap_err();
        assert!(err.reason.contains("items"));
    }

    #[test]
    fn test_duplicate_sibling_names_rejected() {
        let definition = SchemaDefinition::new(vec![
            FieldNode::scalar("a", FieldType::String),
            FieldNode::scalar("a", FieldType::Integer),
        ]);
        let err = definition.validate().unwrap_err();
        assert_eq!(err.reason, "duplicate field name");
    }

    #[test]
    fn test_same_name_in_different_objects_allowed() {
        let definition = SchemaDefinition::new(vec![
            FieldNode::object("a", vec![FieldNode::scalar("name", FieldType::String)]),
            FieldNode::object("b", vec![FieldNode::scalar("name", FieldType::String)]),
        ]);
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_nested_violation_reports_path() {
        let mut bad = FieldNode::scalar("qty", FieldType::Integer);
        bad.items = Some(Box::new(ItemNode::scalar(FieldType::String)));
        let definition = SchemaDefinition::new(vec![FieldNode::array(
            "line_items",
            ItemNode::object(vec![bad]),
        )]);
        let err = definition.validate().unwrap_err();
        assert_eq!(err.path, "line_items[].qty");
    }

    #[test]
    fn test_empty_name_rejected() {
        let definition = SchemaDefinition::new(vec![FieldNode::scalar(" ", FieldType::String)]);
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_deserialize_builder_format() {
        let json = r#"{
            "fields": [
                {"id": "f1", "name": "title", "type": "string", "description": "Document title", "required": true},
                {"name": "rows", "type": "array", "items": {"type": "array", "items": {"type": "string"}}},
                {"name": "entities", "type": "array", "items": {"type": "object", "fields": [
                    {"name": "name", "type": "string", "required": true}
                ]}}
            ]
        }"#;
        let definition: SchemaDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(definition.field_count(), 3);
        assert_eq!(definition.fields[0].id.as_deref(), Some("f1"));
        assert!(definition.fields[0].required);
        assert!(!definition.fields[1].required);
        assert!(definition.validate().is_ok());
    }

    #[test]
    fn test_unknown_type_fails_to_parse() {
        let json = r#"{"fields": [{"name": "x", "type": "date"}]}"#;
        assert!(serde_json::from_str::<SchemaDefinition>(json).is_err());
    }
}
