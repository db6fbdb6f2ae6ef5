//! Field schema tree to JSON Schema output shape

use crate::error::ExtractorError;
use docsift_domain::{FieldNode, FieldType, ItemNode, OutputShape, SchemaDefinition};
use serde_json::{json, Map, Value};

/// Translate a field schema tree into the output shape given to the model
///
/// The root is always an object. `required` lists the fields marked
/// required, in declaration order, and is left out when empty. Descriptions
/// are copied through as guidance.
pub fn translate(definition: &SchemaDefinition) -> Result<OutputShape, ExtractorError> {
    definition.validate()?;
    Ok(OutputShape::new(object_shape(&definition.fields, None)))
}

fn object_shape(fields: &[FieldNode], description: Option<&str>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name.clone(), field_shape(field));
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    let mut shape = Map::new();
    shape.insert("type".into(), json!("object"));
    shape.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        shape.insert("required".into(), Value::Array(required));
    }
    with_description(shape, description)
}

fn field_shape(field: &FieldNode) -> Value {
    node_shape(
        field.field_type,
        field.fields.as_deref(),
        field.items.as_deref(),
        field.description.as_deref(),
    )
}

fn item_shape(item: &ItemNode) -> Value {
    node_shape(
        item.item_type,
        item.fields.as_deref(),
        item.items.as_deref(),
        item.description.as_deref(),
    )
}

fn node_shape(
    field_type: FieldType,
    fields: Option<&[FieldNode]>,
    items: Option<&ItemNode>,
    description: Option<&str>,
) -> Value {
    match field_type {
        FieldType::Object => object_shape(fields.unwrap_or_default(), description),
        FieldType::Array => {
            let mut shape = Map::new();
            shape.insert("type".into(), json!("array"));
            if let Some(item) = items {
                shape.insert("items".into(), item_shape(item));
            }
            with_description(shape, description)
        }
        scalar => {
            let mut shape = Map::new();
            shape.insert("type".into(), json!(scalar.as_str()));
            with_description(shape, description)
        }
    }
}

fn with_description(mut shape: Map<String, Value>, description: Option<&str>) -> Value {
    if let Some(text) = description.filter(|d| !d.is_empty()) {
        shape.insert("description".into(), json!(text));
    }
    Value::Object(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_schema() {
        let definition = SchemaDefinition::new(vec![
            FieldNode::scalar("title", FieldType::String)
                .required()
                .with_description("Document title"),
            FieldNode::scalar("pages", FieldType::Integer),
        ]);
        let shape = translate(&definition).unwrap();
        assert_eq!(
            shape.into_value(),
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "Document title"},
                    "pages": {"type": "integer"}
                },
                "required": ["title"]
            })
        );
    }

    #[test]
    fn test_array_of_objects_lists_required_items() {
        let definition = SchemaDefinition::new(vec![FieldNode::array(
            "line_items",
            ItemNode::object(vec![
                FieldNode::scalar("description", FieldType::String).required(),
                FieldNode::scalar("amount", FieldType::Number),
            ]),
        )]);
        let shape = translate(&definition).unwrap().into_value();
        let items = &shape["properties"]["line_items"]["items"];

        assert_eq!(shape["properties"]["line_items"]["type"], "array");
        assert_eq!(items["type"], "object");
        assert_eq!(items["required"], json!(["description"]));
        assert_eq!(items["properties"]["amount"], json!({"type": "number"}));
        assert!(shape.get("required").is_none());
    }

    #[test]
    fn test_nested_object_and_array_of_arrays() {
        let definition = SchemaDefinition::new(vec![
            FieldNode::object(
                "vendor",
                vec![FieldNode::scalar("name", FieldType::String).required()],
            )
            .with_description("Who issued it"),
            FieldNode::array("matrix", ItemNode::array(ItemNode::scalar(FieldType::Number))),
        ]);
        let shape = translate(&definition).unwrap().into_value();
        assert_eq!(
            shape["properties"]["vendor"],
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "required": ["name"],
                "description": "Who issued it"
            })
        );
        assert_eq!(
            shape["properties"]["matrix"]["items"],
            json!({"type": "array", "items": {"type": "number"}})
        );
    }

    #[test]
    fn test_required_follows_declaration_order() {
        let definition = SchemaDefinition::new(vec![
            FieldNode::scalar("z", FieldType::String).required(),
            FieldNode::scalar("a", FieldType::String).required(),
        ]);
        let shape = translate(&definition).unwrap().into_value();
        assert_eq!(shape["required"], json!(["z", "a"]));
    }

    #[test]
    fn test_malformed_schema_rejected() {
        let definition = SchemaDefinition::new(vec![FieldNode::scalar("tags", FieldType::Array)]);
        let err = translate(&definition).unwrap_err();
        assert!(matches!(err, ExtractorError::MalformedSchema(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_empty_description_skipped() {
        let definition = SchemaDefinition::new(vec![
            FieldNode::scalar("x", FieldType::Boolean).with_description("")
        ]);
        let shape = translate(&definition).unwrap().into_value();
        assert_eq!(shape["properties"]["x"], json!({"type": "boolean"}));
    }

    #[test]
    fn test_translation_is_deterministic() {
        let definition = SchemaDefinition::new(vec![FieldNode::object(
            "a",
            vec![FieldNode::scalar("b", FieldType::String)],
        )]);
        assert_eq!(translate(&definition).unwrap(), translate(&definition).unwrap());
    }
}
