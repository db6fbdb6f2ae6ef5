//! Deterministic merge of partial extraction results
//!
//! Applied after every chunk on top of whatever merging the model did itself.
//! The merge is total: any two JSON values produce a value.
//!
//! - null on either side yields the other side
//! - objects merge key by key, recursively; base keys keep their order and
//!   new keys are appended in update order
//! - arrays concatenate and drop structural duplicates, first occurrence wins
//! - scalars keep the base unless it is empty (`null`, `""`, `0`, `false`)
//! - for a type mismatch an empty scalar base (`""`, `0`, `false`) is
//!   replaced; any other base, including `[]` and `{}`, is kept and a warning
//!   is logged

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::warn;

/// Merge `update` into `base`
pub fn merge(base: Value, update: Value) -> Value {
    match (base, update) {
        (Value::Null, update) => update,
        (base, Value::Null) => base,
        (Value::Object(base), Value::Object(update)) => Value::Object(merge_objects(base, update)),
        (Value::Array(base), Value::Array(update)) => Value::Array(merge_arrays(base, update)),
        (base, update) if is_scalar(&base) && is_scalar(&update) => {
            if is_empty(&base) && !is_empty(&update) {
                update
            } else {
                base
            }
        }
        (base, update) => {
            if is_empty(&base) {
                update
            } else {
                warn!(
                    base = type_name(&base),
                    update = type_name(&update),
                    "Type mismatch while merging, keeping existing value"
                );
                base
            }
        }
    }
}

fn merge_objects(mut base: Map<String, Value>, update: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in update {
        match base.get_mut(&key) {
            Some(existing) => {
                let current = existing.take();
                *existing = merge(current, value);
            }
            None => {
                base.insert(key, value);
            }
        }
    }
    base
}

fn merge_arrays(base: Vec<Value>, update: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    base.into_iter()
        .chain(update)
        .filter(|item| seen.insert(canonical(item)))
        .collect()
}

/// Serialization with object keys sorted, so key order never affects equality
pub fn canonical(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                if let Some(inner) = map.get(key) {
                    write_canonical(inner, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(b) => !b,
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
