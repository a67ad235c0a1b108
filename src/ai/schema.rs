//! Validation of generated JSON against the `responseSchema` dialect
//! (`OBJECT`/`ARRAY`/`STRING`/... with `properties`, `required`, `items`,
//! `minItems`, `maxItems`, `enum`). Keys outside that set are ignored.

use serde_json::Value;
use std::fmt;

/// First place where a value departs from its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// Dotted path to the offending value, `$` for the root.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

impl std::error::Error for SchemaViolation {}

/// Check `value` against `schema`.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`] found, depth-first in property order.
pub fn validate(schema: &Value, value: &Value) -> Result<(), SchemaViolation> {
    validate_at(schema, value, "$")
}

fn violation(path: &str, reason: impl Into<String>) -> SchemaViolation {
    SchemaViolation {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn validate_at(schema: &Value, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    if value.is_null() {
        if schema.get("nullable").and_then(Value::as_bool) == Some(true) {
            return Ok(());
        }
        return Err(violation(path, "null is not allowed"));
    }

    let Some(ty) = schema.get("type").and_then(Value::as_str) else {
        return Ok(());
    };

    match ty.to_ascii_uppercase().as_str() {
        "OBJECT" => validate_object(schema, value, path),
        "ARRAY" => validate_array(schema, value, path),
        "STRING" => {
            let Some(s) = value.as_str() else {
                return Err(violation(path, "expected a string"));
            };
            if let Some(options) = schema.get("enum").and_then(Value::as_array) {
                if !options.iter().any(|o| o.as_str() == Some(s)) {
                    return Err(violation(path, format!("{s:?} is not an allowed value")));
                }
            }
            Ok(())
        }
        "NUMBER" if value.is_number() => Ok(()),
        "INTEGER" if value.is_i64() || value.is_u64() => Ok(()),
        "BOOLEAN" if value.is_boolean() => Ok(()),
        other => Err(violation(path, format!("expected {}", other.to_ascii_lowercase()))),
    }
}

fn validate_object(schema: &Value, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let Some(object) = value.as_object() else {
        return Err(violation(path, "expected an object"));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                return Err(violation(
                    &format!("{path}.{name}"),
                    "required field is missing",
                ));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (name, property_schema) in properties {
            if let Some(child) = object.get(name) {
                validate_at(property_schema, child, &format!("{path}.{name}"))?;
            }
        }
    }

    Ok(())
}

fn validate_array(schema: &Value, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let Some(items) = value.as_array() else {
        return Err(violation(path, "expected an array"));
    };

    let bound = |key: &str| {
        schema.get(key).and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        })
    };

    if let Some(min) = bound("minItems") {
        if (items.len() as u64) < min {
            return Err(violation(path, format!("expected at least {min} items")));
        }
    }
    if let Some(max) = bound("maxItems") {
        if (items.len() as u64) > max {
            return Err(violation(path, format!("expected at most {max} items")));
        }
    }

    if let Some(item_schema) = schema.get("items") {
        for (i, item) in items.iter().enumerate() {
            validate_at(item_schema, item, &format!("{path}[{i}]"))?;
        }
    }

    Ok(())
}
