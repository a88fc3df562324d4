/// Sanitization of caller-supplied widget configuration.
///
/// Applied once at ingestion so strings from untrusted sources (a CMS-driven
/// greeting, a company name) can't inject markup when interpolated later.
use super::sanitize::sanitize_text;
use serde_json::{Map, Value};

/// Escape every string in a configuration object.
///
/// - non-object input yields an empty map
/// - strings are escaped with [`sanitize_text`]
/// - numbers and booleans pass through
/// - arrays: string elements are escaped, other elements pass through
///   untouched (objects inside arrays are *not* sanitized, see
///   [`sanitize_config_deep`])
/// - nested objects are sanitized recursively
/// - nulls are dropped
///
/// Keys are kept as-is.
pub fn sanitize_config(config: &Value) -> Map<String, Value> {
    sanitize_object(config, false)
}

/// Like [`sanitize_config`], but also recurses into objects and arrays
/// nested inside arrays.
pub fn sanitize_config_deep(config: &Value) -> Map<String, Value> {
    sanitize_object(config, true)
}

fn sanitize_object(config: &Value, deep: bool) -> Map<String, Value> {
    let Value::Object(entries) = config else {
        return Map::new();
    };

    let mut sanitized = Map::with_capacity(entries.len());
    for (key, value) in entries {
        let clean = match value {
            Value::String(s) => Value::String(sanitize_text(s)),
            Value::Number(_) | Value::Bool(_) => value.clone(),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| sanitize_array_item(item, deep))
                    .collect(),
            ),
            Value::Object(_) => Value::Object(sanitize_object(value, deep)),
            Value::Null => continue,
        };
        sanitized.insert(key.clone(), clean);
    }
    sanitized
}

fn sanitize_array_item(item: &Value, deep: bool) -> Value {
    match item {
        Value::String(s) => Value::String(sanitize_text(s)),
        Value::Object(_) if deep => Value::Object(sanitize_object(item, deep)),
        Value::Array(nested) if deep => Value::Array(
            nested
                .iter()
                .map(|inner| sanitize_array_item(inner, deep))
                .collect(),
        ),
        _ => item.clone(),
    }
}
