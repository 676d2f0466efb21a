//! Argument helpers for tool calls.
//!
//! Tool arguments arrive as loosely typed JSON. These helpers read them the
//! forgiving way: the remote API is the one that validates.

use serde_json::{Map, Value};

/// Reads an argument as a string. Numbers and booleans are rendered; null,
/// missing and empty strings read as `None`.
pub fn arg_str(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JavaScript-style truthiness: `0`, `false`, `""` and `null` count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads an optional filter, dropping falsy values.
pub fn filter_arg(args: &Value, key: &str) -> Option<String> {
    args.get(key).filter(|v| is_truthy(v))?;
    arg_str(args, key)
}

/// Path segment for an id argument. Missing ids become an empty segment and
/// the remote API answers for it.
pub fn segment(args: &Value, key: &str) -> String {
    arg_str(args, key).unwrap_or_default()
}

/// Reads a boolean flag, accepting `true`/`false` either as JSON booleans or strings.
pub fn arg_bool(args: &Value, key: &str) -> Option<bool> {
    match args.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Copies the listed keys that are present (and not null) into a new object.
pub fn pick(args: &Value, keys: &[&str]) -> Value {
    let mut out = Map::new();
    for key in keys {
        if let Some(v) = args.get(*key).filter(|v| !v.is_null()) {
            out.insert((*key).to_string(), v.clone());
        }
    }
    Value::Object(out)
}
