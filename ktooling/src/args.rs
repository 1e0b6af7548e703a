//! Argument helpers for tool handlers.
//!
//! Backends usually send tool arguments as a JSON object, but some models
//! encode them as a JSON string; both forms are accepted.
//!
//! ```rust
//! use ktooling::{optional_string, parse_json_object, required_string};
//! use serde_json::json;
//!
//! let args = parse_json_object(&json!({"query": "md"})).expect("object should parse");
//! assert_eq!(required_string(&args, "query").expect("query"), "md");
//! assert_eq!(optional_string(&args, "path", "."), ".");
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

pub fn parse_json_object(arguments: &Value) -> Result<Map<String, Value>, ToolError> {
    match arguments {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(Map::new()),
        Value::String(raw) if raw.trim().is_empty() => Ok(Map::new()),
        Value::String(raw) => {
            let parsed = serde_json::from_str::<Value>(raw).map_err(|err| {
                ToolError::invalid_arguments(format!("invalid JSON arguments: {err}"))
            })?;
            parsed
                .as_object()
                .cloned()
                .ok_or_else(|| ToolError::invalid_arguments("expected JSON object arguments"))
        }
        _ => Err(ToolError::invalid_arguments(
            "expected JSON object arguments",
        )),
    }
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

/// Returns the string under `key`, or `default` when it is absent or empty.
pub fn optional_string(args: &Map<String, Value>, key: &str, default: &str) -> String {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ToolErrorKind;

    #[test]
    fn string_encoded_arguments_are_decoded() {
        let args = parse_json_object(&json!("{\"path\":\"README.md\"}")).expect("args");
        assert_eq!(required_string(&args, "path").expect("path"), "README.md");
    }

    #[test]
    fn null_and_blank_arguments_are_empty_objects() {
        assert!(parse_json_object(&Value::Null).expect("null").is_empty());
        assert!(parse_json_object(&json!("  ")).expect("blank").is_empty());
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let error = parse_json_object(&json!([1, 2])).expect_err("array should fail");
        assert_eq!(error.kind, ToolErrorKind::InvalidArguments);

        let error = parse_json_object(&json!("{")).expect_err("bad json should fail");
        assert!(error.message.starts_with("invalid JSON arguments"));
    }

    #[test]
    fn optional_string_falls_back_on_missing_empty_or_non_string() {
        let args = parse_json_object(&json!({"a": "", "b": 3, "c": "12h"})).expect("args");
        assert_eq!(optional_string(&args, "a", "24h"), "24h");
        assert_eq!(optional_string(&args, "b", "24h"), "24h");
        assert_eq!(optional_string(&args, "c", "24h"), "12h");
        assert_eq!(optional_string(&args, "d", "."), ".");
    }
}
