// elklogs - core/expr.rs
//
// Dotted-path field lookup over parsed JSON records.
//
// `"foo"` evaluates to record["foo"], `"foo.bar"` to record["foo"]["bar"].
// This is a strict nested lookup, not JSONPath: no arrays, no wildcards.

use crate::util::error::EvalError;
use serde_json::Value;

/// Resolve `path` against `record` and render the value as text.
///
/// The path is consumed one head segment at a time, up to the first `.`.
/// An empty remainder renders the current node, so an empty path renders the
/// record itself and a trailing `.` is ignored. Keys holding JSON `null`
/// count as absent.
pub fn evaluate(record: &Value, path: &str) -> Result<String, EvalError> {
    let mut node = record;
    let mut rest = path;
    while !rest.is_empty() {
        let (segment, tail) = rest.split_once('.').unwrap_or((rest, ""));
        let map = node.as_object().ok_or_else(|| EvalError::NotAMap {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
        node = match map.get(segment) {
            Some(Value::Null) | None => {
                return Err(EvalError::PathNotFound {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
            Some(child) => child,
        };
        rest = tail;
    }
    Ok(render(node))
}

/// Text form of a JSON value: strings unquoted, everything else as JSON.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_number() {
        assert_eq!(evaluate(&json!({"a": {"b": 1}}), "a.b").unwrap(), "1");
    }

    #[test]
    fn test_top_level_string_is_unquoted() {
        let record = json!({"message": "hello world"});
        assert_eq!(evaluate(&record, "message").unwrap(), "hello world");
    }

    #[test]
    fn test_scalar_in_the_middle_of_the_path() {
        let result = evaluate(&json!({"a": 1}), "a.b");
        assert!(matches!(result, Err(EvalError::NotAMap { .. })));
    }

    #[test]
    fn test_missing_key() {
        let result = evaluate(&json!({"a": {"c": 1}}), "a.b");
        assert_eq!(
            result,
            Err(EvalError::PathNotFound {
                path: "a.b".to_string(),
                segment: "b".to_string(),
            })
        );
    }

    #[test]
    fn test_null_counts_as_missing() {
        let result = evaluate(&json!({"a": null}), "a");
        assert!(matches!(result, Err(EvalError::PathNotFound { .. })));
    }

    #[test]
    fn test_empty_path_renders_node() {
        assert_eq!(evaluate(&json!("plain"), "").unwrap(), "plain");
        assert_eq!(evaluate(&json!(true), "").unwrap(), "true");
    }

    #[test]
    fn test_trailing_dot_is_ignored() {
        let record = json!({"message": "hi", "host": {"name": "web-1"}});
        assert_eq!(evaluate(&record, "message.").unwrap(), "hi");
        assert_eq!(evaluate(&record, "host.name.").unwrap(), "web-1");
    }

    #[test]
    fn test_lone_dot_looks_up_empty_key() {
        let result = evaluate(&json!({"message": "hi"}), ".");
        assert_eq!(
            result,
            Err(EvalError::PathNotFound {
                path: ".".to_string(),
                segment: String::new(),
            })
        );
        assert_eq!(evaluate(&json!({"": "blank"}), ".").unwrap(), "blank");
    }

    #[test]
    fn test_object_and_array_render_as_json() {
        let record = json!({"host": {"tags": ["a", "b"], "meta": {"x": 1}}});
        assert_eq!(evaluate(&record, "host.tags").unwrap(), r#"["a","b"]"#);
        assert_eq!(evaluate(&record, "host.meta").unwrap(), r#"{"x":1}"#);
    }

    #[test]
    fn test_keys_with_at_sign() {
        let record = json!({"@timestamp": "2018-11-29T04:51:34Z"});
        assert_eq!(
            evaluate(&record, "@timestamp").unwrap(),
            "2018-11-29T04:51:34Z"
        );
    }

    #[test]
    fn test_deep_path() {
        let mut record = json!("leaf");
        let mut path = Vec::new();
        for i in 0..500 {
            let key = format!("k{i}");
            let mut map = serde_json::Map::new();
            map.insert(key.clone(), record);
            record = Value::Object(map);
            path.push(key);
        }
        path.reverse();
        assert_eq!(evaluate(&record, &path.join(".")).unwrap(), "leaf");
    }
}
