// elklogs - core/format.rs
//
// Turns a retrieved record into the line printed for it.
// Core layer: pure logic, no I/O.
//
// Templates contain `%field.path` tokens. Each token is replaced by the
// value at that path; tokens whose path does not resolve stay verbatim.

use crate::core::expr::evaluate;
use crate::core::model::LogEntry;
use crate::util::constants::{TIMESTAMP_PREFIX_FORMAT, TOKEN_MARKER, TOKEN_PATTERN};
use crate::util::error::FormatError;
use chrono::DateTime;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Extract the `%field` tokens of an output template, in order of appearance.
pub fn extract_tokens(template: &str) -> Vec<String> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| Regex::new(TOKEN_PATTERN).expect("TOKEN_PATTERN is valid"));
    re.find_iter(template)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Render one entry.
///
/// A payload that is not valid JSON is an error. With no tokens the raw
/// payload is returned unchanged. Timestamp-prefix failures are not errors:
/// the line is returned without the prefix.
pub fn format_entry(
    entry: &LogEntry,
    show_timestamp: bool,
    timestamp_field: &str,
    template: &str,
    tokens: &[String],
) -> Result<String, FormatError> {
    let record: Value = serde_json::from_str(&entry.source).map_err(|e| FormatError::Decode {
        id: entry.id.clone(),
        source: e,
    })?;

    if tokens.is_empty() {
        return Ok(entry.source.clone());
    }

    let mut line = template.to_string();
    for token in tokens {
        let path = token.strip_prefix(TOKEN_MARKER).unwrap_or(token.as_str());
        match evaluate(&record, path) {
            Ok(value) => line = line.replace(token.as_str(), value.trim_matches('\n')),
            Err(e) => tracing::trace!(token = %token, error = %e, "Token left unresolved"),
        }
    }

    if show_timestamp {
        if let Some(prefix) = timestamp_prefix(&record, timestamp_field) {
            line = format!("{prefix}: {line}");
        }
    }

    Ok(line)
}

/// `YYYY-MM-DDTHH:MM:SS` of the record's RFC 3339 timestamp, if it has one.
fn timestamp_prefix(record: &Value, timestamp_field: &str) -> Option<String> {
    let raw = evaluate(record, timestamp_field).ok()?;
    let ts = DateTime::parse_from_rfc3339(&raw).ok()?;
    Some(ts.format(TIMESTAMP_PREFIX_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{"@timestamp":"2018-11-29T04:51:34","test":"message\n"}"#;

    fn entry(source: &str) -> LogEntry {
        LogEntry::new("id-1", source)
    }

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extract_tokens() {
        assert_eq!(
            extract_tokens("%@timestamp: %test [%host.name]"),
            tokens(&["%@timestamp", "%test", "%host.name"])
        );
        assert!(extract_tokens("no tokens here").is_empty());
        assert!(extract_tokens("").is_empty());
    }

    #[test]
    fn test_template_with_trailing_newline_trimmed() {
        let line = format_entry(
            &entry(RECORD),
            false,
            "@timestamp",
            "%@timestamp: %test",
            &tokens(&["%@timestamp", "%test"]),
        )
        .unwrap();
        assert_eq!(line, "2018-11-29T04:51:34: message");
    }

    #[test]
    fn test_no_tokens_passes_raw_payload_through() {
        let line = format_entry(&entry(RECORD), false, "@timestamp", "", &[]).unwrap();
        assert_eq!(line, RECORD);
    }

    #[test]
    fn test_unresolved_token_left_verbatim() {
        let line = format_entry(
            &entry(RECORD),
            false,
            "@timestamp",
            "%@timestamp: %test :%stuff",
            &tokens(&["%@timestamp", "%test", "%stuff"]),
        )
        .unwrap();
        assert_eq!(line, "2018-11-29T04:51:34: message :%stuff");
    }

    #[test]
    fn test_token_replaced_everywhere() {
        let line = format_entry(
            &entry(r#"{"level":"warn"}"#),
            false,
            "@timestamp",
            "%level|%level",
            &tokens(&["%level"]),
        )
        .unwrap();
        assert_eq!(line, "warn|warn");
    }

    #[test]
    fn test_token_ending_a_sentence() {
        let template = "User logged in: %user.";
        let line = format_entry(
            &entry(r#"{"user":"bob"}"#),
            false,
            "@timestamp",
            template,
            &extract_tokens(template),
        )
        .unwrap();
        assert_eq!(line, "User logged in: bob");
    }

    #[test]
    fn test_nested_token() {
        let line = format_entry(
            &entry(r#"{"host":{"name":"web-1"},"message":"up"}"#),
            false,
            "@timestamp",
            "[%host.name] %message",
            &tokens(&["%host.name", "%message"]),
        )
        .unwrap();
        assert_eq!(line, "[web-1] up");
    }

    #[test]
    fn test_malformed_payload_is_error() {
        let result = format_entry(
            &entry("{not json"),
            false,
            "@timestamp",
            "%test",
            &tokens(&["%test"]),
        );
        assert!(matches!(result, Err(FormatError::Decode { .. })));
    }

    #[test]
    fn test_malformed_payload_is_error_in_pass_through_mode() {
        let result = format_entry(&entry("{not json"), false, "@timestamp", "", &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timestamp_prefix() {
        let line = format_entry(
            &entry(r#"{"@timestamp":"2018-11-29T04:51:34.123456789Z","msg":"hi"}"#),
            true,
            "@timestamp",
            "%msg",
            &tokens(&["%msg"]),
        )
        .unwrap();
        assert_eq!(line, "2018-11-29T04:51:34: hi");
    }

    #[test]
    fn test_timestamp_prefix_keeps_record_offset() {
        let line = format_entry(
            &entry(r#"{"ts":"2018-11-29T04:51:34+02:00","msg":"hi"}"#),
            true,
            "ts",
            "%msg",
            &tokens(&["%msg"]),
        )
        .unwrap();
        assert_eq!(line, "2018-11-29T04:51:34: hi");
    }

    #[test]
    fn test_timestamp_prefix_skipped_when_unparseable() {
        // No zone designator: not RFC 3339.
        let line = format_entry(
            &entry(RECORD),
            true,
            "@timestamp",
            "%test",
            &tokens(&["%test"]),
        )
        .unwrap();
        assert_eq!(line, "message");
    }

    #[test]
    fn test_timestamp_prefix_skipped_when_field_missing() {
        let line = format_entry(
            &entry(r#"{"msg":"hi"}"#),
            true,
            "@timestamp",
            "%msg",
            &tokens(&["%msg"]),
        )
        .unwrap();
        assert_eq!(line, "hi");
    }
}
