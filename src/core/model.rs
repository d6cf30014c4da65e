// elklogs - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.

use chrono::{DateTime, Utc};
use std::time::Duration;

// =============================================================================
// Query
// =============================================================================

/// Immutable per-run request describing what to fetch and how to print it.
///
/// Built once from CLI flags and config by `app::query::build_query` and
/// never modified while the tail loop runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Regex selecting index names (unanchored search).
    pub index_pattern: String,

    /// Only indices dated on or after this instant. `None` = no lower bound.
    pub after: Option<DateTime<Utc>>,

    /// Only indices dated on or before this instant. `None` = no upper bound.
    pub before: Option<DateTime<Utc>>,

    /// Print newest entries first instead of the default bottom-up order.
    pub reverse: bool,

    /// Opaque query-string passed to the store. Empty = match everything.
    pub query: String,

    /// Interval between polls. Zero = poll exactly once.
    pub refresh: Duration,

    /// Maximum number of entries requested per poll.
    pub entries: usize,

    /// Output template (`%field.path` tokens). Empty = print raw records.
    pub format: String,

    /// Tokens extracted from `format`, in order of appearance.
    pub format_fields: Vec<String>,

    /// Record field holding the event timestamp; also the sort field.
    pub timestamp_field: String,

    /// Prefix each line with the record's timestamp.
    pub show_timestamp: bool,
}

impl Query {
    /// Returns true if the loop should keep polling after the first cycle.
    pub fn is_follow(&self) -> bool {
        !self.refresh.is_zero()
    }
}

// =============================================================================
// Log entry
// =============================================================================

/// One record retrieved from the store.
///
/// Lives for a single poll iteration: it is formatted into a line and then
/// dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Store-assigned identifier, unique within its index.
    pub id: String,

    /// Raw JSON text of the record, exactly as returned by the store.
    pub source: String,
}

impl LogEntry {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_query(refresh: Duration) -> Query {
        Query {
            index_pattern: "logstash-[0-9].*".to_string(),
            after: None,
            before: None,
            reverse: false,
            query: String::new(),
            refresh,
            entries: 50,
            format: String::new(),
            format_fields: Vec::new(),
            timestamp_field: "@timestamp".to_string(),
            show_timestamp: false,
        }
    }

    #[test]
    fn test_zero_refresh_is_not_follow() {
        assert!(!make_query(Duration::ZERO).is_follow());
        assert!(make_query(Duration::from_secs(1)).is_follow());
    }
}
