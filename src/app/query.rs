// elklogs - app/query.rs
//
// Builds the immutable `Query` from resolved CLI/config values.
// All user-input validation happens here, before any connection is made.

use crate::core::format::extract_tokens;
use crate::core::model::Query;
use crate::util::constants::{CLI_DATE_FORMAT, MAX_ENTRIES, MIN_ENTRIES};
use crate::util::error::QueryError;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::time::Duration;

/// User-facing query settings after CLI flags and config have been merged.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub index_pattern: String,
    /// Raw `--after` value (`YYYY-MM-DDTHH:MM`), empty = unset.
    pub after: String,
    /// Raw `--before` value (`YYYY-MM-DDTHH:MM`), empty = unset.
    pub before: String,
    pub reverse: bool,
    pub follow: bool,
    pub entries: usize,
    pub query: String,
    /// Raw refresh interval (`500ms`, `1s`, `1m30s`, `1h`).
    pub refresh: String,
    pub output: String,
    pub timestamp_field: String,
    pub show_timestamp: bool,
}

/// Validate `opts` and produce the run's `Query`.
///
/// Without follow mode the refresh interval is forced to zero regardless of
/// its value, but it is still validated.
pub fn build_query(opts: &QueryOptions) -> Result<Query, QueryError> {
    let after = parse_flag_date("after", &opts.after)?;
    let before = parse_flag_date("before", &opts.before)?;

    let format_fields = extract_tokens(&opts.output);
    if format_fields.is_empty() && !opts.output.is_empty() {
        return Err(QueryError::InvalidOutputFormat {
            format: opts.output.clone(),
        });
    }

    if !(MIN_ENTRIES..=MAX_ENTRIES).contains(&opts.entries) {
        return Err(QueryError::EntriesOutOfRange {
            value: opts.entries,
            min: MIN_ENTRIES,
            max: MAX_ENTRIES,
        });
    }

    let refresh = parse_duration(&opts.refresh)?;
    let refresh = if opts.follow { refresh } else { Duration::ZERO };

    Ok(Query {
        index_pattern: opts.index_pattern.clone(),
        after,
        before,
        reverse: opts.reverse,
        query: opts.query.clone(),
        refresh,
        entries: opts.entries,
        format: opts.output.clone(),
        format_fields,
        timestamp_field: opts.timestamp_field.clone(),
        show_timestamp: opts.show_timestamp,
    })
}

/// Parse an `--after` / `--before` value as a UTC instant. Empty = unset.
fn parse_flag_date(flag: &'static str, value: &str) -> Result<Option<DateTime<Utc>>, QueryError> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(value, CLI_DATE_FORMAT)
        .map(|ndt| Some(ndt.and_utc()))
        .map_err(|e| QueryError::InvalidDate {
            flag,
            value: value.to_string(),
            source: e,
        })
}

/// Parse a duration made of one or more `<n><unit>` components, summed
/// (`500ms`, `1m30s`, `1h5m`). Units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`.
/// Fractions are allowed (`1.5s`). A bare number is taken as seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, QueryError> {
    let invalid = |reason: &str| QueryError::InvalidDuration {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let value = raw.trim();
    if value.is_empty() {
        return Err(invalid("empty value"));
    }
    if value.starts_with('-') {
        return Err(invalid("must be >= 0"));
    }

    let total_ns = if let Ok(secs) = value.parse::<f64>() {
        secs * 1e9
    } else {
        let mut total = 0.0;
        let mut rest = value;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .unwrap_or(rest.len());
            let (number, tail) = rest.split_at(number_len);
            let unit_len = tail
                .find(|c: char| c.is_ascii_digit() || c == '.')
                .unwrap_or(tail.len());
            let (unit, tail) = tail.split_at(unit_len);

            let number: f64 = number
                .parse()
                .map_err(|_| invalid("expected a number followed by ns, us, ms, s, m or h"))?;
            let unit_ns = match unit {
                "ns" => 1.0,
                "us" | "µs" => 1e3,
                "ms" => 1e6,
                "s" => 1e9,
                "m" => 60e9,
                "h" => 3_600e9,
                "" => return Err(invalid("missing unit")),
                _ => return Err(invalid("unknown unit; use ns, us, ms, s, m or h")),
            };
            total += number * unit_ns;
            rest = tail;
        }
        total
    };

    if !total_ns.is_finite() || total_ns < 0.0 {
        return Err(invalid("must be a finite, non-negative number"));
    }
    if total_ns >= u64::MAX as f64 {
        return Err(invalid("out of range"));
    }
    Ok(Duration::from_nanos(total_ns.round() as u64))
}
