// elklogs - core/index.rs
//
// Index selection: picks the date-partitioned indices relevant to a query.
// Core layer: pure logic, no I/O.
//
// Index names carry their day in a `YYYY.MM.DD` substring
// (e.g. `logstash-2018.11.03`). An index's date is its UTC midnight.

use crate::util::constants::{INDEX_DATE_FORMAT, INDEX_DATE_PATTERN};
use crate::util::error::IndexError;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Select the indices to search.
///
/// With no time bounds, only the most recent matching index is returned
/// (greatest embedded date, ties broken by name). When nothing matches the
/// result is a single empty name rather than an empty list.
///
/// With at least one bound, every matching index dated within
/// `[start, end]` (inclusive) is returned in input order. A missing `start`
/// means the beginning of time; a missing `end` means now.
///
/// Only names matching `pattern` are date-parsed; a matching name without a
/// parseable date is an error.
pub fn select_indices(
    indices: &[String],
    pattern: &str,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<Vec<String>, IndexError> {
    let re = Regex::new(pattern).map_err(|e| IndexError::InvalidPattern {
        pattern: pattern.to_string(),
        source: e,
    })?;

    if start.is_none() && end.is_none() {
        let latest = find_latest_index(indices, &re)?;
        return Ok(vec![latest.unwrap_or_default()]);
    }

    let start = start.unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = end.unwrap_or_else(Utc::now);

    let mut selected = Vec::with_capacity(indices.len());
    for index in indices.iter().filter(|idx| re.is_match(idx)) {
        let date = extract_index_date(index)?;
        if date >= start && date <= end {
            selected.push(index.clone());
        }
    }
    Ok(selected)
}

/// Most recent matching index, or `None` if no name matches.
fn find_latest_index(indices: &[String], re: &Regex) -> Result<Option<String>, IndexError> {
    let mut latest: Option<(DateTime<Utc>, &String)> = None;
    for index in indices.iter().filter(|idx| re.is_match(idx)) {
        let date = extract_index_date(index)?;
        let newer = match latest {
            None => true,
            Some((best_date, best_name)) => (date, index) > (best_date, best_name),
        };
        if newer {
            latest = Some((date, index));
        }
    }
    Ok(latest.map(|(_, name)| name.clone()))
}

/// Extract and parse the date embedded in an index name.
pub fn extract_index_date(index: &str) -> Result<DateTime<Utc>, IndexError> {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    let re = DATE_RE.get_or_init(|| Regex::new(INDEX_DATE_PATTERN).expect("valid date regex"));

    let Some(found) = re.find(index) else {
        return Err(IndexError::MissingDate {
            index: index.to_string(),
        });
    };
    let raw = found.as_str();

    let date = match NaiveDate::parse_from_str(raw, INDEX_DATE_FORMAT) {
        Ok(date) => date,
        Err(e) => {
            return Err(IndexError::InvalidDate {
                index: index.to_string(),
                raw_date: raw.to_string(),
                source: e,
            });
        }
    };

    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    const PATTERN: &str = "logstash-[0-9].*";

    fn sample_indices() -> Vec<String> {
        [
            "logstash-2018.11.03",
            "logstash-2018.10.10",
            "logstash-2018.10.09",
            "logstash-2018.10.11",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn at(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_no_bounds_returns_latest_only() {
        let result = select_indices(&sample_indices(), PATTERN, None, None).unwrap();
        assert_eq!(result, vec!["logstash-2018.11.03".to_string()]);
    }

    #[test]
    fn test_no_bounds_no_match_returns_single_empty_name() {
        let result = select_indices(&sample_indices(), "^nginx-", None, None).unwrap();
        assert_eq!(result, vec![String::new()]);
    }

    #[test]
    fn test_no_bounds_ignores_non_matching_names() {
        let mut indices = sample_indices();
        indices.push(".kibana".to_string());
        indices.push("metrics-2030.01.01".to_string());
        let result = select_indices(&indices, PATTERN, None, None).unwrap();
        assert_eq!(result, vec!["logstash-2018.11.03".to_string()]);
    }

    #[test]
    fn test_end_bound_only() {
        let end = at("2018-11-01T00:00");
        let result = select_indices(&sample_indices(), PATTERN, None, Some(end)).unwrap();
        assert_eq!(
            result,
            vec![
                "logstash-2018.10.10".to_string(),
                "logstash-2018.10.09".to_string(),
                "logstash-2018.10.11".to_string(),
            ]
        );
    }

    #[test]
    fn test_start_bound_only_is_inclusive_and_keeps_order() {
        let start = at("2018-10-10T00:00");
        let result = select_indices(&sample_indices(), PATTERN, Some(start), None).unwrap();
        assert_eq!(
            result,
            vec![
                "logstash-2018.11.03".to_string(),
                "logstash-2018.10.10".to_string(),
                "logstash-2018.10.11".to_string(),
            ]
        );
    }

    #[test]
    fn test_both_bounds_inclusive() {
        let start = at("2018-10-09T00:00");
        let end = at("2018-10-10T00:00");
        let result = select_indices(&sample_indices(), PATTERN, Some(start), Some(end)).unwrap();
        assert_eq!(
            result,
            vec![
                "logstash-2018.10.10".to_string(),
                "logstash-2018.10.09".to_string(),
            ]
        );
    }

    #[test]
    fn test_start_after_midnight_excludes_that_day() {
        let start = at("2018-10-11T00:01");
        let result = select_indices(&sample_indices(), PATTERN, Some(start), None).unwrap();
        assert_eq!(result, vec!["logstash-2018.11.03".to_string()]);
    }

    #[test]
    fn test_matching_name_without_date_is_error() {
        let indices = vec!["logstash-1-latest".to_string()];
        let start = at("2018-10-10T00:00");
        let result = select_indices(&indices, PATTERN, Some(start), None);
        assert!(matches!(result, Err(IndexError::MissingDate { .. })));
    }

    #[test]
    fn test_matching_name_with_impossible_date_is_error() {
        let indices = vec!["logstash-2018.13.45".to_string()];
        let result = select_indices(&indices, PATTERN, None, None);
        assert!(matches!(result, Err(IndexError::InvalidDate { .. })));
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let indices = vec!["prod-logstash-2018.10.10".to_string()];
        let result = select_indices(&indices, "logstash-", None, None).unwrap();
        assert_eq!(result, indices);
    }

    #[test]
    fn test_invalid_pattern() {
        let result = select_indices(&sample_indices(), "logstash-[", None, None);
        assert!(matches!(result, Err(IndexError::InvalidPattern { .. })));
    }

    #[test]
    fn test_extract_index_date() {
        let date = extract_index_date("logstash-2018.11.03").unwrap();
        assert_eq!(date, at("2018-11-03T00:00"));
    }
}
