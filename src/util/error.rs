// elklogs - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
//
// Field-level evaluation failures (`EvalError`) are recovered by the entry
// formatter. Every other error aborts the run.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all elklogs operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ElkLogsError {
    /// Index selection failed.
    Index(IndexError),

    /// Query construction from flags/config failed.
    Query(QueryError),

    /// A retrieved record could not be formatted.
    Format(FormatError),

    /// The log store connection failed.
    Connector(ConnectorError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Writing formatted lines to the output failed.
    Output { source: io::Error },
}

impl fmt::Display for ElkLogsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(e) => write!(f, "Index selection error: {e}"),
            Self::Query(e) => write!(f, "Invalid query: {e}"),
            Self::Format(e) => write!(f, "Format error: {e}"),
            Self::Connector(e) => write!(f, "Connection error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Output { source } => write!(f, "Failed writing output: {source}"),
        }
    }
}

impl std::error::Error for ElkLogsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Index(e) => Some(e),
            Self::Query(e) => Some(e),
            Self::Format(e) => Some(e),
            Self::Connector(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Output { source } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Index errors
// ---------------------------------------------------------------------------

/// Errors related to selecting date-partitioned indices.
#[derive(Debug)]
pub enum IndexError {
    /// The index-name pattern is not a valid regex.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// A matching index name carries no `YYYY.MM.DD` substring.
    MissingDate { index: String },

    /// The date substring of a matching index name is not a calendar date.
    InvalidDate {
        index: String,
        raw_date: String,
        source: chrono::ParseError,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid index pattern '{pattern}': {source}")
            }
            Self::MissingDate { index } => {
                write!(f, "Failed to extract date from index '{index}'")
            }
            Self::InvalidDate {
                index,
                raw_date,
                source,
            } => write!(
                f,
                "Failed parsing date '{raw_date}' of index '{index}': {source}"
            ),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::InvalidDate { source, .. } => Some(source),
            Self::MissingDate { .. } => None,
        }
    }
}

impl From<IndexError> for ElkLogsError {
    fn from(e: IndexError) -> Self {
        Self::Index(e)
    }
}

// ---------------------------------------------------------------------------
// Query errors
// ---------------------------------------------------------------------------

/// Errors raised while turning user input into a `Query`.
#[derive(Debug)]
pub enum QueryError {
    /// An `--after` / `--before` value does not match the date layout.
    InvalidDate {
        flag: &'static str,
        value: String,
        source: chrono::ParseError,
    },

    /// A non-empty output format contains no `%field` token.
    InvalidOutputFormat { format: String },

    /// A refresh interval could not be parsed.
    InvalidDuration { value: String, reason: String },

    /// Entries per poll is outside the accepted range.
    EntriesOutOfRange { value: usize, min: usize, max: usize },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate {
                flag,
                value,
                source,
            } => write!(
                f,
                "Invalid --{flag} date '{value}' (expected e.g. 2016-06-17T15:00): {source}"
            ),
            Self::InvalidOutputFormat { format } => {
                write!(
                    f,
                    "Invalid output format '{format}': no %field tokens found"
                )
            }
            Self::InvalidDuration { value, reason } => {
                write!(f, "Invalid refresh interval '{value}': {reason}")
            }
            Self::EntriesOutOfRange { value, min, max } => {
                write!(f, "Entries = {value} is out of range ({min}-{max})")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidDate { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<QueryError> for ElkLogsError {
    fn from(e: QueryError) -> Self {
        Self::Query(e)
    }
}

// ---------------------------------------------------------------------------
// Field expression errors
// ---------------------------------------------------------------------------

/// Errors from resolving a dotted field path against a record.
///
/// These are expected: a template may name fields that only some records
/// carry. The formatter skips the token instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A path segment is absent or holds JSON `null`.
    PathNotFound { path: String, segment: String },

    /// Traversal reached a non-object value before the path was exhausted.
    NotAMap { path: String, segment: String },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathNotFound { path, segment } => {
                write!(f, "Field '{segment}' of '{path}' not found in record")
            }
            Self::NotAMap { path, segment } => {
                write!(
                    f,
                    "Cannot look up '{segment}' of '{path}': value is not an object"
                )
            }
        }
    }
}

impl std::error::Error for EvalError {}

// ---------------------------------------------------------------------------
// Format errors
// ---------------------------------------------------------------------------

/// Errors related to formatting a retrieved record.
#[derive(Debug)]
pub enum FormatError {
    /// The record payload is not a valid JSON document.
    Decode {
        id: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { id, source } => {
                write!(f, "Record '{id}' is not valid JSON: {source}")
            }
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl From<FormatError> for ElkLogsError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

// ---------------------------------------------------------------------------
// Connector errors
// ---------------------------------------------------------------------------

/// Errors talking to the log store.
#[derive(Debug)]
pub enum ConnectorError {
    /// Transport-level failure (DNS, TLS, timeout, refused connection).
    Http {
        operation: &'static str,
        url: String,
        source: reqwest::Error,
    },

    /// The store answered with a non-success status code.
    Status {
        operation: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    /// The store's response body did not have the expected shape.
    Response {
        operation: &'static str,
        url: String,
        source: serde_json::Error,
    },

    /// The connector was used after `close()`.
    Closed { operation: &'static str },
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http {
                operation,
                url,
                source,
            } => write!(f, "{operation} request to '{url}' failed: {source}"),
            Self::Status {
                operation,
                url,
                status,
                body,
            } => write!(
                f,
                "{operation} request to '{url}' returned HTTP {status}: {body}"
            ),
            Self::Response {
                operation,
                url,
                source,
            } => write!(
                f,
                "{operation} response from '{url}' could not be decoded: {source}"
            ),
            Self::Closed { operation } => {
                write!(f, "{operation} attempted on a closed connection")
            }
        }
    }
}

impl std::error::Error for ConnectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { source, .. } => Some(source),
            Self::Response { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConnectorError> for ElkLogsError {
    fn from(e: ConnectorError) -> Self {
        Self::Connector(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for ElkLogsError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for elklogs results.
pub type Result<T> = std::result::Result<T, ElkLogsError>;
