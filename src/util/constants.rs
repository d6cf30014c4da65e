// elklogs - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "elklogs";

/// Application identifier used for config directories.
pub const APP_ID: &str = "elklogs";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Query defaults
// =============================================================================

/// Default index-name pattern (regex, unanchored).
pub const DEFAULT_INDEX_PATTERN: &str = "logstash-[0-9].*";

/// Default number of entries requested per poll.
pub const DEFAULT_ENTRIES: usize = 50;

/// Minimum sensible value for entries per poll.
pub const MIN_ENTRIES: usize = 1;

/// Hard upper bound on entries per poll. Matches the store's default
/// `index.max_result_window`; larger requests are rejected server-side.
pub const MAX_ENTRIES: usize = 10_000;

/// Default refresh interval in follow mode.
pub const DEFAULT_REFRESH: &str = "1s";

/// Default name of the record field holding the event timestamp.
pub const DEFAULT_TIMESTAMP_FIELD: &str = "@timestamp";

/// Sort direction requested from the store on every poll.
///
/// Newest first: the deduplicator stops at the previously seen id, so every
/// record after it in the batch must be older than it.
pub const SORT_ASCENDING: bool = false;

// =============================================================================
// Date layouts and patterns
// =============================================================================

/// Layout of the `--after` / `--before` flags.
pub const CLI_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Pattern locating the date inside an index name.
pub const INDEX_DATE_PATTERN: &str = r"\d{4}.\d{2}.\d{2}";

/// Layout of the date embedded in an index name.
pub const INDEX_DATE_FORMAT: &str = "%Y.%m.%d";

/// Layout of the optional timestamp prefix on printed lines.
pub const TIMESTAMP_PREFIX_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// =============================================================================
// Output template
// =============================================================================

/// Sentinel character that starts every template token.
pub const TOKEN_MARKER: char = '%';

/// Pattern matching template tokens (`%field.path`).
pub const TOKEN_PATTERN: &str = "%[A-Za-z0-9@_.-]+";

// =============================================================================
// Connection
// =============================================================================

/// Timeout for the initial ping issued when connecting (seconds).
pub const HEALTHCHECK_TIMEOUT_STARTUP_SECS: u64 = 10;

/// Default per-request HTTP timeout (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Minimum user-configurable request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable request timeout (seconds).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Maximum number of response-body bytes quoted in a status error.
pub const MAX_ERROR_BODY_PREVIEW: usize = 512;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
