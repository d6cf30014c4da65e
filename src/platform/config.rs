// elklogs - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Default location of config.toml, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let path = ProjectDirs::from("", "", constants::APP_ID)
        .map(|dirs| dirs.config_dir().join(constants::CONFIG_FILE_NAME));
    match &path {
        Some(p) => tracing::debug!(path = %p.display(), "Config path resolved"),
        None => tracing::debug!("Could not determine platform config directory"),
    }
    path
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[connection]` section.
    pub connection: ConnectionSection,
    /// `[query]` section.
    pub query: QuerySection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[connection]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ConnectionSection {
    /// Basic-auth user used when `--user` is not given.
    pub user: Option<String>,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: Option<u64>,
}

/// `[query]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct QuerySection {
    pub index_pattern: Option<String>,
    pub entries: Option<usize>,
    pub timestamp_field: Option<String>,
    /// Default output template.
    pub output: Option<String>,
    /// Default refresh interval (`1s`, `500ms`, ...).
    pub refresh: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated configuration. Every field falls back to a named constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub user: Option<String>,
    pub timeout_secs: u64,
    pub index_pattern: String,
    pub entries: usize,
    pub timestamp_field: String,
    pub output: Option<String>,
    pub refresh: String,
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user: None,
            timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            index_pattern: constants::DEFAULT_INDEX_PATTERN.to_string(),
            entries: constants::DEFAULT_ENTRIES,
            timestamp_field: constants::DEFAULT_TIMESTAMP_FIELD.to_string(),
            output: None,
            refresh: constants::DEFAULT_REFRESH.to_string(),
            log_level: None,
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load config from an explicitly requested file. Failure is fatal: the
/// user asked for this file.
pub fn load_config_file(path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw: RawConfig = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(validate(raw))
}

/// Load config from the default location.
///
/// A missing file yields defaults with no warnings (first run). An unreadable
/// or unparseable file yields defaults plus a warning, so the tool still runs.
pub fn load_default_config(path: Option<&Path>) -> (AppConfig, Vec<String>) {
    let Some(path) = path else {
        return (AppConfig::default(), Vec::new());
    };
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }
    match load_config_file(path) {
        Ok(loaded) => loaded,
        Err(e) => (AppConfig::default(), vec![format!("{e}. Using defaults.")]),
    }
}

/// Validate each field against named constants, accumulating warnings.
/// Invalid values fall back to defaults.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Connection --
    if let Some(user) = raw.connection.user.filter(|u| !u.is_empty()) {
        config.user = Some(user);
    }
    if let Some(secs) = raw.connection.timeout_seconds {
        if (constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS)
            .contains(&secs)
        {
            config.timeout_secs = secs;
        } else {
            warnings.push(format!(
                "[connection] timeout_seconds = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_REQUEST_TIMEOUT_SECS,
                constants::MAX_REQUEST_TIMEOUT_SECS,
                constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            ));
        }
    }

    // -- Query --
    if let Some(pattern) = raw.query.index_pattern {
        match regex::Regex::new(&pattern) {
            Ok(_) => config.index_pattern = pattern,
            Err(e) => warnings.push(format!(
                "[query] index_pattern = \"{pattern}\" is not a valid regex ({e}). Using default ({}).",
                constants::DEFAULT_INDEX_PATTERN,
            )),
        }
    }
    if let Some(entries) = raw.query.entries {
        if (constants::MIN_ENTRIES..=constants::MAX_ENTRIES).contains(&entries) {
            config.entries = entries;
        } else {
            warnings.push(format!(
                "[query] entries = {entries} is out of range ({}-{}). Using default ({}).",
                constants::MIN_ENTRIES,
                constants::MAX_ENTRIES,
                constants::DEFAULT_ENTRIES,
            ));
        }
    }
    if let Some(field) = raw.query.timestamp_field.filter(|f| !f.is_empty()) {
        config.timestamp_field = field;
    }
    if let Some(output) = raw.query.output.filter(|o| !o.is_empty()) {
        config.output = Some(output);
    }
    // Parsed together with the CLI value when the query is built.
    if let Some(refresh) = raw.query.refresh.filter(|r| !r.is_empty()) {
        config.refresh = refresh;
    }

    // -- Logging --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}
