// elklogs - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading (CLI flags take precedence)
// 3. Logging initialisation (debug mode support)
// 4. Query validation, store connection, and the tail loop

use clap::Parser;
use elklogs::app::query::{build_query, QueryOptions};
use elklogs::app::tail::Tail;
use elklogs::platform::config::{self, AppConfig};
use elklogs::platform::elastic::ElasticConnector;
use elklogs::util;
use elklogs::util::error::{ElkLogsError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

/// elklogs - query and tail ELK logs from the terminal.
///
/// Prints the latest entries of the most recent matching index, or of every
/// index within --after/--before. With --follow, keeps polling for new ones.
#[derive(Parser, Debug)]
#[command(name = "elklogs", version, about)]
struct Cli {
    /// Elasticsearch URL (example: http://localhost:9200).
    url: String,

    /// Basic auth user.
    #[arg(short = 'u', long)]
    user: Option<String>,

    /// Basic auth password.
    #[arg(short = 'p', long, default_value = "", hide_default_value = true)]
    password: String,

    /// Get logs after the specified date (example: -a "2016-06-17T15:00").
    #[arg(short = 'a', long, default_value = "")]
    after: String,

    /// Get logs before the specified date (example: -b "2016-06-17T15:00").
    #[arg(short = 'b', long, default_value = "")]
    before: String,

    /// Only indices whose name matches this regex are searched
    /// [default: logstash-[0-9].*].
    #[arg(long = "index-pattern")]
    index_pattern: Option<String>,

    /// Show the newest entries first.
    #[arg(short = 'r', long)]
    reverse: bool,

    /// Follow log output.
    #[arg(short = 'f', long)]
    follow: bool,

    /// Number of entries to fetch per poll, 1-10000 [default: 50].
    #[arg(short = 'n', long)]
    entries: Option<usize>,

    /// Query-string search (example: -q "host:myhost.example.com AND level:error").
    #[arg(short = 'q', long, default_value = "")]
    query: String,

    /// Refresh interval in follow mode (example: --refresh 500ms, 1m30s) [default: 1s].
    #[arg(long)]
    refresh: Option<String>,

    /// Output format (example: -o "%@timestamp: %message").
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Timestamp field name in the store [default: @timestamp].
    #[arg(long = "timestamp-field")]
    timestamp_field: Option<String>,

    /// Show the timestamp before each entry.
    #[arg(short = 't', long = "timestamp")]
    show_timestamp: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long)]
    debug: bool,

    /// Read settings from this config file instead of the default location.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
}

impl Cli {
    /// Merge flags over config values.
    fn query_options(&self, config: &AppConfig) -> QueryOptions {
        QueryOptions {
            index_pattern: self
                .index_pattern
                .clone()
                .unwrap_or_else(|| config.index_pattern.clone()),
            after: self.after.clone(),
            before: self.before.clone(),
            reverse: self.reverse,
            follow: self.follow,
            entries: self.entries.unwrap_or(config.entries),
            query: self.query.clone(),
            refresh: self
                .refresh
                .clone()
                .unwrap_or_else(|| config.refresh.clone()),
            output: self
                .output
                .clone()
                .or_else(|| config.output.clone())
                .unwrap_or_default(),
            timestamp_field: self
                .timestamp_field
                .clone()
                .unwrap_or_else(|| config.timestamp_field.clone()),
            show_timestamp: self.show_timestamp,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => config::load_config_file(path).map_err(ElkLogsError::from),
        None => Ok(config::load_default_config(
            config::default_config_path().as_deref(),
        )),
    };

    let config_level = loaded
        .as_ref()
        .ok()
        .and_then(|(config, _)| config.log_level.clone());
    util::logging::init(cli.debug, config_level.as_deref());

    tracing::debug!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "elklogs starting"
    );

    let result = loaded.and_then(|(config, warnings)| {
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        run(&cli, &config)
    });

    match result {
        Ok(()) => {}
        // Reader went away (e.g. piped into `head`): not a failure.
        Err(ElkLogsError::Output { source }) if source.kind() == ErrorKind::BrokenPipe => {}
        Err(e) => {
            tracing::debug!(error = ?e, "Run failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    let query = build_query(&cli.query_options(config))?;
    tracing::debug!(?query, "Query built");

    let user = cli
        .user
        .clone()
        .or_else(|| config.user.clone())
        .unwrap_or_default();
    let connector = ElasticConnector::connect(
        &cli.url,
        &user,
        &cli.password,
        Duration::from_secs(config.timeout_secs),
    )?;

    let span = tracing::info_span!("tail", url = %cli.url, follow = query.is_follow());
    let mut tail = Tail::with_span(connector, std::io::stdout().lock(), span);
    let result = tail.run(&query);
    tail.finish();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_entries_help_states_range() {
        let help = Cli::command().render_long_help().to_string();
        assert!(help.contains("1-10000"), "help was: {help}");
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "elklogs",
            "http://localhost:9200",
            "-n",
            "10",
            "--refresh",
            "1m30s",
        ]);
        let config = AppConfig {
            entries: 200,
            output: Some("%message".to_string()),
            ..AppConfig::default()
        };
        let opts = cli.query_options(&config);
        assert_eq!(opts.entries, 10);
        assert_eq!(opts.refresh, "1m30s");
        assert_eq!(opts.output, "%message");
        assert!(build_query(&opts).is_ok());
    }
}
