// elklogs - app/tail.rs
//
// Tail loop: resolves the indices once, then polls the store, drops entries
// already printed by the previous poll, formats the rest and prints them.
//
// Architecture:
//   - Single-threaded and synchronous. The only suspension point is the
//     sleep between polls; there is no cancellation besides process exit.
//   - The loop depends on the narrow `Connector` trait, not on a concrete
//     HTTP client, so tests drive it with a scripted in-memory store.
//   - Logging happens inside a span owned by the `Tail`, created by the
//     caller with whatever context it wants attached.
//
// Deduplication: the store returns newest-first. The id of the first entry
// of the first non-empty batch is remembered; later batches are cut at that
// id, since everything after it in sort order was already printed. The
// marker is not advanced on later polls: an entry printed by the second poll
// is printed again by the third.
//
// Any connector, decode, or output error aborts the run. No retries.

use crate::core::format::format_entry;
use crate::core::index::select_indices;
use crate::core::model::{LogEntry, Query};
use crate::util::constants::SORT_ASCENDING;
use crate::util::error::{ConnectorError, ElkLogsError, Result};
use std::io::Write;

// =============================================================================
// Connector contract
// =============================================================================

/// The store operations the tail loop needs.
///
/// Implementations issue at most one request at a time; the loop never
/// pipelines polls.
pub trait Connector {
    /// Names of every index known to the store.
    fn list_indices(&mut self) -> std::result::Result<Vec<String>, ConnectorError>;

    /// Run `query` (empty = match all) against `indices`, sorted by
    /// `sort_field`, returning at most `limit` entries.
    fn search(
        &mut self,
        indices: &[String],
        sort_field: &str,
        ascending: bool,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<LogEntry>, ConnectorError>;

    /// Release the connection. Calling it twice is a no-op.
    fn close(&mut self);
}

impl<C: Connector + ?Sized> Connector for &mut C {
    fn list_indices(&mut self) -> std::result::Result<Vec<String>, ConnectorError> {
        (**self).list_indices()
    }

    fn search(
        &mut self,
        indices: &[String],
        sort_field: &str,
        ascending: bool,
        query: &str,
        limit: usize,
    ) -> std::result::Result<Vec<LogEntry>, ConnectorError> {
        (**self).search(indices, sort_field, ascending, query, limit)
    }

    fn close(&mut self) {
        (**self).close();
    }
}

// =============================================================================
// Tail
// =============================================================================

/// Drives repeated polls of a `Connector` and writes formatted lines to `out`.
pub struct Tail<C, W> {
    connector: C,
    out: W,
    span: tracing::Span,
    /// Id remembered from the first non-empty poll.
    last_id: Option<String>,
}

impl<C: Connector, W: Write> Tail<C, W> {
    pub fn new(connector: C, out: W) -> Self {
        Self::with_span(connector, out, tracing::info_span!("tail"))
    }

    /// Like `new`, logging inside the given span.
    pub fn with_span(connector: C, out: W, span: tracing::Span) -> Self {
        Self {
            connector,
            out,
            span,
            last_id: None,
        }
    }

    /// Run the query: one poll when `query.refresh` is zero, otherwise poll
    /// forever at that interval until an error occurs.
    pub fn run(&mut self, query: &Query) -> Result<()> {
        let span = self.span.clone();
        let _guard = span.enter();

        let all = self.connector.list_indices()?;
        tracing::debug!(indices = ?all, "Indices fetched");

        let indices = select_indices(&all, &query.index_pattern, query.after, query.before)?;
        tracing::debug!(indices = ?indices, "Indices filtered");

        self.poll(query, &indices)?;
        while query.is_follow() {
            std::thread::sleep(query.refresh);
            self.poll(query, &indices)?;
        }
        Ok(())
    }

    /// One fetch-format-print cycle.
    fn poll(&mut self, query: &Query, indices: &[String]) -> Result<()> {
        let batch = self.connector.search(
            indices,
            &query.timestamp_field,
            SORT_ASCENDING,
            &query.query,
            query.entries,
        )?;
        tracing::debug!(
            query = %query.query,
            entries = query.entries,
            fetched = batch.len(),
            "Entries fetched"
        );

        let lines = self.process_batch(query, &batch)?;
        tracing::debug!(new = lines.len(), "Entries processed");

        self.print(&lines, query.reverse)
    }

    /// Format the entries of `batch` that precede the remembered id.
    fn process_batch(&mut self, query: &Query, batch: &[LogEntry]) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(batch.len());
        for entry in batch {
            if self.last_id.as_deref() == Some(entry.id.as_str()) {
                return Ok(lines);
            }
            lines.push(format_entry(
                entry,
                query.show_timestamp,
                &query.timestamp_field,
                &query.format,
                &query.format_fields,
            )?);
        }

        if self.last_id.is_none() {
            if let Some(first) = batch.first() {
                tracing::debug!(id = %first.id, "Remembering newest entry");
                self.last_id = Some(first.id.clone());
            }
        }
        Ok(lines)
    }

    /// Newest-last by default (like `tail`), newest-first when `reverse`.
    fn print(&mut self, lines: &[String], reverse: bool) -> Result<()> {
        let mut write_all = || -> std::io::Result<()> {
            if reverse {
                for line in lines {
                    writeln!(self.out, "{line}")?;
                }
            } else {
                for line in lines.iter().rev() {
                    writeln!(self.out, "{line}")?;
                }
            }
            self.out.flush()
        };
        write_all().map_err(|e| ElkLogsError::Output { source: e })
    }

    /// Id remembered for deduplication, if any poll returned entries yet.
    pub fn last_seen(&self) -> Option<&str> {
        self.last_id.as_deref()
    }

    /// Close the connector and hand back the output sink.
    pub fn finish(mut self) -> W {
        self.connector.close();
        self.out
    }
}
