// elklogs - platform/elastic.rs
//
// `Connector` implementation over the Elasticsearch HTTP API, using the
// blocking reqwest client (the tail loop is single-threaded and issues one
// request at a time).
//
// Endpoints:
//   GET  /                                 ping on connect
//   GET  /_cat/indices?format=json&h=index index listing
//   POST /<idx,...>/_search                query
//
// The password is never logged.

use crate::app::tail::Connector;
use crate::core::model::LogEntry;
use crate::util::constants::{HEALTHCHECK_TIMEOUT_STARTUP_SECS, MAX_ERROR_BODY_PREVIEW};
use crate::util::error::ConnectorError;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{json, Value};
use std::time::Duration;

/// Connection to one Elasticsearch cluster.
pub struct ElasticConnector {
    /// `None` once closed.
    client: Option<Client>,
    base_url: String,
    user: String,
    password: String,
}

impl ElasticConnector {
    /// Create the client and ping the cluster. Basic auth is applied only
    /// when `user` is non-empty.
    pub fn connect(
        url: &str,
        user: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self, ConnectorError> {
        let base_url = url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Http {
                operation: "connect",
                url: base_url.clone(),
                source: e,
            })?;

        let connector = Self {
            client: Some(client),
            base_url,
            user: user.to_string(),
            password: password.to_string(),
        };
        connector.ping()?;

        tracing::info!(
            url = %connector.base_url,
            auth = !connector.user.is_empty(),
            "Connected to log store"
        );
        Ok(connector)
    }

    fn ping(&self) -> Result<(), ConnectorError> {
        let url = format!("{}/", self.base_url);
        let req = self
            .client("ping")?
            .get(&url)
            .timeout(Duration::from_secs(HEALTHCHECK_TIMEOUT_STARTUP_SECS));
        self.send("ping", &url, req).map(|_| ())
    }

    fn client(&self, operation: &'static str) -> Result<&Client, ConnectorError> {
        self.client
            .as_ref()
            .ok_or(ConnectorError::Closed { operation })
    }

    /// Apply credentials, send, and return the body of a 2xx response.
    fn send(
        &self,
        operation: &'static str,
        url: &str,
        req: RequestBuilder,
    ) -> Result<String, ConnectorError> {
        let req = if self.user.is_empty() {
            req
        } else {
            req.basic_auth(&self.user, Some(&self.password))
        };

        let http_err = |e| ConnectorError::Http {
            operation,
            url: url.to_string(),
            source: e,
        };
        let resp = req.send().map_err(http_err)?;
        let status = resp.status();
        let body = resp.text().map_err(http_err)?;
        tracing::debug!(
            operation,
            url,
            status = status.as_u16(),
            bytes = body.len(),
            "Store responded"
        );

        if !status.is_success() {
            return Err(ConnectorError::Status {
                operation,
                url: url.to_string(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_PREVIEW).collect(),
            });
        }
        Ok(body)
    }
}

impl Connector for ElasticConnector {
    fn list_indices(&mut self) -> Result<Vec<String>, ConnectorError> {
        let url = format!("{}/_cat/indices?format=json&h=index", self.base_url);
        let req = self.client("list indices")?.get(&url);
        let body = self.send("list indices", &url, req)?;
        parse_index_names(&body).map_err(|e| ConnectorError::Response {
            operation: "list indices",
            url,
            source: e,
        })
    }

    fn search(
        &mut self,
        indices: &[String],
        sort_field: &str,
        ascending: bool,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LogEntry>, ConnectorError> {
        let Some(path) = index_expression(indices) else {
            tracing::debug!("No index to search; returning an empty batch");
            return Ok(Vec::new());
        };
        let url = format!("{}/{path}/_search", self.base_url);
        let body = search_body(sort_field, ascending, query, limit);
        let req = self.client("search")?.post(&url).json(&body);
        let text = self.send("search", &url, req)?;
        parse_search_response(&text).map_err(|e| ConnectorError::Response {
            operation: "search",
            url,
            source: e,
        })
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!(url = %self.base_url, "Connection closed");
        }
    }
}

// =============================================================================
// Request/response shapes
// =============================================================================

/// Comma-joined index names, skipping empty ones. `None` if nothing is left.
fn index_expression(indices: &[String]) -> Option<String> {
    let names: Vec<&str> = indices
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    (!names.is_empty()).then(|| names.join(","))
}

/// `_search` request body: query-string (or match-all), one sort key, first page.
fn search_body(sort_field: &str, ascending: bool, query: &str, limit: usize) -> Value {
    let query = if query.is_empty() {
        json!({ "match_all": {} })
    } else {
        json!({ "query_string": { "query": query } })
    };

    let mut sort = serde_json::Map::new();
    sort.insert(
        sort_field.to_string(),
        json!({ "order": if ascending { "asc" } else { "desc" } }),
    );

    json!({
        "query": query,
        "sort": [Value::Object(sort)],
        "from": 0,
        "size": limit,
    })
}

#[derive(Deserialize)]
struct CatIndex {
    index: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Box<RawValue>,
}

fn parse_index_names(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let rows: Vec<CatIndex> = serde_json::from_str(body)?;
    Ok(rows.into_iter().map(|r| r.index).collect())
}

/// Hits in response order, `_source` kept as the exact JSON text received.
fn parse_search_response(body: &str) -> Result<Vec<LogEntry>, serde_json::Error> {
    let resp: SearchResponse = serde_json::from_str(body)?;
    Ok(resp
        .hits
        .hits
        .into_iter()
        .map(|hit| LogEntry::new(hit.id, hit.source.get()))
        .collect())
}
