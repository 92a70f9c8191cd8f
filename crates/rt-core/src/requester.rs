//! HTTP request execution and response classification.
//!
//! # Soft errors
//!
//! The analytics API reports a rejected key or a malformed query with HTTP
//! 200 and a small JSON body instead of CSV. Bodies are therefore checked
//! for those signatures before the status code is looked at.
//!
//! # Thread Safety
//!
//! [`Requester`] is cheap to clone and safe to share across threads. Clones
//! share the same [`Transport`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The analytics data endpoint.
pub const DEFAULT_HOST: &str = "https://www.rescuetime.com/anapi/data";

/// Query parameter carrying the API key.
pub const KEY_PARAM: &str = "key";

const KEY_NOT_FOUND_SIGNATURE: &str = r##""error":"# key not found""##;
const QUERY_ERROR_SIGNATURE: &str = r##""error": "# query error""##;

/// Outgoing query parameters, ordered by name.
pub type RequestParams = BTreeMap<String, String>;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Performs a single GET request.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds a transport using the client's default timeout.
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("rt/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(Error::ClientBuild)?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        // Request URLs carry the API key; keep them out of error messages.
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .map_err(reqwest::Error::without_url)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(reqwest::Error::without_url)?;
        Ok(HttpResponse { status, body })
    }
}

/// Sends report requests and turns responses into bodies or errors.
#[derive(Clone)]
pub struct Requester {
    transport: Arc<dyn Transport>,
    host: String,
}

impl fmt::Debug for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requester")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl Requester {
    /// Creates a requester targeting [`DEFAULT_HOST`].
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            host: DEFAULT_HOST.to_string(),
        }
    }

    /// Creates a requester over a fresh [`HttpTransport`].
    pub fn http() -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new()?)))
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Issues one GET with `params` and returns the body on success.
    ///
    /// Fails with [`Error::MissingCredentials`] before any network call if
    /// the `key` parameter is absent or empty. Empty-valued parameters are
    /// never sent.
    pub fn get(&self, params: &RequestParams) -> Result<String> {
        if !params.get(KEY_PARAM).is_some_and(|key| !key.is_empty()) {
            return Err(Error::MissingCredentials);
        }

        let query: Vec<(String, String)> = params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let sent: Vec<&str> = query
            .iter()
            .filter(|(name, _)| name != KEY_PARAM)
            .map(|(name, _)| name.as_str())
            .collect();
        tracing::debug!(
            host = %self.host,
            params = ?sent,
            dropped = params.len() - query.len(),
            "requesting report"
        );

        let response = self.transport.get(&self.host, &query)?;
        classify(response)
    }
}

/// Classifies a response: soft-error signatures first, then the status table.
pub fn classify(response: HttpResponse) -> Result<String> {
    let HttpResponse { status, body } = response;

    if body.contains(KEY_NOT_FOUND_SIGNATURE) {
        tracing::warn!(status, "server rejected API key");
        return Err(Error::invalid_credentials());
    }
    if body.contains(QUERY_ERROR_SIGNATURE) {
        tracing::warn!(status, "server rejected query");
        return Err(server_message(&body).map_or_else(Error::invalid_query, Error::query));
    }

    if let Some(error) = Error::from_status(status) {
        tracing::debug!(status, "error status");
        return Err(error);
    }
    Ok(body)
}

fn server_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        messages: Option<String>,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .and_then(|payload| payload.messages)
        .map(|message| message.trim_start_matches("Error: ").to_string())
        .filter(|message| !message.is_empty())
}
