//! Entry point owning the API key.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::formatter::{FormatterConfig, FormatterRegistry, ReportFormatter};
use crate::productivity::ProductivityLevel;
use crate::query::ReportQuery;
use crate::requester::{HttpTransport, Requester, Transport};

/// Analytics API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Queries spawned
/// from it share the transport and formatter registry, but each holds its
/// own parameters.
#[derive(Clone)]
pub struct ReportClient {
    api_key: Option<String>,
    requester: Requester,
    formatters: Arc<FormatterRegistry>,
}

impl fmt::Debug for ReportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("requester", &self.requester)
            .field("formatters", &self.formatters)
            .finish()
    }
}

impl ReportClient {
    /// Creates a client over HTTP with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Creates a client without an API key.
    pub fn anonymous() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ReportClientBuilder {
        ReportClientBuilder::default()
    }

    /// Replaces the API key used by queries created afterwards.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    /// True if an API key is set and non-empty.
    pub fn api_key_present(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Checks the API key against the server with a minimal activity report.
    ///
    /// Returns `Ok(false)` when no key is set or the server rejects it. Any
    /// other failure is returned as an error.
    pub fn valid_credentials(&self) -> Result<bool> {
        if !self.api_key_present() {
            return Ok(false);
        }
        match self.activities().all() {
            Ok(_) => Ok(true),
            Err(Error::InvalidCredentials { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// A fresh query carrying this client's key.
    pub fn query(&self) -> ReportQuery {
        ReportQuery::new(
            self.api_key.clone(),
            self.requester.clone(),
            Arc::clone(&self.formatters),
        )
    }

    pub fn overview(&self) -> ReportQuery {
        self.query().overview()
    }

    pub fn categories(&self) -> ReportQuery {
        self.query().categories()
    }

    pub fn activities(&self) -> ReportQuery {
        self.query().activities()
    }

    pub fn productivity(&self) -> ReportQuery {
        self.query().productivity()
    }

    pub fn efficiency(&self) -> ReportQuery {
        self.query().efficiency()
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    /// Makes a formatter available to queries created afterwards.
    pub fn register_formatter(&mut self, formatter: impl ReportFormatter + 'static) {
        Arc::make_mut(&mut self.formatters).register(formatter);
    }

    pub const fn productivity_levels() -> [ProductivityLevel; 5] {
        ProductivityLevel::ALL
    }
}

/// Builder for [`ReportClient`].
#[derive(Default)]
pub struct ReportClientBuilder {
    api_key: Option<String>,
    host: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
    formatters: FormatterConfig,
}

impl fmt::Debug for ReportClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportClientBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("timeout", &self.timeout)
            .field("formatters", &self.formatters)
            .finish_non_exhaustive()
    }
}

impl ReportClientBuilder {
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the analytics endpoint.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Request timeout for the default HTTP transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the HTTP transport; `timeout` is then ignored.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn formatters(mut self, config: FormatterConfig) -> Self {
        self.formatters = config;
        self
    }

    pub fn build(self) -> Result<ReportClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => match self.timeout {
                Some(timeout) => Arc::new(HttpTransport::with_timeout(timeout)?),
                None => Arc::new(HttpTransport::new()?),
            },
        };

        let mut requester = Requester::new(transport);
        if let Some(host) = self.host {
            requester = requester.with_host(host);
        }

        Ok(ReportClient {
            api_key: self.api_key,
            requester,
            formatters: Arc::new(FormatterRegistry::with_config(self.formatters)),
        })
    }
}
