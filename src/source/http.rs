//! HTTP data source backed by the MediSurge REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{DashboardSource, Domain, FetchError, Payload};

/// Default backend address used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A source that fetches each domain from its REST endpoint.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use medisurge_monitor::HttpSource;
///
/// let source = HttpSource::builder()
///     .base_url("http://medisurge.local:8000")
///     .timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
/// assert_eq!(source.base_url(), "http://medisurge.local:8000");
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: String,
    timeout: Duration,
    description: String,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// The backend base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Full URL for a domain's endpoint.
    pub fn url_for(&self, domain: Domain) -> String {
        format!("{}{}", self.base_url, domain.endpoint())
    }
}

#[async_trait]
impl DashboardSource for HttpSource {
    async fn fetch(&self, domain: Domain) -> Result<Payload, FetchError> {
        let url = self.url_for(domain);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::NetworkFailure(format!(
                "{} returned status {}",
                domain.endpoint(),
                response.status()
            )));
        }

        let body = response.bytes().await?;
        domain.decode(&body)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpSource`].
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the backend base URL (e.g., "http://localhost:8000").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, FetchError> {
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::NetworkFailure(format!("HTTP client setup: {}", e)))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("http: {}", base_url);

        Ok(HttpSource {
            client,
            base_url,
            timeout,
            description,
        })
    }
}
