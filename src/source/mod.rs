//! Fetch client abstraction for the dashboard backend.
//!
//! A [`DashboardSource`] turns a [`Domain`] into a parsed [`Payload`] or a
//! [`FetchError`]. It never retries and never touches view state; the poll
//! scheduler owns both of those concerns.

mod error;
mod file;
mod http;
pub mod payload;

pub use error::{ErrorKind, FetchError};
pub use file::FileSource;
pub use http::{HttpSource, HttpSourceBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use payload::{
    AgentState, AgentStatus, Alerts, CrisisTimeline, DashboardSummary, EventStatus, Payload,
    SystemMetrics, TimelineEvent,
};

use std::fmt::{self, Debug};

use async_trait::async_trait;
use serde::Serialize;

/// One independently polled category of backend data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Alerts, predictions, resources, insurance, staff and pharmacy summary.
    Dashboard,
    /// Running state of the eight agents.
    Agents,
    /// Performance and impact metrics.
    Metrics,
    /// Crisis response timeline.
    Timeline,
}

impl Domain {
    /// All domains, in display order.
    pub const ALL: [Domain; 4] = [
        Domain::Dashboard,
        Domain::Agents,
        Domain::Metrics,
        Domain::Timeline,
    ];

    /// The fixed endpoint path for this domain.
    pub fn endpoint(self) -> &'static str {
        match self {
            Domain::Dashboard => "/api/dashboard/summary",
            Domain::Agents => "/api/agents/status",
            Domain::Metrics => "/api/dashboard/metrics",
            Domain::Timeline => "/api/dashboard/timeline",
        }
    }

    /// Short lowercase name, used in logs and fixture file names.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Dashboard => "dashboard",
            Domain::Agents => "agents",
            Domain::Metrics => "metrics",
            Domain::Timeline => "timeline",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Domain::Dashboard => 0,
            Domain::Agents => 1,
            Domain::Metrics => 2,
            Domain::Timeline => 3,
        }
    }

    /// Parse a response body into this domain's payload type.
    pub fn decode(self, body: &[u8]) -> Result<Payload, FetchError> {
        let parsed = match self {
            Domain::Dashboard => serde_json::from_slice(body).map(Payload::Dashboard),
            Domain::Agents => serde_json::from_slice(body).map(Payload::Agents),
            Domain::Metrics => serde_json::from_slice(body).map(Payload::Metrics),
            Domain::Timeline => serde_json::from_slice(body).map(Payload::Timeline),
        };
        parsed.map_err(|e| FetchError::InvalidResponse(format!("{} payload: {}", self, e)))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trait for fetching dashboard data from a backend.
///
/// Implementations issue exactly one request per call and report every
/// failure through the returned `Result`.
///
/// # Example
///
/// ```no_run
/// use medisurge_monitor::{DashboardSource, Domain, HttpSource};
///
/// # tokio_test::block_on(async {
/// let source = HttpSource::builder().base_url("http://localhost:8000").build().unwrap();
/// match source.fetch(Domain::Agents).await {
///     Ok(payload) => println!("got {:?}", payload.domain()),
///     Err(e) => println!("fetch failed: {}", e),
/// }
/// # });
/// ```
#[async_trait]
pub trait DashboardSource: Send + Sync + Debug {
    /// Fetch the current payload for `domain`.
    async fn fetch(&self, domain: Domain) -> Result<Payload, FetchError>;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;
}
