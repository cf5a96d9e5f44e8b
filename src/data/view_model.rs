//! The immutable per-view aggregate handed to render subscribers.

use chrono::{DateTime, Utc};

use super::snapshot::DomainSnapshot;
use crate::source::{
    AgentStatus, CrisisTimeline, DashboardSummary, Domain, FetchError, Payload, SystemMetrics,
};

/// One consistent snapshot of every domain a view shows.
///
/// A `ViewModel` is never changed after it is published; each accepted fetch
/// result produces a new one with a higher `revision`. Domains that have never
/// resolved are [`DomainSnapshot::Absent`], so "no data yet" is always
/// distinguishable from a payload full of zeros.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    /// Incremented on every accepted update; 0 for the initial empty model.
    pub revision: u64,
    pub dashboard: DomainSnapshot<DashboardSummary>,
    pub agents: DomainSnapshot<AgentStatus>,
    pub metrics: DomainSnapshot<SystemMetrics>,
    pub timeline: DomainSnapshot<CrisisTimeline>,
}

impl ViewModel {
    /// The initial model: every domain absent.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True while no domain has resolved.
    pub fn is_empty(&self) -> bool {
        Domain::ALL.iter().all(|d| !self.has_resolved(*d))
    }

    /// Whether any fetch (successful or not) has completed for `domain`.
    pub fn has_resolved(&self, domain: Domain) -> bool {
        match domain {
            Domain::Dashboard => !self.dashboard.is_absent(),
            Domain::Agents => !self.agents.is_absent(),
            Domain::Metrics => !self.metrics.is_absent(),
            Domain::Timeline => !self.timeline.is_absent(),
        }
    }

    /// The current error for `domain`, if its latest fetch failed.
    pub fn error_for(&self, domain: Domain) -> Option<&FetchError> {
        match domain {
            Domain::Dashboard => self.dashboard.error(),
            Domain::Agents => self.agents.error(),
            Domain::Metrics => self.metrics.error(),
            Domain::Timeline => self.timeline.error(),
        }
    }

    /// State name of `domain`'s snapshot ("absent", "ready", "stale", "failed").
    pub fn state_label(&self, domain: Domain) -> &'static str {
        match domain {
            Domain::Dashboard => self.dashboard.state_label(),
            Domain::Agents => self.agents.state_label(),
            Domain::Metrics => self.metrics.state_label(),
            Domain::Timeline => self.timeline.state_label(),
        }
    }

    pub fn last_fetched_at(&self, domain: Domain) -> Option<DateTime<Utc>> {
        match domain {
            Domain::Dashboard => self.dashboard.last_fetched_at(),
            Domain::Agents => self.agents.last_fetched_at(),
            Domain::Metrics => self.metrics.last_fetched_at(),
            Domain::Timeline => self.timeline.last_fetched_at(),
        }
    }

    /// A new model with one domain's snapshot replaced by the given result.
    ///
    /// All other domains are carried over unchanged. A payload that belongs to
    /// a different domain is recorded as an invalid response.
    pub(crate) fn with_result(
        &self,
        domain: Domain,
        result: Result<Payload, FetchError>,
        at: DateTime<Utc>,
    ) -> Self {
        let mut next = self.clone();
        next.revision += 1;

        let result = match result {
            Ok(payload) if payload.domain() != domain => Err(FetchError::InvalidResponse(
                format!("{} payload delivered for {}", payload.domain(), domain),
            )),
            other => other,
        };

        match (domain, result) {
            (_, Ok(Payload::Dashboard(p))) => next.dashboard = self.dashboard.resolve(Ok(p), at),
            (_, Ok(Payload::Agents(p))) => next.agents = self.agents.resolve(Ok(p), at),
            (_, Ok(Payload::Metrics(p))) => next.metrics = self.metrics.resolve(Ok(p), at),
            (_, Ok(Payload::Timeline(p))) => next.timeline = self.timeline.resolve(Ok(p), at),
            (Domain::Dashboard, Err(e)) => next.dashboard = self.dashboard.resolve(Err(e), at),
            (Domain::Agents, Err(e)) => next.agents = self.agents.resolve(Err(e), at),
            (Domain::Metrics, Err(e)) => next.metrics = self.metrics.resolve(Err(e), at),
            (Domain::Timeline, Err(e)) => next.timeline = self.timeline.resolve(Err(e), at),
        }

        next
    }
}
