//! Sequence-ordered merging of fetch results into the view model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::view_model::ViewModel;
use crate::source::{Domain, FetchError, Payload};

/// Identifies one issued fetch: its domain and per-domain sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub domain: Domain,
    pub seq: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Gate {
    issued: u64,
    applied: u64,
    retired: bool,
}

/// Holds the current [`ViewModel`] and decides which completions may change it.
///
/// Every fetch is issued a [`Ticket`] first. A completion is applied only if
/// its ticket is the newest one issued for its domain and the domain has not
/// been retired; anything else is discarded. This makes the final state
/// independent of the order in which responses arrive.
///
/// # Example
///
/// ```
/// use medisurge_monitor::data::Aggregator;
/// use medisurge_monitor::{Domain, FetchError};
///
/// let mut agg = Aggregator::new();
/// let old = agg.issue(Domain::Agents).unwrap();
/// let new = agg.issue(Domain::Agents).unwrap();
///
/// assert!(agg.update(new, Err(FetchError::Timeout)).is_some());
/// // An older response arriving late is dropped
/// assert!(agg.update(old, Err(FetchError::Timeout)).is_none());
/// ```
#[derive(Debug, Default)]
pub struct Aggregator {
    current: Arc<ViewModel>,
    gates: [Gate; 4],
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The latest view model.
    pub fn view(&self) -> Arc<ViewModel> {
        Arc::clone(&self.current)
    }

    /// Issue a ticket for a new fetch of `domain`.
    ///
    /// Returns `None` once the domain is retired: no further fetch may start.
    pub fn issue(&mut self, domain: Domain) -> Option<Ticket> {
        let gate = &mut self.gates[domain.index()];
        if gate.retired {
            return None;
        }
        gate.issued += 1;
        Some(Ticket {
            domain,
            seq: gate.issued,
        })
    }

    /// Apply a completed fetch, stamped with the current time.
    pub fn update(
        &mut self,
        ticket: Ticket,
        result: Result<Payload, FetchError>,
    ) -> Option<Arc<ViewModel>> {
        self.update_at(ticket, result, Utc::now())
    }

    /// Apply a completed fetch.
    ///
    /// Returns the new view model, or `None` if the completion was discarded
    /// because it was superseded or its domain was retired.
    pub fn update_at(
        &mut self,
        ticket: Ticket,
        result: Result<Payload, FetchError>,
        at: DateTime<Utc>,
    ) -> Option<Arc<ViewModel>> {
        let gate = &mut self.gates[ticket.domain.index()];

        if gate.retired {
            debug!(
                domain = %ticket.domain,
                seq = ticket.seq,
                "Discarding completion for retired domain"
            );
            return None;
        }
        if ticket.seq != gate.issued || ticket.seq <= gate.applied {
            debug!(
                domain = %ticket.domain,
                seq = ticket.seq,
                latest = gate.issued,
                "Discarding superseded completion"
            );
            return None;
        }
        gate.applied = ticket.seq;

        let next = Arc::new(self.current.with_result(ticket.domain, result, at));
        self.current = Arc::clone(&next);
        Some(next)
    }

    /// Stop accepting results for `domain`. Every later completion is ignored.
    pub fn retire(&mut self, domain: Domain) {
        self.gates[domain.index()].retired = true;
    }

    pub fn is_retired(&self, domain: Domain) -> bool {
        self.gates[domain.index()].retired
    }

    /// Accept results for a retired domain again.
    ///
    /// The issue counter is bumped so that tickets handed out before the
    /// domain was retired can never apply.
    pub fn enlist(&mut self, domain: Domain) {
        let gate = &mut self.gates[domain.index()];
        gate.retired = false;
        gate.issued += 1;
    }
}
