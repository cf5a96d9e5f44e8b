//! Owned handle to a running poll task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::source::Domain;
use crate::view::ViewState;

/// Lifecycle phase of one domain's poller.
///
/// `Idle -> Fetching -> Idle` on every completion. `Stopped` can be entered
/// from either phase and is never left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PollPhase {
    #[default]
    Idle,
    Fetching,
    Stopped,
}

/// Counters of one poller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Ticks seen, including the initial fetch on mount.
    pub ticks: u64,
    /// Fetches actually started.
    pub fetches: u64,
    /// Ticks dropped because a fetch was already in flight.
    pub coalesced: u64,
}

#[derive(Debug, Default)]
pub(crate) struct PollShared {
    phase: RwLock<PollPhase>,
    ticks: AtomicU64,
    fetches: AtomicU64,
    coalesced: AtomicU64,
}

impl PollShared {
    pub(crate) fn phase(&self) -> PollPhase {
        *self.phase.read()
    }

    /// Move to `next`, unless already stopped.
    pub(crate) fn transition(&self, next: PollPhase) {
        let mut phase = self.phase.write();
        if *phase != PollPhase::Stopped {
            *phase = next;
        }
    }

    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn stats(&self) -> PollStats {
        PollStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

/// Handle to one domain's poll task.
///
/// Stopping is exactly-once: [`stop`](Self::stop) consumes the handle, and
/// dropping the handle stops the task too. After stop no further fetch is
/// started and a response already in flight never reaches the view model.
pub struct PollHandle {
    pub(crate) domain: Domain,
    pub(crate) stop_tx: watch::Sender<bool>,
    pub(crate) task: JoinHandle<()>,
    pub(crate) shared: Arc<PollShared>,
    pub(crate) state: Arc<ViewState>,
}

impl PollHandle {
    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn phase(&self) -> PollPhase {
        self.shared.phase()
    }

    pub fn stats(&self) -> PollStats {
        self.shared.stats()
    }

    /// Stop polling this domain.
    pub fn stop(self) {
        drop(self);
    }

    fn shutdown(&mut self) {
        // Retire first: a completion racing with this call either committed
        // already or is rejected under the aggregator lock.
        self.state.retire(self.domain);
        self.shared.transition(PollPhase::Stopped);
        let _ = self.stop_tx.send(true);
        self.task.abort();
        debug!(domain = %self.domain, "Poller stopped");
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollHandle")
            .field("domain", &self.domain)
            .field("phase", &self.phase())
            .field("stats", &self.stats())
            .finish()
    }
}
