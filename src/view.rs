//! Per-view context: shared state, its pollers and the render subscription.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

use crate::data::{Aggregator, Ticket, ViewModel};
use crate::poll::{PollHandle, PollPhase, PollStats, PolicySet, Poller};
use crate::source::{DashboardSource, Domain, FetchError, Payload};

/// State shared between a view's poll tasks and its subscribers.
///
/// All updates go through one [`Aggregator`] behind a lock. An accepted update
/// is published to subscribers while the lock is still held, so subscribers
/// observe revisions in order.
#[derive(Debug)]
pub struct ViewState {
    aggregator: Mutex<Aggregator>,
    publisher: watch::Sender<Arc<ViewModel>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        let aggregator = Aggregator::new();
        let (publisher, _) = watch::channel(aggregator.view());
        Self {
            aggregator: Mutex::new(aggregator),
            publisher,
        }
    }

    pub fn issue(&self, domain: Domain) -> Option<Ticket> {
        self.aggregator.lock().issue(domain)
    }

    /// Apply a completed fetch and notify subscribers.
    ///
    /// Returns `false` if the completion was discarded.
    pub fn commit(&self, ticket: Ticket, result: Result<Payload, FetchError>) -> bool {
        let mut aggregator = self.aggregator.lock();
        match aggregator.update(ticket, result) {
            Some(view) => {
                self.publisher.send_replace(view);
                true
            }
            None => false,
        }
    }

    pub fn retire(&self, domain: Domain) {
        self.aggregator.lock().retire(domain);
    }

    pub fn enlist(&self, domain: Domain) {
        self.aggregator.lock().enlist(domain);
    }

    /// The most recently published view model.
    pub fn latest(&self) -> Arc<ViewModel> {
        Arc::clone(&self.publisher.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewModel>> {
        self.publisher.subscribe()
    }
}

/// A mounted dashboard view.
///
/// Mounting starts one poller per domain in the [`PolicySet`]; unmounting (or
/// dropping the view) stops all of them. Nothing outlives the view: no timer
/// keeps running and no late response changes the state.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use medisurge_monitor::{DashboardView, HttpSource, PolicySet};
///
/// # tokio_test::block_on(async {
/// let source = Arc::new(HttpSource::builder().build().unwrap());
/// let view = DashboardView::mount(source, &PolicySet::default());
///
/// let mut updates = view.subscribe();
/// while updates.changed().await.is_ok() {
///     let model = updates.borrow_and_update().clone();
///     println!("revision {}: {:?}", model.revision, model.alert_level());
/// }
/// # });
/// ```
#[derive(Debug)]
pub struct DashboardView {
    state: Arc<ViewState>,
    source: Arc<dyn DashboardSource>,
    pollers: Vec<PollHandle>,
}

impl DashboardView {
    /// Mount a view, starting a poller for every domain in `policies`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(source: Arc<dyn DashboardSource>, policies: &PolicySet) -> Self {
        let state = Arc::new(ViewState::new());
        let pollers = policies
            .iter()
            .map(|(domain, policy)| {
                Poller::start(domain, policy, Arc::clone(&source), Arc::clone(&state))
            })
            .collect::<Vec<_>>();

        info!(
            source = source.description(),
            domains = pollers.len(),
            "Dashboard view mounted"
        );

        Self {
            state,
            source,
            pollers,
        }
    }

    /// Receive every new view model as it is published.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ViewModel>> {
        self.state.subscribe()
    }

    pub fn latest(&self) -> Arc<ViewModel> {
        self.state.latest()
    }

    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    fn poller(&self, domain: Domain) -> Option<&PollHandle> {
        self.pollers.iter().find(|p| p.domain() == domain)
    }

    /// Poll counters for `domain`, if it is polled by this view.
    pub fn stats(&self, domain: Domain) -> Option<PollStats> {
        self.poller(domain).map(PollHandle::stats)
    }

    pub fn phase(&self, domain: Domain) -> Option<PollPhase> {
        self.poller(domain).map(PollHandle::phase)
    }

    /// Stop every poller and discard the view.
    pub fn unmount(mut self) {
        for poller in self.pollers.drain(..) {
            poller.stop();
        }
        info!(
            source = self.source.description(),
            revision = self.state.latest().revision,
            "Dashboard view unmounted"
        );
    }
}
