//! Per-domain poll task.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::future::OptionFuture;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, warn};

use super::handle::{PollHandle, PollPhase, PollShared};
use super::policy::{Cadence, RefreshPolicy};
use crate::data::Ticket;
use crate::source::{DashboardSource, Domain, FetchError, Payload};
use crate::view::ViewState;

type InFlight = Pin<Box<dyn Future<Output = (Ticket, Result<Payload, FetchError>)> + Send>>;

/// Starts poll tasks.
pub struct Poller;

impl Poller {
    /// Start polling `domain` into `state` according to `policy`.
    ///
    /// The first fetch is started immediately; with [`Cadence::Every`] a new
    /// fetch is started on every tick of the period after that. Ticks that
    /// arrive while a fetch is still in flight are dropped, not queued.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        domain: Domain,
        policy: RefreshPolicy,
        source: Arc<dyn DashboardSource>,
        state: Arc<ViewState>,
    ) -> PollHandle {
        state.enlist(domain);

        let (stop_tx, stop_rx) = watch::channel(false);
        let shared = Arc::new(PollShared::default());

        let task = tokio::spawn(run(
            domain,
            policy.cadence,
            source,
            Arc::clone(&state),
            Arc::clone(&shared),
            stop_rx,
        ));

        debug!(domain = %domain, cadence = %policy.cadence, "Poller started");

        PollHandle {
            domain,
            stop_tx,
            task,
            shared,
            state,
        }
    }
}

fn ticker_for(domain: Domain, cadence: Cadence) -> Option<Interval> {
    match cadence {
        Cadence::Every(period) if period.is_zero() => {
            warn!(domain = %domain, "Zero refresh period, fetching on mount only");
            None
        }
        Cadence::Every(period) => {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            Some(ticker)
        }
        Cadence::OnMount => None,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Issue a ticket and build the fetch future, or `None` if the domain is retired.
fn launch(
    domain: Domain,
    source: &Arc<dyn DashboardSource>,
    state: &ViewState,
    shared: &PollShared,
) -> Option<InFlight> {
    let ticket = state.issue(domain)?;
    shared.record_fetch();
    shared.transition(PollPhase::Fetching);

    let source = Arc::clone(source);
    Some(Box::pin(async move {
        let result = source.fetch(domain).await;
        (ticket, result)
    }))
}

async fn run(
    domain: Domain,
    cadence: Cadence,
    source: Arc<dyn DashboardSource>,
    state: Arc<ViewState>,
    shared: Arc<PollShared>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = ticker_for(domain, cadence);

    shared.record_tick();
    let mut in_flight = launch(domain, &source, &state, &shared);

    loop {
        tokio::select! {
            biased;

            _ = stop_rx.changed() => break,

            Some((ticket, result)) = OptionFuture::from(in_flight.as_mut()) => {
                in_flight = None;
                if let Err(e) = &result {
                    warn!(domain = %domain, error = %e, "Fetch failed");
                }
                state.commit(ticket, result);
                shared.transition(PollPhase::Idle);
            }

            _ = next_tick(&mut ticker) => {
                shared.record_tick();
                if in_flight.is_some() {
                    shared.record_coalesced();
                    debug!(domain = %domain, "Fetch still in flight, skipping tick");
                } else {
                    in_flight = launch(domain, &source, &state, &shared);
                }
            }
        }
    }

    shared.transition(PollPhase::Stopped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::payload::AgentStatus;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicU64,
    }

    #[async_trait]
    impl DashboardSource for CountingSource {
        async fn fetch(&self, _domain: Domain) -> Result<Payload, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Payload::Agents(AgentStatus::default()))
        }

        fn description(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_on_mount_and_every_period() {
        let source = Arc::new(CountingSource::default());
        let state = Arc::new(ViewState::new());
        let handle = Poller::start(
            Domain::Agents,
            RefreshPolicy::every(Duration::from_secs(15)),
            source.clone(),
            state.clone(),
        );

        tokio::time::sleep(Duration::from_secs(46)).await;

        // t = 0, 15, 30, 45
        assert_eq!(source.calls.load(Ordering::SeqCst), 4);
        assert_eq!(handle.stats().fetches, 4);
        assert_eq!(handle.phase(), PollPhase::Idle);
        assert!(state.latest().agents.data().is_some());
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_mount_fetches_once() {
        let source = Arc::new(CountingSource::default());
        let state = Arc::new(ViewState::new());
        let handle = Poller::start(
            Domain::Agents,
            RefreshPolicy::on_mount(),
            source.clone(),
            state,
        );

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.stats().ticks, 1);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_period_fetches_once() {
        let source = Arc::new(CountingSource::default());
        let state = Arc::new(ViewState::new());
        let handle = Poller::start(
            Domain::Agents,
            RefreshPolicy::every(Duration::ZERO),
            source.clone(),
            state,
        );

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_polling() {
        let source = Arc::new(CountingSource::default());
        let state = Arc::new(ViewState::new());
        let handle = Poller::start(
            Domain::Agents,
            RefreshPolicy::every(Duration::from_secs(15)),
            source.clone(),
            state.clone(),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.stop();
        let revision = state.latest().revision;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.latest().revision, revision);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let source = Arc::new(CountingSource::default());
        let state = Arc::new(ViewState::new());
        let policy = RefreshPolicy::every(Duration::from_secs(15));

        let first = Poller::start(Domain::Agents, policy, source.clone(), state.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(state.latest().revision, 1);

        // A fetch from the first run that is still outstanding when it stops
        let stale = state.issue(Domain::Agents).unwrap();
        first.stop();
        assert!(!state.commit(stale, Err(FetchError::Timeout)));

        let second = Poller::start(Domain::Agents, policy, source.clone(), state.clone());
        tokio::time::sleep(Duration::from_secs(1)).await;

        let model = state.latest();
        assert_eq!(model.revision, 2);
        assert!(model.agents.data().is_some());
        assert_eq!(second.phase(), PollPhase::Idle);
        assert_eq!(second.stats().fetches, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        // Late completion from the first run still cannot land
        assert!(!state.commit(stale, Err(FetchError::Timeout)));
        assert!(state.latest().agents.data().is_some());
        assert_eq!(state.latest().revision, 2);

        second.stop();
    }
}
