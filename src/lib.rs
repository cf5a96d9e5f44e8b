//! # medisurge-monitor
//!
//! Polling, aggregation and derived state for the MediSurge crisis dashboard.
//!
//! This crate is the client-side core behind the dashboard: it decides when
//! each data domain is refreshed, merges the results into one consistent
//! view model, and computes the presentation values (alert level,
//! time-to-surge, threshold bands) a renderer needs. Rendering itself is left
//! to whoever subscribes.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DashboardView                         │
//! │  ┌─────────┐  tick   ┌──────────┐  result  ┌──────────────┐  │
//! │  │  poll   │────────▶│  source  │─────────▶│ data         │  │
//! │  │(Poller) │         │ (fetch)  │          │ (Aggregator) │  │
//! │  └─────────┘         └──────────┘          └──────┬───────┘  │
//! │                                                   │          │
//! │                                   Arc<ViewModel>  ▼          │
//! │                                          watch channel ──────┼──▶ renderer
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: Fetch client abstraction ([`DashboardSource`] trait) with an
//!   HTTP implementation and a fixture-directory implementation
//! - **[`poll`]**: One tokio task per domain, with coalescing and owned handles
//! - **[`data`]**: Sequence-ordered aggregation into an immutable [`ViewModel`],
//!   derived state and display fallbacks
//! - **[`view`]**: The per-view context tying pollers, state and subscribers together
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use medisurge_monitor::{DashboardView, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(None).unwrap();
//! let source = Arc::new(settings.http_source().unwrap());
//! let view = DashboardView::mount(source, &settings.policies().unwrap());
//!
//! let mut updates = view.subscribe();
//! updates.changed().await.unwrap();
//! let digest = updates.borrow().digest(Utc::now());
//! println!("{} alert, surge in {}h", digest.alert_level.as_str(), digest.hours_until_surge);
//!
//! view.unmount();
//! # });
//! ```
//!
//! ### Offline, from fixtures
//!
//! ```no_run
//! use std::sync::Arc;
//! use medisurge_monitor::{DashboardView, FileSource, PolicySet};
//!
//! # tokio_test::block_on(async {
//! // Reads fixtures/dashboard.json, fixtures/agents.json, ...
//! let view = DashboardView::mount(Arc::new(FileSource::new("fixtures")), &PolicySet::default());
//! # });
//! ```

pub mod data;
pub mod logging;
pub mod poll;
pub mod settings;
pub mod source;
pub mod view;

// Re-export main types for convenience
pub use data::{AlertLevel, Digest, DomainSnapshot, StatusBand, SupplyStatus, ViewModel};
pub use poll::{Cadence, PolicySet, PollHandle, PollPhase, PollStats, Poller, RefreshPolicy};
pub use settings::Settings;
pub use source::{
    DashboardSource, Domain, ErrorKind, FetchError, FileSource, HttpSource, Payload,
};
pub use view::{DashboardView, ViewState};
