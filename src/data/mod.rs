//! View state: snapshots, aggregation and derived presentation values.
//!
//! This module turns fetch results into the immutable [`ViewModel`] that render
//! subscribers consume, and computes everything a render pass shows from it.
//!
//! ## Submodules
//!
//! - [`aggregator`]: Sequence-gated merging of results ([`Aggregator`], [`Ticket`])
//! - [`snapshot`]: Per-domain state ([`DomainSnapshot`]): absent, ready or failed
//! - [`view_model`]: The per-view aggregate ([`ViewModel`])
//! - [`derived`]: Alert banding, time-to-event and threshold bands
//! - [`display`]: Fallback defaults, agent roster and the render [`Digest`]
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "15s", "2h")
//!
//! ## Data Flow
//!
//! ```text
//! Aggregator::issue() ──▶ Ticket ──▶ fetch ──▶ Result<Payload, FetchError>
//!                                                   │
//!                                                   ▼
//!                                       Aggregator::update(ticket, result)
//!                                                   │ (latest ticket only)
//!                                                   ▼
//!                                         Arc<ViewModel> (revision + 1)
//!                                                   │
//!                                                   └──▶ ViewModel::digest(now)
//! ```

pub mod aggregator;
pub mod derived;
pub mod display;
pub mod duration;
pub mod snapshot;
pub mod view_model;

pub use aggregator::{Aggregator, Ticket};
pub use derived::{hours_until, round_half_up, AlertLevel, StatusBand, SupplyStatus};
pub use display::{agent_roster, AgentEntry, AgentKey, Digest, DomainState, Gauge};
pub use snapshot::{DomainSnapshot, Loaded};
pub use view_model::ViewModel;
