//! Poll scheduling.
//!
//! Each polled domain gets its own tokio task with its own cadence. Tasks are
//! owned by a [`PollHandle`]; dropping or stopping the handle ends the task.
//!
//! ```text
//!            ┌──────────── tick (coalesced while in flight)
//!            ▼
//!   Idle ──▶ Fetching ──▶ Idle        (success or failure)
//!     │         │
//!     └────┬────┘
//!          ▼
//!       Stopped                        (terminal)
//! ```

mod handle;
mod policy;
mod scheduler;

pub use handle::{PollHandle, PollPhase, PollStats};
pub use policy::{Cadence, PolicySet, RefreshPolicy};
pub use scheduler::Poller;
