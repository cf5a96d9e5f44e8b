//! Per-domain snapshot state.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::source::{ErrorKind, FetchError};

/// A successfully fetched payload and when it arrived.
#[derive(Debug)]
pub struct Loaded<T> {
    pub data: Arc<T>,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Clone for Loaded<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            fetched_at: self.fetched_at,
        }
    }
}

/// The most recently known state of one domain.
///
/// Data and error are never both current: a success replaces any previous
/// error and a failure replaces the current data. A failure keeps the previous
/// success in `last_good` so the display can go on showing it.
#[derive(Debug)]
pub enum DomainSnapshot<T> {
    /// No fetch for this domain has completed yet.
    Absent,
    /// The latest fetch succeeded.
    Ready(Loaded<T>),
    /// The latest fetch failed.
    Failed {
        error: FetchError,
        failed_at: DateTime<Utc>,
        last_good: Option<Loaded<T>>,
    },
}

impl<T> Default for DomainSnapshot<T> {
    fn default() -> Self {
        DomainSnapshot::Absent
    }
}

impl<T> Clone for DomainSnapshot<T> {
    fn clone(&self) -> Self {
        match self {
            DomainSnapshot::Absent => DomainSnapshot::Absent,
            DomainSnapshot::Ready(loaded) => DomainSnapshot::Ready(loaded.clone()),
            DomainSnapshot::Failed {
                error,
                failed_at,
                last_good,
            } => DomainSnapshot::Failed {
                error: error.clone(),
                failed_at: *failed_at,
                last_good: last_good.clone(),
            },
        }
    }
}

impl<T> DomainSnapshot<T> {
    /// True until the first fetch for this domain completes.
    pub fn is_absent(&self) -> bool {
        matches!(self, DomainSnapshot::Absent)
    }

    /// Current data, only if the latest fetch succeeded.
    pub fn data(&self) -> Option<&T> {
        match self {
            DomainSnapshot::Ready(loaded) => Some(&*loaded.data),
            _ => None,
        }
    }

    /// Current error, only if the latest fetch failed.
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            DomainSnapshot::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(FetchError::kind)
    }

    /// Data to show: the current data, or the last good data after a failure.
    pub fn display_data(&self) -> Option<&T> {
        match self {
            DomainSnapshot::Absent => None,
            DomainSnapshot::Ready(loaded) => Some(&*loaded.data),
            DomainSnapshot::Failed { last_good, .. } => last_good.as_ref().map(|l| &*l.data),
        }
    }

    /// When the data returned by [`display_data`](Self::display_data) was fetched.
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        match self {
            DomainSnapshot::Absent => None,
            DomainSnapshot::Ready(loaded) => Some(loaded.fetched_at),
            DomainSnapshot::Failed { last_good, .. } => last_good.as_ref().map(|l| l.fetched_at),
        }
    }

    /// True when showing last-known-good data after a failed refresh.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            DomainSnapshot::Failed {
                last_good: Some(_),
                ..
            }
        )
    }

    /// Short state name for digests and logs.
    pub fn state_label(&self) -> &'static str {
        match self {
            DomainSnapshot::Absent => "absent",
            DomainSnapshot::Ready(_) => "ready",
            DomainSnapshot::Failed { last_good: Some(_), .. } => "stale",
            DomainSnapshot::Failed { last_good: None, .. } => "failed",
        }
    }

    /// The snapshot that results from applying a fetch result to this one.
    pub fn resolve(&self, result: Result<T, FetchError>, at: DateTime<Utc>) -> Self {
        match result {
            Ok(data) => DomainSnapshot::Ready(Loaded {
                data: Arc::new(data),
                fetched_at: at,
            }),
            Err(error) => {
                let last_good = match self {
                    DomainSnapshot::Absent => None,
                    DomainSnapshot::Ready(loaded) => Some(loaded.clone()),
                    DomainSnapshot::Failed { last_good, .. } => last_good.clone(),
                };
                DomainSnapshot::Failed {
                    error,
                    failed_at: at,
                    last_good,
                }
            }
        }
    }
}
