//! Error types for fetching dashboard data.

use serde::Serialize;
use thiserror::Error;

/// Errors a [`DashboardSource`](super::DashboardSource) can report for one fetch.
///
/// Every failure of the fetch client is represented here; nothing panics or
/// escapes across the source boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not complete (connection refused, transport error,
    /// non-success status, missing fixture file).
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The backend answered, but not with the expected payload shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request did not complete within the source's timeout.
    #[error("Request timed out")]
    Timeout,
}

impl FetchError {
    /// Returns the payload-free discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            FetchError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            FetchError::Timeout => ErrorKind::Timeout,
        }
    }
}

/// The category of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    InvalidResponse,
    Timeout,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::InvalidResponse(err.to_string())
        } else {
            FetchError::NetworkFailure(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            FetchError::NetworkFailure("refused".into()).kind(),
            ErrorKind::NetworkFailure
        );
        assert_eq!(
            FetchError::InvalidResponse("eof".into()).kind(),
            ErrorKind::InvalidResponse
        );
        assert_eq!(FetchError::Timeout.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_display_includes_detail() {
        let err = FetchError::NetworkFailure("status 503".into());
        assert_eq!(err.to_string(), "Network failure: status 503");
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
    }
}
