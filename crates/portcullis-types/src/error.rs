//! Shared error taxonomy for the access pipeline and its collaborators

use thiserror::Error;

/// Errors surfaced by the access decision pipeline and its collaborators.
///
/// Expected outcomes (`Validation`, `NotFound`, `Expired`, `AlreadyUsed`)
/// surface directly to the caller with no retry. `ServiceUnavailable` and
/// `Timeout` abort the current attempt but are never fatal to the process.
/// `Internal` classifies registry failures, which always resolve to a deny.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("credential expired")]
    Expired,

    #[error("credential already used")]
    AlreadyUsed,

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AccessError {
    /// Short machine-readable kind, recorded in audit records.
    pub fn kind(&self) -> &'static str {
        match self {
            AccessError::Validation(_) => "validation",
            AccessError::NotFound(_) => "not_found",
            AccessError::Expired => "expired",
            AccessError::AlreadyUsed => "already_used",
            AccessError::ServiceUnavailable(_) => "service_unavailable",
            AccessError::Timeout(_) => "timeout",
            AccessError::Internal(_) => "internal",
        }
    }

    /// Expected outcomes are the caller's to handle; everything else is an
    /// infrastructure failure and must not be confused with a deny.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            AccessError::Validation(_)
                | AccessError::NotFound(_)
                | AccessError::Expired
                | AccessError::AlreadyUsed
        )
    }
}
