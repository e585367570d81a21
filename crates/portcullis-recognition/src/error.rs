use std::time::Duration;

use portcullis_types::AccessError;
use thiserror::Error;

/// Errors from the recognition service client.
///
/// All three are recoverable at the caller's discretion; none crash the
/// process.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// Connection refusal, DNS failure, or any other transport-level failure
    #[error("recognition service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The service did not respond within the operation's timeout
    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    /// The service responded but the body was missing required fields or
    /// internally inconsistent
    #[error("bad recognition response: {0}")]
    BadResponse(String),
}

impl RecognitionError {
    /// Classify a transport error against the timeout the request ran under.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            RecognitionError::Timeout(timeout)
        } else if err.is_decode() {
            RecognitionError::BadResponse(err.to_string())
        } else {
            RecognitionError::ServiceUnavailable(err.to_string())
        }
    }
}

impl From<RecognitionError> for AccessError {
    fn from(err: RecognitionError) -> Self {
        match err {
            RecognitionError::ServiceUnavailable(msg) => AccessError::ServiceUnavailable(msg),
            RecognitionError::Timeout(d) => AccessError::Timeout(d),
            RecognitionError::BadResponse(msg) => AccessError::Internal(msg),
        }
    }
}
