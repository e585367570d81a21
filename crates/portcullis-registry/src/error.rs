use portcullis_types::AccessError;
use thiserror::Error;

/// Errors from the registry store.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("registry error: {0}")]
    Internal(String),
}

impl From<RegistryError> for AccessError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Unavailable(msg) => AccessError::ServiceUnavailable(msg),
            RegistryError::DuplicateKey(msg) => AccessError::Validation(msg),
            RegistryError::Internal(msg) => AccessError::Internal(msg),
        }
    }
}
