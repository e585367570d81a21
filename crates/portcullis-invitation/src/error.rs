use portcullis_registry::RegistryError;
use portcullis_types::{AccessError, VisitorInvitation};
use thiserror::Error;

/// Errors from credential verification.
///
/// `Expired` and `AlreadyUsed` still carry the record so the operator UI can
/// show who the credential belonged to.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("unknown credential token")]
    NotFound,

    #[error("credential expired")]
    Expired { invitation: VisitorInvitation },

    #[error("credential already used")]
    AlreadyUsed { invitation: VisitorInvitation },

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl From<VerifyError> for AccessError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::NotFound => AccessError::NotFound("credential token".into()),
            VerifyError::Expired { .. } => AccessError::Expired,
            VerifyError::AlreadyUsed { .. } => AccessError::AlreadyUsed,
            VerifyError::Registry(e) => e.into(),
        }
    }
}
