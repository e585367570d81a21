//! Portcullis Invitation - the visitor credential state machine
//!
//! Invitations move `pending -> active -> used`, with `pending|active ->
//! expired`; `used` and `expired` are terminal. The status transition table
//! is evaluated against `now` on every verify; passive reads reconcile via
//! [`portcullis_types::VisitorInvitation::derived_status`] without writing.
//!
//! The one concurrency-sensitive write in the whole system lives here: the
//! used gate. Verification consumes the credential through a single atomic
//! compare-and-swap on the stored status, so two concurrent verifies of one
//! token can never both succeed.

#![deny(unsafe_code)]

mod error;
mod verifier;

pub use error::VerifyError;
pub use verifier::{InvitationVerifier, VerifiedInvitation};
