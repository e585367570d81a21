//! Credential verification against the transition table

use std::sync::Arc;

use chrono::{DateTime, Utc};
use portcullis_registry::InvitationStore;
use portcullis_types::{InvitationStatus, VisitorInvitation};
use tracing::{debug, info, warn};

use crate::error::VerifyError;

/// Statuses a credential may hold before consumption.
const CONSUMABLE: &[InvitationStatus] = &[InvitationStatus::Pending, InvitationStatus::Active];

/// A successfully verified, now-consumed credential.
#[derive(Debug, Clone)]
pub struct VerifiedInvitation {
    /// The record after consumption (status is terminal `Used`)
    pub invitation: VisitorInvitation,

    /// When verification happened
    pub verified_at: DateTime<Utc>,
}

/// Runs the invitation transition table on verify calls.
pub struct InvitationVerifier {
    store: Arc<dyn InvitationStore>,
}

impl InvitationVerifier {
    pub fn new(store: Arc<dyn InvitationStore>) -> Self {
        Self { store }
    }

    /// Verify a QR token against the current time.
    pub async fn verify(&self, token: &str) -> Result<VerifiedInvitation, VerifyError> {
        self.verify_at(token, Utc::now()).await
    }

    /// Verify a QR token against an explicit `now`.
    ///
    /// A successful verify consumes the credential: first verification takes
    /// a pending invitation through active, and the one-time-use gate moves
    /// it to `used`. Both steps are conditional status swaps in the store,
    /// so concurrent verifies of the same token see exactly one success.
    pub async fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedInvitation, VerifyError> {
        let invitation = self
            .store
            .find_by_token(token)
            .await?
            .ok_or(VerifyError::NotFound)?;

        if invitation.is_expired_at(now) {
            return Err(self.expire(invitation).await?);
        }

        match invitation.status {
            InvitationStatus::Used => {
                debug!(invitation = %invitation.id, "credential already consumed");
                return Err(VerifyError::AlreadyUsed { invitation });
            }
            InvitationStatus::Expired => {
                // Stored status can lead the window when it was expired
                // administratively; terminal is terminal.
                return Err(VerifyError::Expired { invitation });
            }
            InvitationStatus::Pending | InvitationStatus::Active => {}
        }

        // First verification activates a pending credential. Losing this
        // swap is fine; it only means another caller activated it first.
        let _ = self
            .store
            .transition_status(&invitation.id, &[InvitationStatus::Pending], InvitationStatus::Active)
            .await?;

        // The used gate: single conditional swap, winner takes the
        // credential.
        match self
            .store
            .transition_status(&invitation.id, CONSUMABLE, InvitationStatus::Used)
            .await?
        {
            Some(consumed) => {
                info!(
                    invitation = %consumed.id,
                    visitor = %consumed.visitor_name,
                    host_unit = %consumed.host_unit,
                    "credential verified and consumed"
                );
                Ok(VerifiedInvitation {
                    invitation: consumed,
                    verified_at: now,
                })
            }
            None => {
                // Lost the race; report what the winner left behind.
                let current = self
                    .store
                    .find_by_token(token)
                    .await?
                    .ok_or(VerifyError::NotFound)?;
                match current.status {
                    InvitationStatus::Expired => Err(VerifyError::Expired {
                        invitation: current,
                    }),
                    _ => Err(VerifyError::AlreadyUsed {
                        invitation: current,
                    }),
                }
            }
        }
    }

    /// Persist expiry and build the `Expired` failure.
    ///
    /// The swap only fires for non-terminal statuses; a credential already
    /// `used` stays `used` and still reports `Expired` here because the
    /// window check runs first.
    async fn expire(&self, invitation: VisitorInvitation) -> Result<VerifyError, VerifyError> {
        let expired = self
            .store
            .transition_status(&invitation.id, CONSUMABLE, InvitationStatus::Expired)
            .await?;

        match expired {
            Some(invitation) => {
                warn!(invitation = %invitation.id, "credential expired on verify");
                Ok(VerifyError::Expired { invitation })
            }
            None => Ok(VerifyError::Expired { invitation }),
        }
    }
}
