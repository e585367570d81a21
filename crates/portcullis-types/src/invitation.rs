//! Visitor invitations and their status lifecycle
//!
//! Status is both stored and derivable from `(now, valid_until, stored)`.
//! Stored status may lag the derived status; reads reconcile via
//! [`VisitorInvitation::derived_status`] and the state machine persists only
//! on actual transitions, never on passive reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a visitor invitation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(String);

impl InvitationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invitation lifecycle status.
///
/// `pending -> active -> used`, with `pending|active -> expired`. `Used` and
/// `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Active,
    Used,
    Expired,
}

impl InvitationStatus {
    /// Terminal statuses never transition again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvitationStatus::Used | InvitationStatus::Expired)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Active => "active",
            InvitationStatus::Used => "used",
            InvitationStatus::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// A time-bounded visitor credential identified by a unique QR token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitorInvitation {
    /// Unique invitation identifier
    pub id: InvitationId,

    /// Visitor display name
    pub visitor_name: String,

    /// Unit hosting the visitor
    pub host_unit: String,

    /// Expected plate, if the host provided one
    pub plate_number: Option<String>,

    /// Unique token encoded in the visitor's QR code
    pub qr_token: String,

    /// Start of the validity window (creation time)
    pub valid_from: DateTime<Utc>,

    /// End of the validity window; immutable except by explicit update
    pub valid_until: DateTime<Utc>,

    /// Stored status; may lag the derived status until reconciled
    pub status: InvitationStatus,
}

impl VisitorInvitation {
    /// Status as derived from the validity window at `now`.
    ///
    /// Terminal stored statuses stick. A pending invitation inside its window
    /// reads as `Active` (passive read does not persist that transition);
    /// anything non-terminal past `valid_until` reads as `Expired`.
    pub fn derived_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        if now >= self.valid_until {
            InvitationStatus::Expired
        } else {
            InvitationStatus::Active
        }
    }

    /// Whether the validity window has passed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.valid_until
    }
}
