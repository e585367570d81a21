//! Registry store trait definitions

use async_trait::async_trait;
use portcullis_types::{
    AccessAttempt, InvitationId, InvitationStatus, RegistryEntry, RegistryEntryId,
    VisitorInvitation,
};

use crate::error::RegistryError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Combined registry trait
#[async_trait]
pub trait RegistryStore: VehicleStore + InvitationStore + AuditStore + Send + Sync {}

/// Store for registered vehicles
#[async_trait]
pub trait VehicleStore: Send + Sync {
    /// Get an entry by ID
    async fn get_entry(&self, id: &RegistryEntryId) -> RegistryResult<Option<RegistryEntry>>;

    /// List all entries
    async fn list_entries(&self) -> RegistryResult<Vec<RegistryEntry>>;

    /// Find active entries matching a normalized plate.
    ///
    /// Match is substring or equality against the stored normalized plate.
    /// May return more than one entry; callers pick deterministically.
    async fn find_active_by_plate(
        &self,
        normalized_plate: &str,
    ) -> RegistryResult<Vec<RegistryEntry>>;

    /// Create or update an entry
    async fn upsert_entry(&self, entry: RegistryEntry) -> RegistryResult<()>;

    /// Delete an entry by ID
    async fn delete_entry(&self, id: &RegistryEntryId) -> RegistryResult<bool>;
}

/// Store for visitor invitations
#[async_trait]
pub trait InvitationStore: Send + Sync {
    /// Get an invitation by ID
    async fn get_invitation(&self, id: &InvitationId)
        -> RegistryResult<Option<VisitorInvitation>>;

    /// Find an invitation by its unique QR token
    async fn find_by_token(&self, qr_token: &str) -> RegistryResult<Option<VisitorInvitation>>;

    /// List all invitations
    async fn list_invitations(&self) -> RegistryResult<Vec<VisitorInvitation>>;

    /// Create or update an invitation
    async fn upsert_invitation(&self, invitation: VisitorInvitation) -> RegistryResult<()>;

    /// Delete an invitation by ID (administrative)
    async fn delete_invitation(&self, id: &InvitationId) -> RegistryResult<bool>;

    /// Atomically move an invitation to `to` iff its stored status is one of
    /// `from`, returning the updated record on success and `None` when the
    /// precondition failed.
    ///
    /// This is the single compare-and-swap the state machine relies on: two
    /// concurrent verifies racing through it must see exactly one success.
    async fn transition_status(
        &self,
        id: &InvitationId,
        from: &[InvitationStatus],
        to: InvitationStatus,
    ) -> RegistryResult<Option<VisitorInvitation>>;
}

/// Append-only store for access attempts
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append one attempt; attempts are never mutated or deleted
    async fn append_attempt(&self, attempt: AccessAttempt) -> RegistryResult<()>;

    /// List attempts newest-first with limit/offset paging
    async fn list_attempts(&self, limit: usize, offset: usize)
        -> RegistryResult<Vec<AccessAttempt>>;

    /// Total number of recorded attempts
    async fn count_attempts(&self) -> RegistryResult<usize>;
}
