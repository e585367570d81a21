//! In-memory registry implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use portcullis_types::{
    AccessAttempt, InvitationId, InvitationStatus, RegistryEntry, RegistryEntryId,
    VisitorInvitation,
};
use tokio::sync::RwLock;

use crate::traits::{
    AuditStore, InvitationStore, RegistryResult, RegistryStore, VehicleStore,
};

/// In-memory registry for development and testing.
///
/// Cheap to clone; clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    entries: Arc<RwLock<HashMap<RegistryEntryId, RegistryEntry>>>,
    invitations: Arc<RwLock<HashMap<InvitationId, VisitorInvitation>>>,
    attempts: Arc<RwLock<Vec<AccessAttempt>>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistryStore for InMemoryRegistry {}

#[async_trait]
impl VehicleStore for InMemoryRegistry {
    async fn get_entry(&self, id: &RegistryEntryId) -> RegistryResult<Option<RegistryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(id).cloned())
    }

    async fn list_entries(&self) -> RegistryResult<Vec<RegistryEntry>> {
        let entries = self.entries.read().await;
        let mut all: Vec<_> = entries.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn find_active_by_plate(
        &self,
        normalized_plate: &str,
    ) -> RegistryResult<Vec<RegistryEntry>> {
        let entries = self.entries.read().await;
        let mut matches: Vec<_> = entries
            .values()
            .filter(|e| e.status == portcullis_types::EntryStatus::Active)
            .filter(|e| e.normalized_plate.contains(normalized_plate))
            .cloned()
            .collect();
        // Lowest id first, so duplicate plates resolve reproducibly.
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }

    async fn upsert_entry(&self, entry: RegistryEntry) -> RegistryResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    async fn delete_entry(&self, id: &RegistryEntryId) -> RegistryResult<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(id).is_some())
    }
}

#[async_trait]
impl InvitationStore for InMemoryRegistry {
    async fn get_invitation(
        &self,
        id: &InvitationId,
    ) -> RegistryResult<Option<VisitorInvitation>> {
        let invitations = self.invitations.read().await;
        Ok(invitations.get(id).cloned())
    }

    async fn find_by_token(&self, qr_token: &str) -> RegistryResult<Option<VisitorInvitation>> {
        let invitations = self.invitations.read().await;
        Ok(invitations
            .values()
            .find(|i| i.qr_token == qr_token)
            .cloned())
    }

    async fn list_invitations(&self) -> RegistryResult<Vec<VisitorInvitation>> {
        let invitations = self.invitations.read().await;
        let mut all: Vec<_> = invitations.values().cloned().collect();
        all.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        Ok(all)
    }

    async fn upsert_invitation(&self, invitation: VisitorInvitation) -> RegistryResult<()> {
        let mut invitations = self.invitations.write().await;
        invitations.insert(invitation.id.clone(), invitation);
        Ok(())
    }

    async fn delete_invitation(&self, id: &InvitationId) -> RegistryResult<bool> {
        let mut invitations = self.invitations.write().await;
        Ok(invitations.remove(id).is_some())
    }

    async fn transition_status(
        &self,
        id: &InvitationId,
        from: &[InvitationStatus],
        to: InvitationStatus,
    ) -> RegistryResult<Option<VisitorInvitation>> {
        // Check and write under one write lock: the compare-and-swap the
        // verify path depends on.
        let mut invitations = self.invitations.write().await;
        match invitations.get_mut(id) {
            Some(invitation) if from.contains(&invitation.status) => {
                invitation.status = to;
                Ok(Some(invitation.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl AuditStore for InMemoryRegistry {
    async fn append_attempt(&self, attempt: AccessAttempt) -> RegistryResult<()> {
        let mut attempts = self.attempts.write().await;
        attempts.push(attempt);
        Ok(())
    }

    async fn list_attempts(
        &self,
        limit: usize,
        offset: usize,
    ) -> RegistryResult<Vec<AccessAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .iter()
            .rev()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_attempts(&self) -> RegistryResult<usize> {
        let attempts = self.attempts.read().await;
        Ok(attempts.len())
    }
}
