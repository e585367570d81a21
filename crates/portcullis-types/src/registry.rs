//! Registry entries and authorization results
//!
//! Registry entries are owned by the registry store; the Authorization
//! Resolver only reads them.

use serde::{Deserialize, Serialize};

/// Unique identifier for a registry entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryEntryId(String);

impl RegistryEntryId {
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

impl std::fmt::Display for RegistryEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an entry currently authorizes access.
///
/// Multiple inactive entries may share a plate (history); at most one active
/// entry should exist per plate, but the store does not enforce that
/// structurally - the resolver tolerates duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Active,
    Inactive,
}

/// A registered vehicle and its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Stable entry identifier; lowest id wins when duplicates match
    pub id: RegistryEntryId,

    /// Canonical plate form, the lookup key (see [`crate::normalize_plate`])
    pub normalized_plate: String,

    /// Owner identity
    pub owner: OwnerInfo,

    /// Entry status; only `Active` entries ever authorize
    pub status: EntryStatus,

    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Owner identity attached to a registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerInfo {
    /// Owner display name
    pub name: String,

    /// Residence unit
    pub unit: String,
}

/// Outcome of resolving a normalized plate against the registry.
///
/// A registry outage resolves to `granted: false` - the resolver fails
/// closed, never open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorization {
    /// Whether an active entry matched
    pub granted: bool,

    /// The matched owner, present only when granted
    pub identity: Option<OwnerInfo>,
}

impl Authorization {
    /// The deny result used for misses and registry failures alike.
    pub fn denied() -> Self {
        Self {
            granted: false,
            identity: None,
        }
    }

    pub fn granted_to(owner: OwnerInfo) -> Self {
        Self {
            granted: true,
            identity: Some(owner),
        }
    }
}
