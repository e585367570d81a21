//! Portcullis Registry - persistent store seams and the authorization resolver
//!
//! The registry is a queryable store of vehicles, visitor invitations, and
//! the append-only audit trail. No transactional semantics are assumed
//! beyond single-row atomicity; the one operation that needs more is the
//! invitation status transition, which is a single atomic conditional update
//! ([`InvitationStore::transition_status`]).

#![deny(unsafe_code)]

mod error;
mod memory;
mod resolver;
mod traits;

pub use error::RegistryError;
pub use memory::InMemoryRegistry;
pub use resolver::AuthorizationResolver;
pub use traits::{
    AuditStore, InvitationStore, RegistryResult, RegistryStore, VehicleStore,
};
