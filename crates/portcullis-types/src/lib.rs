//! Portcullis Types - Core types for the access decision pipeline
//!
//! Portcullis grants or denies physical access to a secured premises based on
//! license-plate recognition and time-bounded visitor credentials, and
//! actuates a remote gate accordingly.
//!
//! ## Architectural Boundaries
//!
//! - **Pipeline** owns: orchestration, the decision policy, audit writes
//! - **Recognition Client** owns: the external recognition service contract
//! - **Registry** owns: vehicles, invitations, and the audit trail
//! - **Channel** owns: the command transport to the physical actuator
//!
//! ## Key Concepts
//!
//! - **PlateCandidate**: a recognition output pairing plate text with confidence
//! - **Normalization**: the canonical form used for all plate comparison
//! - **AccessAttempt**: the append-only audit record, one per pipeline run
//! - **VisitorInvitation**: a time-bounded credential with a fixed lifecycle
//! - **GateCommand**: a transient command published to the actuator

#![deny(unsafe_code)]

pub mod access;
pub mod command;
pub mod error;
pub mod invitation;
pub mod plate;
pub mod registry;

// Re-export main types
pub use access::{
    AccessAttempt, AccessDecision, AttemptId, CorrelationId, GateAction, PipelineStage,
    RejectionReason,
};
pub use command::{CommandEnvelope, GateCommand, GateCommandKind, DEFAULT_OPEN_DURATION_MS};
pub use error::AccessError;
pub use invitation::{InvitationId, InvitationStatus, VisitorInvitation};
pub use plate::{normalize_plate, PlateCandidate, RankedCandidates};
pub use registry::{Authorization, EntryStatus, OwnerInfo, RegistryEntry, RegistryEntryId};
