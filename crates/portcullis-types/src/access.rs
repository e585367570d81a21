//! Access attempts and pipeline decisions
//!
//! An [`AccessAttempt`] is the durable audit record: created exactly once per
//! pipeline run, append-only, never mutated or deleted. The Access Pipeline
//! is its sole writer.

use serde::{Deserialize, Serialize};

use crate::registry::OwnerInfo;

/// Unique identifier for an access attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(String);

impl AttemptId {
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

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Correlation id tying an attempt, its audit record, and any gate command
/// together across logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(String);

impl CorrelationId {
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

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stages of one pipeline attempt, strictly sequential.
///
/// No stage is retried automatically; a failure terminates the attempt at its
/// current stage and the audit record is tagged with that terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Recognizing,
    Resolving,
    Deciding,
    Actuating,
    Logged,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PipelineStage::Received => "received",
            PipelineStage::Recognizing => "recognizing",
            PipelineStage::Resolving => "resolving",
            PipelineStage::Deciding => "deciding",
            PipelineStage::Actuating => "actuating",
            PipelineStage::Logged => "logged",
        };
        f.write_str(s)
    }
}

/// What happened at the gate for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateAction {
    /// An open command was handed to the transport
    Opened,
    /// The attempt was not authorized; no command issued
    Rejected,
    /// Authorization or actuation failed; see the attempt's error kind
    Error,
}

/// Why an attempt was rejected without reaching the decision policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    /// The recognition service returned zero candidates
    NoPlateDetected,
    /// No active registry entry matched
    NotAuthorized,
    /// Confidence fell below the policy threshold
    LowConfidence,
}

/// Durable audit record for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessAttempt {
    /// Unique attempt identifier
    pub id: AttemptId,

    /// When the attempt was received
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Raw OCR text of the primary candidate, if any plate was detected
    pub input_plate: Option<String>,

    /// Canonical form of `input_plate`
    pub normalized_plate: Option<String>,

    /// Primary candidate confidence, if any plate was detected
    pub confidence: Option<f64>,

    /// The authorization decision; independent of actuation outcome
    pub authorized: bool,

    /// Gate outcome for this attempt
    pub gate_action: GateAction,

    /// Stage the attempt terminated at
    pub terminal_stage: PipelineStage,

    /// Error kind when the attempt failed, e.g. `timeout`
    pub error_kind: Option<String>,

    /// Ties this record to the pipeline run and any gate command
    pub correlation_id: CorrelationId,
}

/// The synchronous decision returned to the caller.
///
/// `authorized` and the actuation outcome are deliberately decoupled: a
/// channel failure after a grant is reported in `gate_action` but never
/// downgrades `authorized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether access was granted
    pub authorized: bool,

    /// Canonical plate the decision was made on, if a plate was detected
    pub plate: Option<String>,

    /// Primary candidate confidence, if a plate was detected
    pub confidence: Option<f64>,

    /// Matched owner when authorized
    pub identity: Option<OwnerInfo>,

    /// What happened at the gate
    pub gate_action: GateAction,

    /// Why the attempt was rejected, when it was
    pub rejection: Option<RejectionReason>,

    /// Correlation id shared with the audit record
    pub correlation_id: CorrelationId,
}
