//! Per-attempt context accumulated as the pipeline runs

use chrono::{DateTime, Utc};
use portcullis_types::{
    AccessAttempt, AccessDecision, AttemptId, CorrelationId, GateAction, OwnerInfo,
    PipelineStage, RejectionReason,
};

/// State accumulated by one attempt as it moves through the stages.
///
/// The context outlives every stage so that a failure at any point can still
/// produce a complete audit record.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    /// Unique attempt identifier
    pub attempt_id: AttemptId,

    /// Correlation id shared by the audit record and any gate command
    pub correlation_id: CorrelationId,

    /// When the attempt was received
    pub received_at: DateTime<Utc>,

    /// Stage the attempt is currently in
    pub stage: PipelineStage,

    /// Raw OCR text of the primary candidate (set in Recognizing)
    pub input_plate: Option<String>,

    /// Canonical plate form (set in Resolving)
    pub normalized_plate: Option<String>,

    /// Primary candidate confidence (set in Recognizing)
    pub confidence: Option<f64>,

    /// The authorization decision (set in Deciding)
    pub authorized: bool,

    /// Matched owner when authorized (set in Deciding)
    pub identity: Option<OwnerInfo>,

    /// Gate outcome (set in Actuating, or on rejection/failure)
    pub gate_action: GateAction,

    /// Why the attempt was rejected, when it was
    pub rejection: Option<RejectionReason>,

    /// Error kind when a stage failed
    pub error_kind: Option<String>,
}

impl AttemptContext {
    /// A fresh context in the `Received` stage.
    pub fn new() -> Self {
        Self {
            attempt_id: AttemptId::generate(),
            correlation_id: CorrelationId::generate(),
            received_at: Utc::now(),
            stage: PipelineStage::Received,
            input_plate: None,
            normalized_plate: None,
            confidence: None,
            authorized: false,
            identity: None,
            gate_action: GateAction::Rejected,
            rejection: None,
            error_kind: None,
        }
    }

    /// Move to the next stage.
    pub fn advance(&mut self, stage: PipelineStage) {
        self.stage = stage;
    }

    /// The audit record for this attempt as it stands now.
    pub fn to_attempt(&self) -> AccessAttempt {
        AccessAttempt {
            id: self.attempt_id.clone(),
            timestamp: self.received_at,
            input_plate: self.input_plate.clone(),
            normalized_plate: self.normalized_plate.clone(),
            confidence: self.confidence,
            authorized: self.authorized,
            gate_action: self.gate_action,
            terminal_stage: self.stage,
            error_kind: self.error_kind.clone(),
            correlation_id: self.correlation_id.clone(),
        }
    }

    /// The synchronous decision returned to the caller.
    pub fn to_decision(&self) -> AccessDecision {
        AccessDecision {
            authorized: self.authorized,
            plate: self.normalized_plate.clone(),
            confidence: self.confidence,
            identity: self.identity.clone(),
            gate_action: self.gate_action,
            rejection: self.rejection.clone(),
            correlation_id: self.correlation_id.clone(),
        }
    }
}

impl Default for AttemptContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_starts_received_and_denied() {
        let ctx = AttemptContext::new();
        assert_eq!(ctx.stage, PipelineStage::Received);
        assert!(!ctx.authorized);
        assert_eq!(ctx.gate_action, GateAction::Rejected);
    }

    #[test]
    fn attempt_and_decision_share_the_correlation_id() {
        let mut ctx = AttemptContext::new();
        ctx.advance(PipelineStage::Logged);

        let attempt = ctx.to_attempt();
        let decision = ctx.to_decision();
        assert_eq!(attempt.correlation_id, decision.correlation_id);
        assert_eq!(attempt.terminal_stage, PipelineStage::Logged);
    }
}
