//! The access decision and actuation pipeline

use std::sync::Arc;
use std::time::Duration;

use portcullis_channel::GateChannel;
use portcullis_recognition::Recognizer;
use portcullis_registry::{AuditStore, AuthorizationResolver};
use portcullis_types::{
    normalize_plate, AccessDecision, AccessError, GateAction, PipelineStage, RejectionReason,
};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::context::AttemptContext;
use crate::error::PipelineError;
use crate::policy;

/// Caller-side deadlines for the pipeline's external calls.
///
/// Each stage's call is wrapped in its own timeout so a hang in one
/// collaborator terminates the attempt instead of stalling it; late results
/// are discarded with the aborted future.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Deadline on the recognition call; sits above the client's own
    /// per-request timeout as a last-resort guard
    pub recognition_timeout: Duration,

    /// Deadline on the registry lookup
    pub registry_timeout: Duration,

    /// Deadline on the gate command hand-off
    pub actuation_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            recognition_timeout: Duration::from_secs(35),
            registry_timeout: Duration::from_secs(5),
            actuation_timeout: Duration::from_secs(5),
        }
    }
}

/// Orchestrates one capture through recognition, resolution, the decision
/// policy, actuation, and audit persistence.
///
/// All collaborators are process-scoped shared resources injected once;
/// attempts run concurrently against the same pipeline instance with no
/// cross-attempt ordering.
pub struct AccessPipeline {
    recognizer: Arc<dyn Recognizer>,
    resolver: AuthorizationResolver,
    channel: Arc<GateChannel>,
    audit: Arc<dyn AuditStore>,
    config: PipelineConfig,
}

impl AccessPipeline {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        resolver: AuthorizationResolver,
        channel: Arc<GateChannel>,
        audit: Arc<dyn AuditStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            recognizer,
            resolver,
            channel,
            audit,
            config,
        }
    }

    /// Run one attempt end to end.
    ///
    /// Returns the decision synchronously. An `Err` means the attempt failed
    /// before a decision could be made (infrastructure, not a deny); the
    /// audit record is written either way. An actuation failure after a
    /// grant is not an `Err`: the decision stands and the failure is
    /// reported in the decision's `gate_action`.
    pub async fn process(
        &self,
        image: Vec<u8>,
        filename: &str,
    ) -> Result<AccessDecision, PipelineError> {
        let mut ctx = AttemptContext::new();
        info!(
            attempt = %ctx.attempt_id,
            correlation = %ctx.correlation_id,
            filename,
            "access attempt received"
        );

        ctx.advance(PipelineStage::Recognizing);
        let ranked = match timeout(
            self.config.recognition_timeout,
            self.recognizer.recognize(image, filename),
        )
        .await
        {
            Err(_) => {
                return self
                    .fail(ctx, AccessError::Timeout(self.config.recognition_timeout))
                    .await
            }
            Ok(Err(e)) => return self.fail(ctx, e.into()).await,
            Ok(Ok(ranked)) => ranked,
        };

        // Zero candidates is a decision, not a failure.
        let Some(primary) = ranked.primary().cloned() else {
            debug!(attempt = %ctx.attempt_id, "no plate detected");
            ctx.gate_action = GateAction::Rejected;
            ctx.rejection = Some(RejectionReason::NoPlateDetected);
            return Ok(self.finish(ctx).await);
        };

        ctx.input_plate = Some(primary.text.clone());
        ctx.confidence = Some(primary.confidence);

        ctx.advance(PipelineStage::Resolving);
        let normalized = normalize_plate(&primary.text);
        ctx.normalized_plate = Some(normalized.clone());

        let auth = match timeout(
            self.config.registry_timeout,
            self.resolver.resolve(&normalized),
        )
        .await
        {
            Err(_) => {
                return self
                    .fail(ctx, AccessError::Timeout(self.config.registry_timeout))
                    .await
            }
            Ok(auth) => auth,
        };

        ctx.advance(PipelineStage::Deciding);
        ctx.authorized = policy::authorize(auth.granted, primary.confidence);

        if ctx.authorized {
            ctx.identity = auth.identity;
            ctx.advance(PipelineStage::Actuating);
            self.actuate(&mut ctx).await;
        } else {
            ctx.gate_action = GateAction::Rejected;
            ctx.rejection = Some(if auth.granted {
                RejectionReason::LowConfidence
            } else {
                RejectionReason::NotAuthorized
            });
        }

        Ok(self.finish(ctx).await)
    }

    /// Issue the open command, best-effort.
    ///
    /// The authorization already recorded in `ctx` is never undone here: a
    /// channel failure and the grant are two separate facts, and both end up
    /// in the audit record.
    async fn actuate(&self, ctx: &mut AttemptContext) {
        let publish = self.channel.open_gate(ctx.correlation_id.clone());
        match timeout(self.config.actuation_timeout, publish).await {
            Ok(Ok(_ack)) => {
                ctx.gate_action = GateAction::Opened;
            }
            Ok(Err(e)) => {
                warn!(
                    attempt = %ctx.attempt_id,
                    error = %e,
                    "gate command failed after authorization"
                );
                ctx.gate_action = GateAction::Error;
                ctx.error_kind = Some(AccessError::from(e).kind().to_string());
            }
            Err(_) => {
                warn!(
                    attempt = %ctx.attempt_id,
                    "gate command timed out after authorization"
                );
                ctx.gate_action = GateAction::Error;
                ctx.error_kind =
                    Some(AccessError::Timeout(self.config.actuation_timeout).kind().to_string());
            }
        }
    }

    /// Write the audit record and hand back the decision.
    async fn finish(&self, mut ctx: AttemptContext) -> AccessDecision {
        ctx.advance(PipelineStage::Logged);
        self.persist(&ctx).await;

        info!(
            attempt = %ctx.attempt_id,
            authorized = ctx.authorized,
            gate_action = ?ctx.gate_action,
            plate = ctx.normalized_plate.as_deref().unwrap_or("-"),
            "access attempt completed"
        );

        ctx.to_decision()
    }

    /// Terminate the attempt at its current stage.
    async fn fail(
        &self,
        mut ctx: AttemptContext,
        err: AccessError,
    ) -> Result<AccessDecision, PipelineError> {
        let stage = ctx.stage;
        ctx.gate_action = GateAction::Error;
        ctx.error_kind = Some(err.kind().to_string());
        self.persist(&ctx).await;

        warn!(
            attempt = %ctx.attempt_id,
            stage = %stage,
            error = %err,
            "access attempt failed"
        );

        Err(PipelineError::new(stage, err))
    }

    /// Append the audit record; the pipeline is its sole writer.
    ///
    /// An audit-store failure is logged and swallowed: the decision is
    /// already made and the pipeline must stay available for the next
    /// attempt.
    async fn persist(&self, ctx: &AttemptContext) {
        if let Err(e) = self.audit.append_attempt(ctx.to_attempt()).await {
            error!(attempt = %ctx.attempt_id, error = %e, "audit write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockRecognition, MockRecognizer};
    use chrono::Utc;
    use portcullis_channel::{ChannelConfig, CommandTransport, InProcessTransport};
    use portcullis_registry::{AuditStore, InMemoryRegistry, VehicleStore};
    use portcullis_types::{
        CommandEnvelope, EntryStatus, GateCommandKind, OwnerInfo, RegistryEntry,
        RegistryEntryId,
    };
    use tokio::sync::broadcast;

    struct Harness {
        pipeline: AccessPipeline,
        store: Arc<InMemoryRegistry>,
        transport: Arc<InProcessTransport>,
        control_rx: broadcast::Receiver<Vec<u8>>,
    }

    async fn harness(recognizer: MockRecognizer) -> Harness {
        harness_with_config(recognizer, PipelineConfig::default()).await
    }

    async fn harness_with_config(recognizer: MockRecognizer, config: PipelineConfig) -> Harness {
        let store = Arc::new(InMemoryRegistry::new());
        let transport = Arc::new(InProcessTransport::new());
        let channel_config = ChannelConfig::default();
        let control_rx = transport
            .subscribe(&channel_config.control_topic)
            .await
            .unwrap();
        let channel = Arc::new(
            GateChannel::connect(transport.clone(), channel_config)
                .await
                .unwrap(),
        );

        let pipeline = AccessPipeline::new(
            Arc::new(recognizer),
            AuthorizationResolver::new(store.clone()),
            channel,
            store.clone(),
            config,
        );

        Harness {
            pipeline,
            store,
            transport,
            control_rx,
        }
    }

    async fn register(store: &InMemoryRegistry, plate: &str, owner: &str) {
        store
            .upsert_entry(RegistryEntry {
                id: RegistryEntryId::new("1"),
                normalized_plate: plate.into(),
                owner: OwnerInfo {
                    name: owner.into(),
                    unit: "A-12".into(),
                },
                status: EntryStatus::Active,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
    }

    fn jpeg() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF]
    }

    #[tokio::test]
    async fn clear_plate_with_active_entry_opens_the_gate() {
        let mut h = harness(MockRecognizer::single("B 1234 XYZ", 0.95)).await;
        register(&h.store, "B1234XYZ", "Resident One").await;

        let decision = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap();

        assert!(decision.authorized);
        assert_eq!(decision.plate.as_deref(), Some("B1234XYZ"));
        assert_eq!(decision.confidence, Some(0.95));
        assert_eq!(decision.gate_action, GateAction::Opened);
        assert_eq!(decision.identity.unwrap().name, "Resident One");

        // Exactly one open command on the control topic.
        let envelope: CommandEnvelope =
            serde_json::from_slice(&h.control_rx.recv().await.unwrap()).unwrap();
        assert_eq!(envelope.command, GateCommandKind::Open);
        assert!(h.control_rx.try_recv().is_err());

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].authorized);
        assert_eq!(attempts[0].gate_action, GateAction::Opened);
        assert_eq!(attempts[0].terminal_stage, PipelineStage::Logged);
    }

    #[tokio::test]
    async fn unknown_plate_rejects_without_command() {
        let mut h = harness(MockRecognizer::single("B 1234 XYZ", 0.95)).await;

        let decision = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap();

        assert!(!decision.authorized);
        assert_eq!(decision.gate_action, GateAction::Rejected);
        assert_eq!(decision.rejection, Some(RejectionReason::NotAuthorized));
        assert!(h.control_rx.try_recv().is_err());

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].gate_action, GateAction::Rejected);
    }

    #[tokio::test]
    async fn recognition_outage_fails_attempt_but_still_audits() {
        let mut h = harness(MockRecognizer::new(MockRecognition::Unavailable)).await;

        let err = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap_err();

        assert_eq!(err.stage, PipelineStage::Recognizing);
        assert!(matches!(err.source, AccessError::ServiceUnavailable(_)));
        assert!(h.control_rx.try_recv().is_err());

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].terminal_stage, PipelineStage::Recognizing);
        assert_eq!(attempts[0].error_kind.as_deref(), Some("service_unavailable"));
        assert!(!attempts[0].authorized);
    }

    #[tokio::test]
    async fn channel_failure_preserves_the_grant() {
        let h = harness(MockRecognizer::single("B1234XYZ", 0.95)).await;
        register(&h.store, "B1234XYZ", "Resident One").await;

        // Authorization is decided before actuation; drop the transport.
        h.transport.shutdown();

        let decision = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap();

        assert!(decision.authorized);
        assert_eq!(decision.gate_action, GateAction::Error);

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert!(attempts[0].authorized);
        assert_eq!(attempts[0].gate_action, GateAction::Error);
        assert_eq!(
            attempts[0].error_kind.as_deref(),
            Some("service_unavailable")
        );
    }

    #[tokio::test]
    async fn zero_candidates_reject_with_no_plate_detected() {
        let mut h = harness(MockRecognizer::empty()).await;

        let decision = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap();

        assert!(!decision.authorized);
        assert_eq!(decision.rejection, Some(RejectionReason::NoPlateDetected));
        assert!(decision.plate.is_none());
        assert!(h.control_rx.try_recv().is_err());

        // The audit record is still written.
        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].input_plate.is_none());
    }

    #[tokio::test]
    async fn threshold_is_inclusive_at_the_boundary() {
        let h = harness(MockRecognizer::single("B1234XYZ", 0.80)).await;
        register(&h.store, "B1234XYZ", "Resident One").await;

        let decision = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap();
        assert!(decision.authorized);
    }

    #[tokio::test]
    async fn just_below_threshold_rejects_as_low_confidence() {
        let h = harness(MockRecognizer::single("B1234XYZ", 0.79999)).await;
        register(&h.store, "B1234XYZ", "Resident One").await;

        let decision = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap();

        assert!(!decision.authorized);
        assert_eq!(decision.rejection, Some(RejectionReason::LowConfidence));
    }

    #[tokio::test]
    async fn hung_recognition_terminates_as_timeout() {
        let config = PipelineConfig {
            recognition_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let h = harness_with_config(MockRecognizer::new(MockRecognition::Hang), config).await;

        let err = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap_err();

        assert_eq!(err.stage, PipelineStage::Recognizing);
        assert!(matches!(err.source, AccessError::Timeout(_)));

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts[0].error_kind.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn client_reported_timeout_fails_the_attempt() {
        // The client gave up on its own deadline; the caller-side guard
        // never fired.
        let h = harness(MockRecognizer::new(MockRecognition::TimedOut)).await;

        let err = h.pipeline.process(jpeg(), "capture.jpg").await.unwrap_err();

        assert_eq!(err.stage, PipelineStage::Recognizing);
        assert!(matches!(err.source, AccessError::Timeout(_)));

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].error_kind.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn concurrent_attempts_do_not_interfere() {
        let h = harness(MockRecognizer::single("B1234XYZ", 0.95)).await;
        register(&h.store, "B1234XYZ", "Resident One").await;
        let pipeline = Arc::new(h.pipeline);

        let a = tokio::spawn({
            let p = pipeline.clone();
            async move { p.process(jpeg(), "a.jpg").await }
        });
        let b = tokio::spawn({
            let p = pipeline.clone();
            async move { p.process(jpeg(), "b.jpg").await }
        });

        assert!(a.await.unwrap().unwrap().authorized);
        assert!(b.await.unwrap().unwrap().authorized);

        let attempts = h.store.list_attempts(10, 0).await.unwrap();
        assert_eq!(attempts.len(), 2);
    }
}
