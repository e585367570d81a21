//! Application state for API handlers

use portcullis_channel::GateChannel;
use portcullis_invitation::InvitationVerifier;
use portcullis_pipeline::AccessPipeline;
use portcullis_recognition::RecognitionClient;
use portcullis_registry::RegistryStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The access pipeline
    pub pipeline: Arc<AccessPipeline>,

    /// Registry backend shared with the pipeline
    pub registry: Arc<dyn RegistryStore>,

    /// Visitor credential verifier
    pub verifier: Arc<InvitationVerifier>,

    /// Recognition service client, for the health proxy
    pub recognition: Arc<RecognitionClient>,

    /// Gate command channel, for manual control
    pub channel: Arc<GateChannel>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<AccessPipeline>,
        registry: Arc<dyn RegistryStore>,
        verifier: Arc<InvitationVerifier>,
        recognition: Arc<RecognitionClient>,
        channel: Arc<GateChannel>,
    ) -> Self {
        Self {
            pipeline,
            registry,
            verifier,
            recognition,
            channel,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
