//! Gate actuation channel

use std::sync::Arc;

use chrono::{DateTime, Utc};
use portcullis_types::{CommandEnvelope, CorrelationId, GateCommand};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::ChannelError;
use crate::transport::CommandTransport;

/// Topics and identity for the channel connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Topic commands are published on
    pub control_topic: String,

    /// Topic inbound capture requests arrive on
    pub capture_topic: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            control_topic: "portcullis/gate/control".into(),
            capture_topic: "portcullis/gate/capture".into(),
        }
    }
}

/// Transport-level acknowledgment.
///
/// Means the command was handed to the transport, nothing more: at-most-once
/// delivery, no confirmation the gate physically moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// When the hand-off happened
    pub published_at: DateTime<Utc>,
}

/// Command channel to the physical gate actuator.
///
/// Owns the connection lifecycle: one long-lived identity, re-subscribing
/// the capture topic on (re)connect. Safe for concurrent callers; two
/// overlapping `open` commands are acceptable and idempotent in effect, so
/// nothing here serializes them.
pub struct GateChannel {
    transport: Arc<dyn CommandTransport>,
    config: ChannelConfig,
    client_id: String,
}

impl GateChannel {
    /// Connect to the command channel and subscribe the capture topic.
    pub async fn connect(
        transport: Arc<dyn CommandTransport>,
        config: ChannelConfig,
    ) -> Result<Self, ChannelError> {
        let client_id = format!("portcullis-server-{}", Utc::now().timestamp_millis());

        // Subscription at connect time mirrors what a reconnect must redo.
        let _ = transport.subscribe(&config.capture_topic).await?;
        info!(client_id = %client_id, capture_topic = %config.capture_topic, "channel connected");

        Ok(Self {
            transport,
            config,
            client_id,
        })
    }

    /// The connection identity this channel publishes under.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Re-establish the capture subscription after a transport drop.
    ///
    /// Keeps the same identity; the returned receiver replaces any receiver
    /// obtained before the drop.
    pub async fn reconnect(&self) -> Result<broadcast::Receiver<Vec<u8>>, ChannelError> {
        let rx = self.transport.subscribe(&self.config.capture_topic).await?;
        info!(client_id = %self.client_id, "channel resubscribed after reconnect");
        Ok(rx)
    }

    /// Publish a command to the control topic. Fire-and-forget: the `Ack`
    /// covers hand-off to the transport only.
    pub async fn send(&self, command: GateCommand) -> Result<Ack, ChannelError> {
        let envelope = CommandEnvelope::from_command(&command);
        let payload = serde_json::to_vec(&envelope)?;

        self.transport
            .publish(&self.config.control_topic, payload)
            .await?;

        debug!(
            command = %command.action,
            correlation = %command.correlation_id,
            "command handed to transport"
        );

        Ok(Ack {
            published_at: Utc::now(),
        })
    }

    /// Open the gate with the default auto-close window.
    pub async fn open_gate(&self, correlation_id: CorrelationId) -> Result<Ack, ChannelError> {
        self.send(GateCommand::open(correlation_id)).await
    }

    /// Open the gate with an explicit auto-close window.
    pub async fn open_gate_for(
        &self,
        correlation_id: CorrelationId,
        duration_ms: u64,
    ) -> Result<Ack, ChannelError> {
        self.send(GateCommand::open_for(correlation_id, duration_ms))
            .await
    }

    /// Close the gate immediately.
    pub async fn close_gate(&self, correlation_id: CorrelationId) -> Result<Ack, ChannelError> {
        self.send(GateCommand::close(correlation_id)).await
    }

    /// Ask the edge device for a fresh capture.
    pub async fn request_capture(
        &self,
        correlation_id: CorrelationId,
    ) -> Result<Ack, ChannelError> {
        self.send(GateCommand::capture(correlation_id)).await
    }

    /// Subscribe to inbound capture-request events.
    pub async fn capture_requests(
        &self,
    ) -> Result<broadcast::Receiver<Vec<u8>>, ChannelError> {
        self.transport.subscribe(&self.config.capture_topic).await
    }
}
