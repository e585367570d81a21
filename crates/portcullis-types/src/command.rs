//! Gate commands and their wire envelope
//!
//! Commands are transient: the audit trail substitutes for a command log, so
//! nothing here is persisted. The channel owns a command only for the
//! duration of transmission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::CorrelationId;

/// Auto-close duration carried by every `open` command, in milliseconds.
pub const DEFAULT_OPEN_DURATION_MS: u64 = 5000;

/// The actions the physical actuator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateCommandKind {
    #[serde(rename = "OPEN_GATE")]
    Open,
    #[serde(rename = "CLOSE_GATE")]
    Close,
    #[serde(rename = "CAPTURE_IMAGE")]
    Capture,
}

impl std::fmt::Display for GateCommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GateCommandKind::Open => "OPEN_GATE",
            GateCommandKind::Close => "CLOSE_GATE",
            GateCommandKind::Capture => "CAPTURE_IMAGE",
        };
        f.write_str(s)
    }
}

/// A command intended to move the physical gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCommand {
    /// What the actuator should do
    pub action: GateCommandKind,

    /// Auto-close window for `Open`; always present for opens, never for
    /// closes
    pub duration_ms: Option<u64>,

    /// Ties the command to the attempt that issued it
    pub correlation_id: CorrelationId,

    /// When the command was handed to the channel
    pub issued_at: DateTime<Utc>,
}

impl GateCommand {
    /// An open command with the default auto-close window.
    pub fn open(correlation_id: CorrelationId) -> Self {
        Self::open_for(correlation_id, DEFAULT_OPEN_DURATION_MS)
    }

    pub fn open_for(correlation_id: CorrelationId, duration_ms: u64) -> Self {
        Self {
            action: GateCommandKind::Open,
            duration_ms: Some(duration_ms),
            correlation_id,
            issued_at: Utc::now(),
        }
    }

    pub fn close(correlation_id: CorrelationId) -> Self {
        Self {
            action: GateCommandKind::Close,
            duration_ms: None,
            correlation_id,
            issued_at: Utc::now(),
        }
    }

    pub fn capture(correlation_id: CorrelationId) -> Self {
        Self {
            action: GateCommandKind::Capture,
            duration_ms: None,
            correlation_id,
            issued_at: Utc::now(),
        }
    }
}

/// JSON envelope published on the control topic.
///
/// `{ "command": "OPEN_GATE", "data": {...}, "timestamp": epoch_ms }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Command name as the actuator firmware expects it
    pub command: GateCommandKind,

    /// Command-specific payload
    pub data: serde_json::Value,

    /// Epoch milliseconds at publish time
    pub timestamp: i64,
}

impl CommandEnvelope {
    /// Wrap a command for transmission.
    pub fn from_command(cmd: &GateCommand) -> Self {
        let mut data = serde_json::Map::new();
        if let Some(duration) = cmd.duration_ms {
            data.insert("duration".into(), duration.into());
        }
        data.insert(
            "correlation_id".into(),
            cmd.correlation_id.as_str().into(),
        );

        Self {
            command: cmd.action,
            data: serde_json::Value::Object(data),
            timestamp: cmd.issued_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_carries_default_duration() {
        let cmd = GateCommand::open(CorrelationId::generate());
        assert_eq!(cmd.action, GateCommandKind::Open);
        assert_eq!(cmd.duration_ms, Some(5000));
    }

    #[test]
    fn close_carries_no_duration() {
        let cmd = GateCommand::close(CorrelationId::generate());
        assert_eq!(cmd.duration_ms, None);
    }

    #[test]
    fn envelope_matches_wire_format() {
        let correlation = CorrelationId::new("attempt-1");
        let envelope = CommandEnvelope::from_command(&GateCommand::open(correlation));
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["command"], "OPEN_GATE");
        assert_eq!(json["data"]["duration"], 5000);
        assert_eq!(json["data"]["correlation_id"], "attempt-1");
        assert!(json["timestamp"].is_i64());
    }

    #[test]
    fn command_kind_serializes_to_firmware_names() {
        assert_eq!(
            serde_json::to_value(GateCommandKind::Capture).unwrap(),
            "CAPTURE_IMAGE"
        );
        assert_eq!(
            serde_json::to_value(GateCommandKind::Close).unwrap(),
            "CLOSE_GATE"
        );
    }
}
