//! Configuration for portcullis-daemon

use portcullis_channel::ChannelConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Recognition service configuration
    #[serde(default)]
    pub recognition: RecognitionConfig,

    /// Gate command channel configuration
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Pipeline deadlines
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            recognition: RecognitionConfig::default(),
            channel: ChannelConfig::default(),
            pipeline: PipelineSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Maximum request body size in bytes; captures are image uploads
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".parse().unwrap(),
            enable_cors: true,
            max_body_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Recognition service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Base URL of the plate recognition service
    #[serde(default = "default_recognition_endpoint")]
    pub endpoint: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_recognition_endpoint(),
        }
    }
}

/// Per-stage pipeline deadlines in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_recognition_timeout")]
    pub recognition_timeout_secs: u64,

    #[serde(default = "default_registry_timeout")]
    pub registry_timeout_secs: u64,

    #[serde(default = "default_actuation_timeout")]
    pub actuation_timeout_secs: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            recognition_timeout_secs: default_recognition_timeout(),
            registry_timeout_secs: default_registry_timeout(),
            actuation_timeout_secs: default_actuation_timeout(),
        }
    }
}

impl From<&PipelineSettings> for portcullis_pipeline::PipelineConfig {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            recognition_timeout: Duration::from_secs(settings.recognition_timeout_secs),
            registry_timeout: Duration::from_secs(settings.registry_timeout_secs),
            actuation_timeout: Duration::from_secs(settings.actuation_timeout_secs),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024
}

fn default_recognition_endpoint() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_recognition_timeout() -> u64 {
    35
}

fn default_registry_timeout() -> u64 {
    5
}

fn default_actuation_timeout() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with PORTCULLIS_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("PORTCULLIS")
                .separator("_")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
