//! Portcullis daemon - gate access service
//!
//! The daemon provides:
//! - Capture scanning through the access pipeline
//! - Visitor credential verification
//! - Vehicle and invitation management
//! - Manual gate control and the audit log read path

use anyhow::Context;
use clap::Parser;
use portcullis_daemon::config::DaemonConfig;
use portcullis_daemon::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Portcullis daemon CLI
#[derive(Parser)]
#[command(name = "portcullisd")]
#[command(about = "Portcullis daemon - gate access service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PORTCULLIS_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(
        short,
        long,
        env = "PORTCULLIS_LISTEN_ADDR",
        default_value = "127.0.0.1:8080"
    )]
    listen: String,

    /// Recognition service endpoint
    #[arg(short, long, env = "PORTCULLIS_RECOGNITION_ENDPOINT")]
    recognition: Option<String>,

    /// Log level
    #[arg(long, env = "PORTCULLIS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "PORTCULLIS_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let mut config =
        DaemonConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    config.server.listen_addr = cli
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {:?}", cli.listen))?;

    if let Some(endpoint) = cli.recognition {
        config.recognition.endpoint = endpoint;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        recognition = %config.recognition.endpoint,
        "starting portcullis daemon"
    );

    // Create and run server
    let server = Server::new(config).await?;
    server.run().await?;
    Ok(())
}
