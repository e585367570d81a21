//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use portcullis_channel::{GateChannel, InProcessTransport};
use portcullis_invitation::InvitationVerifier;
use portcullis_pipeline::{AccessPipeline, PipelineConfig};
use portcullis_recognition::RecognitionClient;
use portcullis_registry::{AuthorizationResolver, InMemoryRegistry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Portcullis daemon server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    /// Wire up collaborators and build the shared state.
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        let registry = Arc::new(InMemoryRegistry::new());

        let recognition = Arc::new(
            RecognitionClient::new(&config.recognition.endpoint)
                .map_err(|e| DaemonError::Config(e.to_string()))?,
        );

        let transport = Arc::new(InProcessTransport::new());
        let channel = Arc::new(
            GateChannel::connect(transport, config.channel.clone())
                .await
                .map_err(|e| DaemonError::Channel(e.to_string()))?,
        );

        spawn_capture_listener(channel.clone()).await?;

        let pipeline = Arc::new(AccessPipeline::new(
            recognition.clone(),
            AuthorizationResolver::new(registry.clone()),
            channel.clone(),
            registry.clone(),
            PipelineConfig::from(&config.pipeline),
        ));

        let verifier = Arc::new(InvitationVerifier::new(registry.clone()));

        let state = AppState::new(pipeline, registry, verifier, recognition, channel);

        Ok(Self { config, state })
    }

    /// Shared state, exposed for integration tests.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the server until shutdown.
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let app = create_router(
            self.state,
            self.config.server.max_body_size,
            self.config.server.enable_cors,
        );

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("portcullis daemon listening on {}", addr);
        tracing::info!(
            "recognition service at {}",
            self.config.recognition.endpoint
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("portcullis daemon shutting down");

        Ok(())
    }
}

/// Listen for inbound capture requests from edge devices.
///
/// A lagged receiver is re-established through the channel's reconnect path,
/// keeping the same connection identity.
async fn spawn_capture_listener(channel: Arc<GateChannel>) -> DaemonResult<()> {
    let mut rx = channel
        .capture_requests()
        .await
        .map_err(|e| DaemonError::Channel(e.to_string()))?;

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(payload) => {
                    tracing::debug!(bytes = payload.len(), "capture request received");
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "capture stream lagged, resubscribing");
                    match channel.reconnect().await {
                        Ok(fresh) => rx = fresh,
                        Err(e) => {
                            tracing::error!(error = %e, "capture resubscription failed");
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
