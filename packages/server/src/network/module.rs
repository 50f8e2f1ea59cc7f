//! Network module with deferred startup lifecycle.
//!
//! Follows the deferred startup pattern: `new()` creates shared state,
//! `start()` binds the TCP listener, and `serve()` accepts connections
//! until the shutdown signal trips. The split lets the bootstrap wire the
//! relay pipeline between `start()` and `serve()` and lets tests bind an
//! ephemeral port without serving.

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::relay::WebhookHandler;

use super::config::NetworkConfig;
use super::handlers::{
    health_handler, liveness_handler, readiness_handler, webhook_handler, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownSignal;

/// Manages the HTTP server lifecycle.
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    shutdown: Arc<ShutdownSignal>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    ///
    /// The shutdown signal is allocated immediately so the bootstrap can
    /// wire it to process signals before the server starts.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
            shutdown: Arc::new(ShutdownSignal::new()),
        }
    }

    /// Shared handle to the shutdown signal.
    #[must_use]
    pub fn shutdown_signal(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `POST /webhook/events` -- webhook ingestion
    /// - `GET /health` -- state/uptime JSON
    /// - `GET /health/live` -- liveness probe
    /// - `GET /health/ready` -- readiness probe
    #[must_use]
    pub fn build_router(&self, handler: Arc<WebhookHandler>) -> Router {
        let state = AppState {
            handler,
            shutdown: Arc::clone(&self.shutdown),
            start_time: Instant::now(),
        };

        let layers = build_http_layers(&self.config);

        Router::new()
            .route("/webhook/events", post(webhook_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .layer(layers)
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves connections until the shutdown signal trips, then drains
    /// in-flight requests gracefully. The same signal cancels in-flight
    /// publish work, so a drain never waits out a send or sleeps through
    /// a retry.
    ///
    /// Consumes `self` because the listener is moved into the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(self, handler: Arc<WebhookHandler>) -> anyhow::Result<()> {
        let router = self.build_router(handler);
        let shutdown = Arc::clone(&self.shutdown);
        let listener = self
            .listener
            .expect("start() must be called before serve()");

        shutdown.set_ready();

        let drain = {
            let shutdown = Arc::clone(&shutdown);
            async move { shutdown.triggered().await }
        };

        axum::serve(listener, router)
            .with_graceful_shutdown(drain)
            .await?;

        info!("server drained and stopped");
        Ok(())
    }
}
