//! HTTP handler definitions for the relay server.
//!
//! Defines `AppState` (the shared state carried through axum extractors)
//! and re-exports the handler functions used when building the router.

pub mod health;
pub mod webhook;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use webhook::webhook_handler;

use std::sync::Arc;
use std::time::Instant;

use crate::network::shutdown::ShutdownSignal;
use crate::relay::WebhookHandler;

/// Shared application state passed to all axum handlers via `State`
/// extraction. Holds `Arc` references so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The invocation handler orchestrating the relay pipeline.
    pub handler: Arc<WebhookHandler>,
    /// Shutdown signal; also the cancellation source for in-flight publishes.
    pub shutdown: Arc<ShutdownSignal>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}
