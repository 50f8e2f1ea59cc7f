//! Graceful shutdown signal shared between the server loop and in-flight
//! publishes.
//!
//! One `CancellationToken` serves both purposes: axum's graceful shutdown
//! future waits on it, and the webhook handler threads it into the
//! publisher so a drain aborts in-flight sends and retry backoff waits
//! instead of waiting them out.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::info;

/// Server lifecycle state, as reported by health probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Initializing; not yet accepting requests.
    Starting,
    /// Accepting requests.
    Ready,
    /// Shutdown triggered; no new requests should be routed here.
    Draining,
}

impl LifecycleState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
        }
    }
}

/// Shutdown signal with lifecycle state for health probes.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
    ready: AtomicBool,
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the server as accepting requests.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Trips the signal. Idempotent.
    pub fn trigger(&self) {
        self.token.cancel();
    }

    /// A clone of the underlying token, for threading into in-flight work.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Resolves once the signal has been tripped.
    pub async fn triggered(&self) {
        self.token.cancelled().await;
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        if self.token.is_cancelled() {
            LifecycleState::Draining
        } else if self.ready.load(Ordering::Acquire) {
            LifecycleState::Ready
        } else {
            LifecycleState::Starting
        }
    }
}

/// Resolves when the process receives SIGINT or, on unix, SIGTERM.
pub async fn termination_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(signal) => signal,
            Err(_) => {
                ctrl_c.await;
                info!("interrupt received, shutting down");
                return;
            }
        };
        tokio::select! {
            () = ctrl_c => info!("interrupt received, shutting down"),
            _ = sigterm.recv() => info!("SIGTERM received, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("interrupt received, shutting down");
    }
}
