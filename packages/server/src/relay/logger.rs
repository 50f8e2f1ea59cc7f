//! Structured logging for the relay pipeline.
//!
//! The process-wide subscriber is installed once at startup ([`init`]) and
//! is immutable afterwards; level filtering happens there. `RelayLogger`
//! is the capability the pipeline components hold: leveled emission plus
//! read-only derivation of a per-invocation logger bound to a correlation
//! identifier. It is a trait so tests can substitute a recording double.

use std::fmt::Display;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

/// Level name applied when `LOG_LEVEL` is unset or unparseable.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Free-form structured fields attached to a log line.
pub type LogFields = serde_json::Map<String, serde_json::Value>;

/// Leveled structured-logging capability, injected at construction and
/// never reached through a global.
pub trait RelayLogger: Send + Sync {
    fn debug(&self, message: &str, fields: Option<&LogFields>);
    fn info(&self, message: &str, fields: Option<&LogFields>);
    fn error(&self, message: &str, error: &dyn Display, fields: Option<&LogFields>);

    /// Derives a logger bound to the given correlation identifier.
    ///
    /// Copy-on-specialize: the receiver is left untouched, so concurrent
    /// invocations never observe each other's correlation id.
    fn with_correlation_id(&self, correlation_id: &str) -> Arc<dyn RelayLogger>;
}

/// Production [`RelayLogger`] that emits `tracing` events.
///
/// One self-contained JSON line per emission (timestamp, level, message,
/// correlation id, error text, fields) once [`init`] has installed the
/// JSON subscriber.
#[derive(Debug, Default, Clone)]
pub struct TracingLogger {
    correlation_id: Option<String>,
}

impl TracingLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The correlation identifier this logger is bound to, if any.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Copy of this logger bound to a correlation identifier.
    #[must_use]
    pub fn bind(&self, correlation_id: &str) -> Self {
        Self {
            correlation_id: Some(correlation_id.to_string()),
        }
    }

    fn render_fields(fields: Option<&LogFields>) -> Option<String> {
        fields.map(|map| serde_json::Value::Object(map.clone()).to_string())
    }
}

impl RelayLogger for TracingLogger {
    fn debug(&self, message: &str, fields: Option<&LogFields>) {
        tracing::debug!(
            correlation_id = self.correlation_id.as_deref(),
            fields = Self::render_fields(fields).as_deref(),
            "{message}"
        );
    }

    fn info(&self, message: &str, fields: Option<&LogFields>) {
        tracing::info!(
            correlation_id = self.correlation_id.as_deref(),
            fields = Self::render_fields(fields).as_deref(),
            "{message}"
        );
    }

    fn error(&self, message: &str, error: &dyn Display, fields: Option<&LogFields>) {
        tracing::error!(
            correlation_id = self.correlation_id.as_deref(),
            error = %error,
            fields = Self::render_fields(fields).as_deref(),
            "{message}"
        );
    }

    fn with_correlation_id(&self, correlation_id: &str) -> Arc<dyn RelayLogger> {
        Arc::new(self.bind(correlation_id))
    }
}

/// Builds the level filter from a configured level name, falling back to
/// [`DEFAULT_LOG_LEVEL`] when the name is not a valid filter directive.
#[must_use]
pub fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the process-wide JSON subscriber.
///
/// Called once from the bootstrap; the configuration is immutable after
/// this returns.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(level_filter(level))
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_binds_correlation_id() {
        let base = TracingLogger::new();
        assert!(base.correlation_id().is_none());

        let derived = base.bind("req-42");
        assert_eq!(derived.correlation_id(), Some("req-42"));
    }

    #[test]
    fn derivation_does_not_mutate_the_parent() {
        let base = TracingLogger::new();
        let _derived = base.with_correlation_id("req-1");
        let _other = base.with_correlation_id("req-2");
        assert!(base.correlation_id().is_none());
    }

    #[test]
    fn rebinding_replaces_the_previous_id() {
        let first = TracingLogger::new().bind("req-1");
        let second = first.bind("req-2");
        assert_eq!(first.correlation_id(), Some("req-1"));
        assert_eq!(second.correlation_id(), Some("req-2"));
    }

    #[test]
    fn level_filter_accepts_valid_directives() {
        assert_eq!(level_filter("debug").to_string(), "debug");
        assert_eq!(level_filter("error").to_string(), "error");
    }

    #[test]
    fn level_filter_falls_back_to_info() {
        assert_eq!(level_filter("not a level !!").to_string(), DEFAULT_LOG_LEVEL);
    }

    /// Writer that captures emitted lines so tests can assert on them.
    #[derive(Clone, Default)]
    struct CaptureWriter(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn emission_below_the_minimum_level_is_suppressed() {
        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_env_filter(level_filter("info"))
            .with_writer(writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let logger = TracingLogger::new().bind("req-9");
            logger.debug("debug line", None);
            logger.info("info line", None);
            logger.error("error line", &"boom", None);
        });

        let output = writer.contents();
        assert!(!output.contains("debug line"));
        assert!(output.contains("info line"));
        assert!(output.contains("error line"));
        assert!(output.contains("req-9"));
    }

    #[test]
    fn emission_with_fields_does_not_panic_without_subscriber() {
        let logger = TracingLogger::new();
        let mut fields = LogFields::new();
        fields.insert("event_id".to_string(), serde_json::json!("evt-1"));
        logger.debug("debug line", Some(&fields));
        logger.info("info line", Some(&fields));
        logger.error("error line", &"boom", Some(&fields));
    }
}
