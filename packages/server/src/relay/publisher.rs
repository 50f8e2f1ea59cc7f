//! SNS publisher with a bounded retry policy and cancellation awareness.
//!
//! `TopicPublisher` wraps a validated event in an [`Envelope`], serializes
//! it once, and hands it to a [`TopicClient`] for transmission. Transport
//! failures are retried on a fixed two-step backoff schedule; envelope
//! serialization failures are programming defects and fail fast. Both
//! blocking points observe the invocation's cancellation token: each
//! in-flight send is raced against it, and between attempts the publisher
//! waits on whichever fires first, the backoff timer or the token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use relay_core::{Envelope, Event, RelayError};

/// Total publish attempts per invocation, including the first.
pub const MAX_PUBLISH_ATTEMPTS: u32 = 3;

/// Delays applied between attempts 1->2 and 2->3. A literal two-entry
/// schedule, not a formula, so attempt timing stays reproducible in tests.
pub const BACKOFF_SCHEDULE: [Duration; 2] = [Duration::from_secs(1), Duration::from_secs(2)];

/// A serialized envelope ready for the message bus, with its routing
/// attributes. Attribute values mirror the event's corresponding fields
/// and are string-typed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// UTF-8 JSON serialization of the [`Envelope`].
    pub body: String,
    /// Routing attributes: `event_type`, `timestamp`, `event_id`.
    pub attributes: Vec<(&'static str, String)>,
}

/// Transport seam to the message bus. The production implementation is
/// [`SnsTopicClient`]; tests substitute a scripted stub.
#[async_trait]
pub trait TopicClient: Send + Sync {
    /// Transmits one message to the configured topic.
    ///
    /// # Errors
    ///
    /// Returns the underlying transport error; the caller decides whether
    /// to retry.
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()>;
}

/// Publishing capability injected into the invocation handler.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Envelopes and publishes a validated event.
    ///
    /// The event has already passed validation; `event_id`, `event_type`,
    /// and `timestamp` are non-blank and are not re-checked here.
    ///
    /// # Errors
    ///
    /// - [`RelayError::PublishFailed`] when every attempt failed (details
    ///   carry the last transport error) or when envelope serialization
    ///   itself failed (non-retried).
    /// - [`RelayError::Cancelled`] when the cancellation token fired
    ///   while a send was in flight or during a backoff wait.
    async fn publish(&self, cancel: &CancellationToken, event: &Event) -> Result<(), RelayError>;
}

/// Production [`EventPublisher`] over a [`TopicClient`].
pub struct TopicPublisher {
    client: Arc<dyn TopicClient>,
}

impl TopicPublisher {
    #[must_use]
    pub fn new(client: Arc<dyn TopicClient>) -> Self {
        Self { client }
    }

    fn build_message(event: &Event) -> Result<OutboundMessage, RelayError> {
        let received_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let envelope = Envelope::wrap(event.clone(), received_at);

        let body = serde_json::to_string(&envelope).map_err(|err| {
            RelayError::publish_failed(format!("failed to serialize envelope: {err}"))
        })?;

        Ok(OutboundMessage {
            body,
            attributes: vec![
                ("event_type", event.event_type.clone()),
                ("timestamp", event.timestamp.clone()),
                ("event_id", event.event_id.clone()),
            ],
        })
    }
}

#[async_trait]
impl EventPublisher for TopicPublisher {
    async fn publish(&self, cancel: &CancellationToken, event: &Event) -> Result<(), RelayError> {
        // Built and serialized once per call; every attempt sends the same
        // bytes. A serialization error is a defect, not a transient fault.
        let message = Self::build_message(event)?;

        let mut last_err: Option<anyhow::Error> = None;

        for attempt in 1..=MAX_PUBLISH_ATTEMPTS {
            // Biased so an already-cancelled token aborts before the send
            // is started, and a token cancelled mid-send abandons it.
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    return Err(RelayError::cancelled(format!(
                        "cancelled during publish attempt {attempt}"
                    )));
                }
                outcome = self.client.send(&message) => outcome,
            };

            match outcome {
                Ok(()) => {
                    debug!(
                        event_id = %event.event_id,
                        event_type = %event.event_type,
                        attempt,
                        "event published to topic"
                    );
                    return Ok(());
                }
                Err(err) => {
                    warn!(
                        event_id = %event.event_id,
                        event_type = %event.event_type,
                        attempt,
                        error = %err,
                        "publish attempt failed"
                    );
                    last_err = Some(err);
                }
            }

            // No wait after the final attempt.
            if let Some(delay) = BACKOFF_SCHEDULE.get(attempt as usize - 1) {
                tokio::select! {
                    () = cancel.cancelled() => {
                        return Err(RelayError::cancelled(format!(
                            "cancelled during retry backoff after attempt {attempt}"
                        )));
                    }
                    () = tokio::time::sleep(*delay) => {}
                }
            }
        }

        let last = last_err.map_or_else(String::new, |err| err.to_string());
        Err(RelayError::publish_failed(format!(
            "after {MAX_PUBLISH_ATTEMPTS} attempts: {last}"
        )))
    }
}

/// [`TopicClient`] backed by the AWS SNS SDK.
pub struct SnsTopicClient {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsTopicClient {
    #[must_use]
    pub fn new(client: aws_sdk_sns::Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl TopicClient for SnsTopicClient {
    async fn send(&self, message: &OutboundMessage) -> anyhow::Result<()> {
        let mut request = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .message(&message.body);

        for (name, value) in &message.attributes {
            let attribute = aws_sdk_sns::types::MessageAttributeValue::builder()
                .data_type("String")
                .string_value(value)
                .build()
                .map_err(|err| anyhow::anyhow!("invalid message attribute {name}: {err}"))?;
            request = request.message_attributes(*name, attribute);
        }

        request.send().await.map_err(|err| {
            anyhow::anyhow!("{}", aws_sdk_sns::error::DisplayErrorContext(&err))
        })?;

        Ok(())
    }
}
