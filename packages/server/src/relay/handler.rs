//! Invocation handler: orchestrates one webhook delivery through
//! decode -> parse -> validate -> publish and maps the outcome to the
//! response contract.
//!
//! Each stage failure short-circuits with its already-classified
//! [`RelayError`]; the handler performs no re-interpretation, only the
//! mapping to a status code and JSON body, logging at every decision
//! point with as much event context as is known.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use relay_core::{decode_body, EventProcessor, RelayError};

use super::logger::{LogFields, RelayLogger};
use super::publisher::EventPublisher;

/// One inbound invocation from the hosting trigger.
#[derive(Debug, Clone)]
pub struct WebhookRequest {
    /// Per-invocation correlation identifier, when the trigger supplies one.
    pub request_id: Option<String>,
    /// Raw body string, possibly base64-encoded.
    pub body: String,
    /// Whether `body` must be base64-decoded before parsing.
    pub is_base64_encoded: bool,
}

/// HTTP-style outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl WebhookResponse {
    /// 202 response acknowledging the relayed event.
    #[must_use]
    pub fn accepted(event_id: &str) -> Self {
        Self {
            status: StatusCode::ACCEPTED,
            body: json!({
                "status": "accepted",
                "event_id": event_id,
            }),
        }
    }

    /// Error response for a classified failure. The status is fixed by the
    /// error's variant; `details` is omitted when empty.
    #[must_use]
    pub fn failure(error: &RelayError) -> Self {
        let mut body = json!({
            "error_code": error.code(),
            "message": error.message(),
        });
        if !error.details().is_empty() {
            body["details"] = json!(error.details());
        }
        Self {
            status: response_status(error),
            body,
        }
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Status mapping for the error taxonomy. Client-caused failures map to
/// 400, exhausted publishes to 500, and cancellation to 503 so the PIM
/// redelivers to a healthy instance.
fn response_status(error: &RelayError) -> StatusCode {
    match error {
        RelayError::InvalidPayload { .. } | RelayError::MissingField { .. } => {
            StatusCode::BAD_REQUEST
        }
        RelayError::PublishFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        RelayError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Orchestrates the relay pipeline for each invocation.
///
/// All three capabilities are injected at construction so tests can
/// substitute deterministic doubles.
pub struct WebhookHandler {
    processor: Arc<dyn EventProcessor>,
    publisher: Arc<dyn EventPublisher>,
    logger: Arc<dyn RelayLogger>,
}

impl WebhookHandler {
    #[must_use]
    pub fn new(
        processor: Arc<dyn EventProcessor>,
        publisher: Arc<dyn EventPublisher>,
        logger: Arc<dyn RelayLogger>,
    ) -> Self {
        Self {
            processor,
            publisher,
            logger,
        }
    }

    /// Handles one invocation to completion.
    ///
    /// `cancel` is the invocation's cancellation signal; it is observed
    /// throughout the publish phase, both while a send is in flight and
    /// during backoff waits.
    pub async fn handle(
        &self,
        cancel: &CancellationToken,
        request: WebhookRequest,
    ) -> WebhookResponse {
        let logger = match request.request_id.as_deref() {
            Some(id) => self.logger.with_correlation_id(id),
            None => Arc::clone(&self.logger),
        };

        let payload = match decode_body(&request.body, request.is_base64_encoded) {
            Ok(payload) => payload,
            Err(err) => {
                logger.error("failed to decode request body", &err, None);
                return WebhookResponse::failure(&err);
            }
        };

        // Reported here rather than in the parser so the caller sees a
        // clear message instead of a JSON syntax error on empty input.
        if payload.is_empty() {
            let err = RelayError::invalid_payload("request body is empty");
            logger.error("empty request body", &err, None);
            return WebhookResponse::failure(&err);
        }

        let event = match self.processor.parse(&payload) {
            Ok(event) => event,
            Err(err) => {
                logger.error("failed to parse payload", &err, None);
                return WebhookResponse::failure(&err);
            }
        };

        if let Err(err) = self.processor.validate(&event) {
            logger.error(
                "payload validation failed",
                &err,
                Some(&fields(&[("event_id", event.event_id.as_str())])),
            );
            return WebhookResponse::failure(&err);
        }

        if let Err(err) = self.publisher.publish(cancel, &event).await {
            let context = fields(&[
                ("event_id", event.event_id.as_str()),
                ("event_type", event.event_type.as_str()),
            ]);
            let message = match err {
                RelayError::Cancelled { .. } => "publish cancelled",
                _ => "failed to publish event",
            };
            logger.error(message, &err, Some(&context));
            return WebhookResponse::failure(&err);
        }

        logger.info(
            "event published",
            Some(&fields(&[
                ("event_id", event.event_id.as_str()),
                ("event_type", event.event_type.as_str()),
            ])),
        );

        WebhookResponse::accepted(&event.event_id)
    }
}

fn fields(pairs: &[(&str, &str)]) -> LogFields {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), json!(value)))
        .collect()
}
