//! Webhook ingestion endpoint.
//!
//! Thin axum adapter over [`WebhookHandler`]: extracts the correlation id
//! and transfer encoding from headers, builds the invocation record, and
//! threads the server's shutdown token through as the invocation's
//! cancellation signal.

use axum::extract::State;
use axum::http::HeaderMap;

use super::AppState;
use crate::relay::{WebhookRequest, WebhookResponse};

/// Correlation-id header, populated by the request-id middleware.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Header marking the body as base64-encoded. Triggers that wrap bodies
/// (e.g. API gateways) set `content-transfer-encoding: base64`.
const TRANSFER_ENCODING_HEADER: &str = "content-transfer-encoding";

/// Handles `POST /webhook/events`.
pub async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> WebhookResponse {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    let is_base64_encoded = headers
        .get(TRANSFER_ENCODING_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("base64"));

    let request = WebhookRequest {
        request_id,
        body,
        is_base64_encoded,
    };

    let cancel = state.shutdown.token();
    state.handler.handle(&cancel, request).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use axum::http::{HeaderValue, StatusCode};
    use base64::Engine as _;
    use relay_core::JsonEventProcessor;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::network::shutdown::ShutdownSignal;
    use crate::relay::publisher::EventPublisher;
    use crate::relay::{TracingLogger, WebhookHandler};

    const VALID_BODY: &str = r#"{"event_id":"evt-9","event_type":"product.created","timestamp":"2024-10-01T10:00:00Z","author":"bob","data":{}}"#;

    struct NoopPublisher;

    #[async_trait::async_trait]
    impl EventPublisher for NoopPublisher {
        async fn publish(
            &self,
            _cancel: &CancellationToken,
            _event: &relay_core::Event,
        ) -> Result<(), relay_core::RelayError> {
            Ok(())
        }
    }

    fn test_state() -> AppState {
        AppState {
            handler: Arc::new(WebhookHandler::new(
                Arc::new(JsonEventProcessor),
                Arc::new(NoopPublisher),
                Arc::new(TracingLogger::new()),
            )),
            shutdown: Arc::new(ShutdownSignal::new()),
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn accepts_a_plain_json_body() {
        let response = webhook_handler(
            State(test_state()),
            HeaderMap::new(),
            VALID_BODY.to_string(),
        )
        .await;

        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert_eq!(response.body["event_id"], "evt-9");
    }

    #[tokio::test]
    async fn honors_the_base64_transfer_encoding_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            TRANSFER_ENCODING_HEADER,
            HeaderValue::from_static("base64"),
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(VALID_BODY);

        let response = webhook_handler(State(test_state()), headers, encoded).await;

        assert_eq!(response.status, StatusCode::ACCEPTED);
        assert_eq!(response.body["event_id"], "evt-9");
    }

    #[tokio::test]
    async fn plain_body_is_not_decoded_without_the_header() {
        // A base64 body without the header is parsed as-is and fails.
        let encoded = base64::engine::general_purpose::STANDARD.encode(VALID_BODY);

        let response = webhook_handler(State(test_state()), HeaderMap::new(), encoded).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["error_code"], "INVALID_PAYLOAD");
    }

    #[tokio::test]
    async fn empty_body_is_a_bad_request() {
        let response =
            webhook_handler(State(test_state()), HeaderMap::new(), String::new()).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.body["details"], "request body is empty");
    }
}
