//! Payload decoding, parsing, and validation.
//!
//! The three leaf stages of the relay pipeline. Decode normalizes the raw
//! invocation body into bytes; parse deserializes bytes into an [`Event`];
//! validate enforces the required-field invariants. Parsing and validation
//! are deliberately separate so callers can tell "not even parseable"
//! apart from "parseable but incomplete".

use base64::Engine as _;

use crate::error::RelayError;
use crate::event::Event;

/// Fields an event must carry to be relayed, in the order they are
/// reported when missing.
const REQUIRED_FIELDS: [&str; 3] = ["event_id", "event_type", "timestamp"];

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Normalizes a raw invocation body into bytes.
///
/// A non-encoded body passes through byte-for-byte. An encoded body is
/// decoded as standard base64. An empty result is not an error here;
/// the invocation handler reports emptiness before parsing so the caller
/// sees a clear message instead of a confusing parse failure.
///
/// # Errors
///
/// Returns [`RelayError::InvalidPayload`] when `is_encoded` is set and the
/// body is not valid standard base64.
pub fn decode_body(body: &str, is_encoded: bool) -> Result<Vec<u8>, RelayError> {
    if !is_encoded {
        return Ok(body.as_bytes().to_vec());
    }

    base64::engine::general_purpose::STANDARD
        .decode(body)
        .map_err(|err| RelayError::invalid_payload(err.to_string()))
}

// ---------------------------------------------------------------------------
// EventProcessor
// ---------------------------------------------------------------------------

/// Parsing and validation capability, injected into the invocation handler
/// so tests can substitute deterministic behavior.
pub trait EventProcessor: Send + Sync {
    /// Deserializes payload bytes into an [`Event`].
    ///
    /// Unknown fields are ignored; missing fields default (empty string /
    /// empty map). Never fails on missing required fields.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidPayload`] for malformed JSON, with the
    /// underlying syntax error as details.
    fn parse(&self, payload: &[u8]) -> Result<Event, RelayError>;

    /// Enforces the required-field invariants on a parsed event.
    ///
    /// `event_id`, `event_type`, and `timestamp` are each checked
    /// independently (no short-circuit); a field counts as missing when it
    /// is empty or whitespace-only.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingField`] whose details are the
    /// comma-joined, insertion-ordered missing field names, e.g.
    /// `"event_id, timestamp"`. That exact join order and separator is a
    /// contract surface consumed by callers.
    fn validate(&self, event: &Event) -> Result<(), RelayError>;
}

/// Production [`EventProcessor`] backed by `serde_json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEventProcessor;

impl EventProcessor for JsonEventProcessor {
    fn parse(&self, payload: &[u8]) -> Result<Event, RelayError> {
        serde_json::from_slice(payload).map_err(|err| RelayError::invalid_payload(err.to_string()))
    }

    fn validate(&self, event: &Event) -> Result<(), RelayError> {
        let values = [&event.event_id, &event.event_type, &event.timestamp];

        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .zip(values)
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RelayError::missing_field(missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;

    const VALID_BODY: &str = r#"{"event_id":"evt-1","event_type":"product.updated","timestamp":"2024-10-01T10:00:00Z","author":"alice","data":{"sku":"ABC"}}"#;

    #[test]
    fn decode_passthrough_preserves_bytes() {
        let bytes = decode_body(VALID_BODY, false).unwrap();
        assert_eq!(bytes, VALID_BODY.as_bytes());
    }

    #[test]
    fn decode_base64_roundtrips() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(VALID_BODY);
        let bytes = decode_body(&encoded, true).unwrap();
        assert_eq!(bytes, VALID_BODY.as_bytes());
    }

    #[test]
    fn decode_malformed_base64_is_invalid_payload() {
        let err = decode_body("not-base64", true).unwrap_err();
        assert!(matches!(err, RelayError::InvalidPayload { .. }));
    }

    #[test]
    fn decode_empty_body_is_not_an_error() {
        // Emptiness is the handler's concern, not the decoder's.
        assert_eq!(decode_body("", false).unwrap(), Vec::<u8>::new());
        assert_eq!(decode_body("", true).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn parse_valid_payload() {
        let event = JsonEventProcessor.parse(VALID_BODY.as_bytes()).unwrap();
        assert_eq!(event.event_id, "evt-1");
        assert_eq!(event.event_type, "product.updated");
        assert_eq!(event.author, "alice");
        assert_eq!(event.data.get("sku").unwrap(), "ABC");
    }

    #[test]
    fn parse_defaults_missing_fields() {
        let event = JsonEventProcessor.parse(br#"{"event_type":"product.created"}"#).unwrap();
        assert_eq!(event.event_id, "");
        assert_eq!(event.timestamp, "");
        assert_eq!(event.author, "");
        assert!(event.data.is_empty());
    }

    #[test]
    fn parse_ignores_unknown_fields() {
        let event = JsonEventProcessor
            .parse(br#"{"event_id":"evt-1","extra":"ignored"}"#)
            .unwrap();
        assert_eq!(event.event_id, "evt-1");
    }

    #[test]
    fn parse_malformed_json_is_invalid_payload() {
        let err = JsonEventProcessor.parse(br#"{"event_id":}"#).unwrap_err();
        assert!(matches!(err, RelayError::InvalidPayload { .. }));
        assert!(!err.details().is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        let first = JsonEventProcessor.parse(VALID_BODY.as_bytes()).unwrap();
        let second = JsonEventProcessor.parse(VALID_BODY.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn validate_accepts_complete_event() {
        let event = JsonEventProcessor.parse(VALID_BODY.as_bytes()).unwrap();
        assert!(JsonEventProcessor.validate(&event).is_ok());
    }

    #[test]
    fn validate_reports_single_missing_field() {
        let event = JsonEventProcessor
            .parse(br#"{"event_type":"product.updated","timestamp":"2024-10-01T10:00:00Z"}"#)
            .unwrap();
        let err = JsonEventProcessor.validate(&event).unwrap_err();
        assert_eq!(err, RelayError::missing_field("event_id"));
    }

    #[test]
    fn validate_joins_missing_fields_in_declaration_order() {
        let event = JsonEventProcessor
            .parse(br#"{"event_type":"product.updated"}"#)
            .unwrap();
        let err = JsonEventProcessor.validate(&event).unwrap_err();
        // The exact separator and ordering are part of the contract.
        assert_eq!(err.details(), "event_id, timestamp");
    }

    #[test]
    fn validate_treats_whitespace_as_missing() {
        let event = JsonEventProcessor
            .parse(br#"{"event_id":"  ","event_type":"\t","timestamp":" "}"#)
            .unwrap();
        let err = JsonEventProcessor.validate(&event).unwrap_err();
        assert_eq!(err.details(), "event_id, event_type, timestamp");
    }
}
