//! Canonical event and envelope types for the relay pipeline.
//!
//! `Event` is the parsed form of an inbound webhook payload. `Envelope`
//! is the outbound wrapper sent to the message bus. Both serialize with
//! snake_case field names matching the PIM's webhook wire format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Constant `source` tag stamped on every outbound envelope so consumers
/// can tell relayed events apart from other producers on the topic.
pub const ENVELOPE_SOURCE: &str = "pim-webhook-relay";

/// A domain-change notification parsed from an inbound webhook body.
///
/// Every field defaults when absent: string fields to `""`, `data` to an
/// empty map. Unknown fields in the payload are ignored. The parser never
/// rejects an incomplete event; required-field enforcement is the
/// validator's job, so callers can distinguish "not even parseable" from
/// "parseable but incomplete".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier assigned by the PIM. Identity of the event.
    #[serde(default)]
    pub event_id: String,
    /// Dotted event kind, e.g. `product.updated`.
    #[serde(default)]
    pub event_type: String,
    /// PIM-side emission timestamp, passed through verbatim.
    #[serde(default)]
    pub timestamp: String,
    /// User or connection that caused the change.
    #[serde(default)]
    pub author: String,
    /// Free-form change payload, carried opaquely.
    #[serde(default)]
    pub data: serde_json::Map<String, Value>,
}

/// Outbound wrapper around a validated [`Event`] plus publish-time metadata.
///
/// Built once per publish call, owned by that call, and discarded after
/// transmission. `metadata` duplicates `event_id`/`event_type` as plain
/// strings so consumers can route without deserializing the full event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: Event,
    /// UTC timestamp of the publish call, RFC 3339 with seconds precision.
    pub received_at: String,
    /// Always [`ENVELOPE_SOURCE`].
    pub source: String,
    pub metadata: HashMap<String, String>,
}

impl Envelope {
    /// Wraps an event for transmission, stamping the relay source tag and
    /// routing metadata. The caller supplies `received_at` so envelope
    /// construction itself stays clock-free and deterministic in tests.
    #[must_use]
    pub fn wrap(event: Event, received_at: String) -> Self {
        let metadata = HashMap::from([
            ("event_id".to_string(), event.event_id.clone()),
            ("event_type".to_string(), event.event_type.clone()),
        ]);
        Self {
            event,
            received_at,
            source: ENVELOPE_SOURCE.to_string(),
            metadata,
        }
    }
}
