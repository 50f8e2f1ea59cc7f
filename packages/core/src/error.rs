//! Relay error taxonomy.
//!
//! Every pipeline stage classifies its failure exactly once, at the stage
//! boundary, into one of these variants. Downstream code (the invocation
//! handler) only maps a classified error to a response; it never
//! re-interprets. Retry semantics are a property of the stage that
//! produced the error, not of the error value.

/// Stable error codes surfaced in response bodies. Contract surface:
/// consumers filter on these strings.
pub mod codes {
    pub const INVALID_PAYLOAD: &str = "INVALID_PAYLOAD";
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const SNS_PUBLISH_FAILED: &str = "SNS_PUBLISH_FAILED";
    pub const CANCELLED: &str = "CANCELLED";
}

/// Classified failure from a relay pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// Malformed, empty, or unparseable input. Client-caused, never retried.
    #[error("invalid webhook payload: {details}")]
    InvalidPayload { details: String },

    /// Structurally valid but incomplete input. Client-caused, never retried.
    #[error("required field is missing: {details}")]
    MissingField { details: String },

    /// Transport failure to the message bus after exhausting retries, or a
    /// non-retried envelope serialization defect (distinguishable by the
    /// details text).
    #[error("failed to publish to SNS: {details}")]
    PublishFailed { details: String },

    /// Caller-initiated abort during the publish retry loop. Kept distinct
    /// from [`RelayError::PublishFailed`]: it is not a transport fault.
    #[error("publish cancelled: {details}")]
    Cancelled { details: String },
}

impl RelayError {
    /// The stable error code for response bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => codes::INVALID_PAYLOAD,
            Self::MissingField { .. } => codes::MISSING_FIELD,
            Self::PublishFailed { .. } => codes::SNS_PUBLISH_FAILED,
            Self::Cancelled { .. } => codes::CANCELLED,
        }
    }

    /// Fixed human-readable message for response bodies. The per-failure
    /// specifics travel in [`RelayError::details`].
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidPayload { .. } => "Invalid webhook payload",
            Self::MissingField { .. } => "Required field is missing",
            Self::PublishFailed { .. } => "Failed to publish to SNS",
            Self::Cancelled { .. } => "Publish cancelled before completion",
        }
    }

    /// The underlying failure text.
    #[must_use]
    pub fn details(&self) -> &str {
        match self {
            Self::InvalidPayload { details }
            | Self::MissingField { details }
            | Self::PublishFailed { details }
            | Self::Cancelled { details } => details,
        }
    }

    pub fn invalid_payload(details: impl Into<String>) -> Self {
        Self::InvalidPayload { details: details.into() }
    }

    pub fn missing_field(details: impl Into<String>) -> Self {
        Self::MissingField { details: details.into() }
    }

    pub fn publish_failed(details: impl Into<String>) -> Self {
        Self::PublishFailed { details: details.into() }
    }

    pub fn cancelled(details: impl Into<String>) -> Self {
        Self::Cancelled { details: details.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RelayError::invalid_payload("x").code(), "INVALID_PAYLOAD");
        assert_eq!(RelayError::missing_field("x").code(), "MISSING_FIELD");
        assert_eq!(RelayError::publish_failed("x").code(), "SNS_PUBLISH_FAILED");
        assert_eq!(RelayError::cancelled("x").code(), "CANCELLED");
    }

    #[test]
    fn display_includes_details() {
        let err = RelayError::publish_failed("connection reset");
        assert_eq!(err.to_string(), "failed to publish to SNS: connection reset");
        assert_eq!(err.details(), "connection reset");
    }

    #[test]
    fn cancelled_is_not_publish_failed() {
        let cancelled = RelayError::cancelled("shutdown");
        assert!(!matches!(cancelled, RelayError::PublishFailed { .. }));
        assert_ne!(cancelled.code(), codes::SNS_PUBLISH_FAILED);
    }
}
