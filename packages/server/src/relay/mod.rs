//! The relay pipeline: structured logging, the SNS publisher with its
//! retry policy, and the invocation handler that orchestrates
//! decode -> parse -> validate -> publish for each webhook delivery.

pub mod handler;
pub mod logger;
pub mod publisher;

pub use handler::{WebhookHandler, WebhookRequest, WebhookResponse};
pub use logger::{LogFields, RelayLogger, TracingLogger};
pub use publisher::{
    EventPublisher, OutboundMessage, SnsTopicClient, TopicClient, TopicPublisher,
};
