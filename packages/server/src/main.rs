//! Relay server bootstrap: configuration, logging, AWS client, and the
//! HTTP serve loop.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use relay_core::JsonEventProcessor;
use relay_server::config::ServerArgs;
use relay_server::network::{shutdown, NetworkModule};
use relay_server::relay::{logger, SnsTopicClient, TopicPublisher, TracingLogger, WebhookHandler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    logger::init(&args.log_level)?;

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let sns = aws_sdk_sns::Client::new(&aws_config);
    let client = Arc::new(SnsTopicClient::new(sns, args.sns_topic_arn.clone()));

    let handler = Arc::new(WebhookHandler::new(
        Arc::new(JsonEventProcessor),
        Arc::new(TopicPublisher::new(client)),
        Arc::new(TracingLogger::new()),
    ));

    let mut module = NetworkModule::new(args.network_config());
    let shutdown_signal = module.shutdown_signal();

    tokio::spawn(async move {
        shutdown::termination_signal().await;
        shutdown_signal.trigger();
    });

    let port = module.start().await?;
    info!(port, topic_arn = %args.sns_topic_arn, "relay server listening");

    module.serve(handler).await
}
