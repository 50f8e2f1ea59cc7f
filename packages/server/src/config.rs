//! Process configuration from flags and environment variables.

use std::time::Duration;

use clap::Parser;

use crate::network::NetworkConfig;

/// PIM webhook to SNS relay service.
#[derive(Debug, Parser)]
#[command(name = "relay-server", version, about)]
pub struct ServerArgs {
    /// ARN of the SNS topic events are relayed to. The process refuses to
    /// start without it.
    #[arg(long, env = "SNS_TOPIC_ARN")]
    pub sns_topic_arn: String,

    /// Minimum log level (any tracing env-filter directive).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Bind address.
    #[arg(long, env = "RELAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port. 0 means OS-assigned.
    #[arg(long, env = "RELAY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Allowed CORS origins, comma separated. "*" allows any.
    #[arg(long, env = "RELAY_CORS_ORIGINS", default_value = "*", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Request timeout in seconds. Must cover the publish phase's worst
    /// case (three attempts plus 3s of backoff).
    #[arg(long, env = "RELAY_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,
}

impl ServerArgs {
    /// The network configuration derived from these arguments.
    #[must_use]
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
