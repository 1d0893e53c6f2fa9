//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a relay flow.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Pollable queue channels.
    pub channels: Vec<ChannelConfig>,

    /// Content-based routers, each fed by its own input channel.
    pub routers: Vec<RouterConfig>,

    /// HTTP outbound gateways, each fed by its own input channel.
    pub outbound: Vec<HttpOutboundConfig>,

    /// Shared HTTP client settings.
    pub http_client: HttpClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Queue channel definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelConfig {
    /// Unique channel name.
    pub name: String,

    /// Maximum number of buffered messages.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    crate::channel::queue::DEFAULT_CAPACITY
}

/// Router definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    /// Router identifier for logging/metrics.
    pub name: String,

    /// Name of the direct channel that feeds this router.
    pub input_channel: String,

    /// How targets are chosen.
    pub strategy: StrategyConfig,

    /// Channel used when no target accepts the message.
    #[serde(default)]
    pub default_output: Option<String>,

    /// Fail when nothing resolves or a name cannot be resolved.
    #[serde(default)]
    pub resolution_required: bool,

    /// Skip unresolvable names even when resolution is required.
    #[serde(default)]
    pub ignore_channel_name_resolution_failures: bool,

    /// Send timeout for each target channel, in milliseconds.
    #[serde(default)]
    pub send_timeout_ms: Option<u64>,
}

/// Declarative routing strategies. Function strategies are programmatic only.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Always route to these channels.
    FixedList { channels: Vec<String> },

    /// The text payload names the channel.
    PayloadAsName,

    /// The header value names one or more channels (comma separated).
    HeaderValue { header: String },

    /// Text payload → channel name lookup table.
    Mapping { mappings: BTreeMap<String, String> },
}

/// HTTP outbound gateway definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpOutboundConfig {
    /// Gateway identifier for logging.
    pub name: String,

    /// Name of the direct channel that feeds this gateway.
    pub input_channel: String,

    /// Target URL.
    pub url: String,

    /// HTTP method (default: POST).
    #[serde(default = "default_http_method")]
    pub http_method: String,

    /// Channel that receives response messages.
    #[serde(default)]
    pub output_channel: Option<String>,

    /// Reply send timeout in milliseconds.
    #[serde(default)]
    pub send_timeout_ms: Option<u64>,
}

fn default_http_method() -> String {
    "POST".to_string()
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
