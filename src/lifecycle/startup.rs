//! Startup orchestration.
//!
//! # Responsibilities
//! - Create every channel named by the configuration
//! - Build routers, then HTTP outbound gateways, behind direct input channels
//! - Expose the assembled flow for producers and consumers
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - One shared HTTP client for all gateways

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use thiserror::Error;

use crate::channel::{
    ChannelRegistry, ChannelResolver, DirectChannel, MessageChannel, QueueChannel, WeakRegistry,
};
use crate::config::schema::{HttpOutboundConfig, RelayConfig, RouterConfig, StrategyConfig};
use crate::error::{MessagingError, MessagingResult};
use crate::http::client::{ClientError, HttpClient, ReqwestClient};
use crate::http::handler::HttpRequestExecutingHandler;
use crate::message::Message;
use crate::routing::{MessageRouter, RoutingStrategy, RoutingTarget};

/// Errors raised while assembling a flow.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] ClientError),

    #[error("outbound '{name}': invalid HTTP method '{method}'")]
    InvalidMethod { name: String, method: String },

    #[error("outbound '{name}': unknown output channel '{channel}'")]
    UnknownOutput { name: String, channel: String },
}

/// An assembled set of channels, routers and gateways.
#[derive(Debug)]
pub struct Flow {
    registry: Arc<ChannelRegistry>,
    queues: HashMap<String, Arc<QueueChannel>>,
}

impl Flow {
    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// A pollable queue channel by name.
    pub fn queue(&self, name: &str) -> Option<Arc<QueueChannel>> {
        self.queues.get(name).cloned()
    }

    /// Names of all queue channels, sorted.
    pub fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.keys().cloned().collect();
        names.sort();
        names
    }

    /// Send `message` to the channel called `channel`.
    pub async fn send(&self, channel: &str, message: Message) -> MessagingResult<bool> {
        let target = self
            .registry
            .resolve_channel_name(channel)
            .ok_or_else(|| MessagingError::UnresolvedChannel(channel.to_string()))?;
        target.send(message, None).await
    }
}

/// Build a flow using a reqwest client configured from `config.http_client`.
pub fn build_flow(config: &RelayConfig) -> Result<Flow, StartupError> {
    let timeout = Duration::from_secs(config.http_client.timeout_secs);
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(Some(timeout))?);
    build_flow_with_client(config, client)
}

/// Build a flow whose gateways execute through `client`.
pub fn build_flow_with_client(
    config: &RelayConfig,
    client: Arc<dyn HttpClient>,
) -> Result<Flow, StartupError> {
    let registry = Arc::new(ChannelRegistry::new());
    let mut queues = HashMap::new();

    for channel in &config.channels {
        let queue = Arc::new(QueueChannel::with_capacity(&channel.name, channel.capacity));
        registry.register(queue.clone());
        queues.insert(channel.name.clone(), queue);
    }

    for router_config in &config.routers {
        let router = build_router(router_config, &registry);
        registry.register(Arc::new(DirectChannel::new(
            &router_config.input_channel,
            Arc::new(router),
        )));
        tracing::info!(
            router = %router_config.name,
            input = %router_config.input_channel,
            "Router ready"
        );
    }

    for outbound in &config.outbound {
        let handler = build_outbound(outbound, client.clone(), &registry)?;
        registry.register(Arc::new(DirectChannel::new(
            &outbound.input_channel,
            Arc::new(handler),
        )));
        tracing::info!(
            outbound = %outbound.name,
            input = %outbound.input_channel,
            url = %outbound.url,
            "HTTP outbound gateway ready"
        );
    }

    Ok(Flow { registry, queues })
}

fn build_outbound(
    config: &HttpOutboundConfig,
    client: Arc<dyn HttpClient>,
    registry: &ChannelRegistry,
) -> Result<HttpRequestExecutingHandler, StartupError> {
    let method = Method::from_bytes(config.http_method.to_uppercase().as_bytes()).map_err(|_| {
        StartupError::InvalidMethod {
            name: config.name.clone(),
            method: config.http_method.clone(),
        }
    })?;

    let mut handler = HttpRequestExecutingHandler::new(&config.url, client).http_method(method);

    // Gateways are built after queues and routers, so replies can target
    // those or a gateway declared earlier.
    if let Some(output) = &config.output_channel {
        let channel: Arc<dyn MessageChannel> =
            registry
                .get(output)
                .ok_or_else(|| StartupError::UnknownOutput {
                    name: config.name.clone(),
                    channel: output.clone(),
                })?;
        handler = handler.output_channel(channel);
    }
    if let Some(ms) = config.send_timeout_ms {
        handler = handler.send_timeout(Duration::from_millis(ms));
    }
    Ok(handler)
}

/// Routers resolve through a weak handle; the registry owns their input channels.
fn build_router(config: &RouterConfig, registry: &Arc<ChannelRegistry>) -> MessageRouter {
    let strategy = match &config.strategy {
        StrategyConfig::FixedList { channels } => RoutingStrategy::FixedList(
            channels.iter().map(|c| RoutingTarget::Name(c.clone())).collect(),
        ),
        StrategyConfig::PayloadAsName => RoutingStrategy::PayloadAsName,
        StrategyConfig::HeaderValue { header } => RoutingStrategy::HeaderValue(header.clone()),
        StrategyConfig::Mapping { mappings } => {
            let mappings = mappings.clone();
            RoutingStrategy::function(move |m: &Message| {
                m.payload().as_text().and_then(|p| mappings.get(p).cloned())
            })
        }
    };

    let mut router = MessageRouter::new(strategy)
        .with_name(&config.name)
        .channel_resolver(Arc::new(WeakRegistry::new(registry)))
        .resolution_required(config.resolution_required)
        .ignore_channel_name_resolution_failures(config.ignore_channel_name_resolution_failures);

    if let Some(default) = &config.default_output {
        router = router.default_output(default.as_str());
    }
    if let Some(ms) = config.send_timeout_ms {
        router = router.send_timeout(Duration::from_millis(ms));
    }
    router
}
