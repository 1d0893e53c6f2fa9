//! Message router.
//!
//! # Responsibilities
//! - Ask the strategy for targets
//! - Resolve names to channels, applying the resolution flags
//! - Send to each distinct channel once, falling back to the default output
//! - Stop messages that keep circling through routers
//!
//! # Design Decisions
//! - Immutable after construction; shared via Arc
//! - Unresolvable names are fatal only with `resolution_required` and
//!   without `ignore_channel_name_resolution_failures`
//! - No retries; failures surface to the sender

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{ChannelResolver, MessageChannel, MessageHandler};
use crate::error::{MessagingError, MessagingResult};
use crate::message::Message;
use crate::observability::metrics;
use crate::routing::strategy::{RoutingStrategy, RoutingTarget};

/// Header counting how many routers a message has passed through.
pub const ROUTING_HOPS_HEADER: &str = "relay_routingHops";

/// Routers a single message may pass through before it is rejected.
pub const MAX_ROUTING_HOPS: u32 = 32;

/// Routes each message to the channels its strategy selects.
pub struct MessageRouter {
    name: String,
    strategy: RoutingStrategy,
    channel_resolver: Option<Arc<dyn ChannelResolver>>,
    default_output: Option<RoutingTarget>,
    resolution_required: bool,
    ignore_channel_name_resolution_failures: bool,
    send_timeout: Option<Duration>,
}

impl MessageRouter {
    pub fn new(strategy: RoutingStrategy) -> Self {
        Self {
            name: "router".to_string(),
            strategy,
            channel_resolver: None,
            default_output: None,
            resolution_required: false,
            ignore_channel_name_resolution_failures: false,
            send_timeout: None,
        }
    }

    /// Name used in logs and metrics.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn channel_resolver(mut self, resolver: Arc<dyn ChannelResolver>) -> Self {
        self.channel_resolver = Some(resolver);
        self
    }

    pub fn default_output(mut self, target: impl Into<RoutingTarget>) -> Self {
        self.default_output = Some(target.into());
        self
    }

    pub fn resolution_required(mut self, required: bool) -> Self {
        self.resolution_required = required;
        self
    }

    pub fn ignore_channel_name_resolution_failures(mut self, ignore: bool) -> Self {
        self.ignore_channel_name_resolution_failures = ignore;
        self
    }

    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> &RoutingStrategy {
        &self.strategy
    }

    pub fn resolver(&self) -> Option<&Arc<dyn ChannelResolver>> {
        self.channel_resolver.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.send_timeout
    }

    pub fn is_resolution_required(&self) -> bool {
        self.resolution_required
    }

    pub fn ignores_resolution_failures(&self) -> bool {
        self.ignore_channel_name_resolution_failures
    }

    /// Resolve the distinct channels `message` should go to, in first-seen order.
    ///
    /// Channels are distinct by identity: a name and a handle for the same
    /// registered channel collapse, two channels that share a name do not.
    pub fn route(&self, message: &Message) -> MessagingResult<Vec<Arc<dyn MessageChannel>>> {
        let mut seen: HashSet<*const ()> = HashSet::new();
        let mut channels = Vec::new();

        for target in self.strategy.resolve(message) {
            let Some(channel) = self.resolve_target(target, message)? else {
                continue;
            };
            if seen.insert(Arc::as_ptr(&channel) as *const ()) {
                channels.push(channel);
            }
        }

        Ok(channels)
    }

    /// Look up one target. `Ok(None)` means the target was dropped.
    fn resolve_target(
        &self,
        target: RoutingTarget,
        message: &Message,
    ) -> MessagingResult<Option<Arc<dyn MessageChannel>>> {
        let name = match target {
            RoutingTarget::Channel(channel) => return Ok(Some(channel)),
            RoutingTarget::Name(name) => name,
        };

        if let Some(channel) = self
            .channel_resolver
            .as_ref()
            .and_then(|r| r.resolve_channel_name(&name))
        {
            return Ok(Some(channel));
        }

        if self.resolution_required && !self.ignore_channel_name_resolution_failures {
            tracing::warn!(
                router = %self.name,
                message_id = %message.id(),
                channel = %name,
                "Channel name could not be resolved"
            );
            return Err(MessagingError::Delivery {
                message_id: message.id(),
                reason: format!("router '{}' could not resolve channel '{}'", self.name, name),
                source: Some(Box::new(MessagingError::UnresolvedChannel(name))),
            });
        }

        tracing::debug!(
            router = %self.name,
            message_id = %message.id(),
            channel = %name,
            "Dropping unresolved channel"
        );
        Ok(None)
    }

    async fn send_to(&self, channel: &Arc<dyn MessageChannel>, message: &Message) -> MessagingResult<bool> {
        let accepted = channel.send(message.clone(), self.send_timeout).await?;
        if accepted {
            metrics::record_routed(&self.name, channel.name());
            tracing::debug!(
                router = %self.name,
                message_id = %message.id(),
                channel = %channel.name(),
                "Message routed"
            );
        }
        Ok(accepted)
    }
}

#[async_trait]
impl MessageHandler for MessageRouter {
    async fn handle_message(&self, message: Message) -> MessagingResult<()> {
        let hops = message
            .header(ROUTING_HOPS_HEADER)
            .and_then(|h| h.parse::<u32>().ok())
            .unwrap_or(0);
        if hops >= MAX_ROUTING_HOPS {
            metrics::record_dropped(&self.name);
            tracing::warn!(
                router = %self.name,
                message_id = %message.id(),
                hops,
                "Routing loop detected"
            );
            return Err(MessagingError::delivery(
                message.id(),
                format!(
                    "router '{}' rejected a message that already passed {} routers",
                    self.name, hops
                ),
            ));
        }
        let message = message.with_header(ROUTING_HOPS_HEADER, (hops + 1).to_string());

        let mut sent = false;
        for channel in self.route(&message)? {
            if self.send_to(&channel, &message).await? {
                sent = true;
            }
        }

        if !sent {
            if let Some(default) = self.default_output.clone() {
                if let Some(channel) = self.resolve_target(default, &message)? {
                    sent = self.send_to(&channel, &message).await?;
                }
            }
        }

        if !sent {
            metrics::record_dropped(&self.name);
            if self.resolution_required {
                return Err(MessagingError::delivery(
                    message.id(),
                    format!(
                        "no channel resolved by router '{}' and no default output channel accepted the message",
                        self.name
                    ),
                ));
            }
            tracing::debug!(router = %self.name, message_id = %message.id(), "No target accepted message");
        }

        Ok(())
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageRouter")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("default_output", &self.default_output.as_ref().map(RoutingTarget::name))
            .field("resolution_required", &self.resolution_required)
            .field(
                "ignore_channel_name_resolution_failures",
                &self.ignore_channel_name_resolution_failures,
            )
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}
