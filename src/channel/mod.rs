//! Channel subsystem.
//!
//! # Data Flow
//! ```text
//! Producer
//!     → MessageChannel::send(message, timeout)
//!         → queue.rs  (buffer until a consumer polls)
//!         → direct.rs (invoke subscribed handler in caller's task)
//!
//! Router / outbound handler
//!     → registry.rs (resolve channel name → channel handle)
//! ```
//!
//! # Design Decisions
//! - `send` returns `Ok(false)` when the channel did not accept the message
//!   (full, closed, timed out); `Err` only for downstream handler failures
//! - Direct channels propagate handler errors back to the sender
//! - Name resolution is a trait so a custom resolver can replace the registry

pub mod direct;
pub mod queue;
pub mod registry;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::MessagingResult;
use crate::message::Message;

pub use direct::DirectChannel;
pub use queue::QueueChannel;
pub use registry::{ChannelRegistry, WeakRegistry};

/// A named destination for messages.
#[async_trait]
pub trait MessageChannel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send a message, waiting at most `timeout` when the channel is full.
    /// `None` waits indefinitely.
    async fn send(&self, message: Message, timeout: Option<Duration>) -> MessagingResult<bool>;
}

/// A channel that buffers messages for consumers to poll.
#[async_trait]
pub trait PollableChannel: MessageChannel {
    /// Receive the next message. A zero timeout polls without waiting.
    async fn receive(&self, timeout: Duration) -> Option<Message>;
}

/// Consumes messages. Routers and outbound gateways implement this.
#[async_trait]
pub trait MessageHandler: Send + Sync + fmt::Debug {
    async fn handle_message(&self, message: Message) -> MessagingResult<()>;
}

/// Maps channel names to channels.
pub trait ChannelResolver: Send + Sync + fmt::Debug {
    fn resolve_channel_name(&self, name: &str) -> Option<Arc<dyn MessageChannel>>;
}
