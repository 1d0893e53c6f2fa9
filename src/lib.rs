//! Message Relay Library
//!
//! Content-based routing and HTTP outbound gateways over in-process channels.

pub mod channel;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod message;
pub mod observability;
pub mod routing;

pub use config::schema::RelayConfig;
pub use error::{MessagingError, MessagingResult};
pub use lifecycle::{build_flow, Flow};
pub use message::{Message, MessageBuilder, Payload};
