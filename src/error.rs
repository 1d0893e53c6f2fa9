//! Error types surfaced by routers, channels and outbound handlers.

use thiserror::Error;
use uuid::Uuid;

use crate::http::client::ClientError;

/// Errors raised while handling a message.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// A channel name did not map to a known channel.
    #[error("failed to resolve channel name '{0}'")]
    UnresolvedChannel(String),

    /// No reachable target accepted the message.
    #[error("failed to deliver message {message_id}: {reason}")]
    Delivery {
        message_id: Uuid,
        reason: String,
        #[source]
        source: Option<Box<MessagingError>>,
    },

    /// The HTTP client failed. Never retried here.
    #[error("HTTP request execution failed for URI [{url}]")]
    Transport {
        url: String,
        #[source]
        source: ClientError,
    },

    /// A subscribed handler failed while a direct channel dispatched to it.
    #[error("handler subscribed to '{channel}' failed")]
    Handler {
        channel: String,
        #[source]
        source: Box<MessagingError>,
    },
}

impl MessagingError {
    pub fn delivery(message_id: Uuid, reason: impl Into<String>) -> Self {
        MessagingError::Delivery {
            message_id,
            reason: reason.into(),
            source: None,
        }
    }

    /// Walk `Handler` wrappers down to the error the handler itself raised.
    pub fn root(&self) -> &MessagingError {
        match self {
            MessagingError::Handler { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type for message handling.
pub type MessagingResult<T> = Result<T, MessagingError>;
