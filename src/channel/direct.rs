//! Point-to-point channel that hands messages straight to one subscriber.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::channel::{MessageChannel, MessageHandler};
use crate::error::{MessagingError, MessagingResult};
use crate::message::Message;

/// Invokes its handler in the sender's task. The send timeout does not apply.
#[derive(Debug, Clone)]
pub struct DirectChannel {
    name: String,
    handler: Arc<dyn MessageHandler>,
}

impl DirectChannel {
    pub fn new(name: impl Into<String>, handler: Arc<dyn MessageHandler>) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

#[async_trait]
impl MessageChannel for DirectChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: Message, _timeout: Option<Duration>) -> MessagingResult<bool> {
        self.handler
            .handle_message(message)
            .await
            .map_err(|e| MessagingError::Handler {
                channel: self.name.clone(),
                source: Box::new(e),
            })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl MessageHandler for Counting {
        async fn handle_message(&self, message: Message) -> MessagingResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MessagingError::delivery(message.id(), "boom"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_send_invokes_handler() {
        let handler = Arc::new(Counting::default());
        let channel = DirectChannel::new("in", handler.clone());

        assert!(channel.send(Message::new("x"), None).await.unwrap());
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let handler = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let channel = DirectChannel::new("in", handler);

        let err = channel.send(Message::new("x"), None).await.unwrap_err();
        assert!(matches!(err, MessagingError::Handler { ref channel, .. } if channel == "in"));
        assert!(matches!(err.root(), MessagingError::Delivery { .. }));
    }
}
