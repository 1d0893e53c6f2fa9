//! Bounded in-memory queue channel.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::channel::{MessageChannel, PollableChannel};
use crate::error::MessagingResult;
use crate::message::Message;

/// Default queue capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Pollable channel backed by a bounded tokio mpsc queue.
#[derive(Debug)]
pub struct QueueChannel {
    name: String,
    tx: mpsc::Sender<Message>,
    rx: Mutex<mpsc::Receiver<Message>>,
}

impl QueueChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    /// Create a queue that holds at most `capacity` messages (minimum 1).
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            name: name.into(),
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Drain every message currently queued, without waiting.
    pub async fn purge(&self) -> Vec<Message> {
        let mut rx = self.rx.lock().await;
        let mut drained = Vec::new();
        while let Ok(message) = rx.try_recv() {
            drained.push(message);
        }
        drained
    }
}

#[async_trait]
impl MessageChannel for QueueChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, message: Message, timeout: Option<Duration>) -> MessagingResult<bool> {
        let accepted = match timeout {
            None => self.tx.send(message).await.is_ok(),
            Some(t) if t.is_zero() => self.tx.try_send(message).is_ok(),
            Some(t) => self.tx.send_timeout(message, t).await.is_ok(),
        };

        if !accepted {
            tracing::warn!(channel = %self.name, "Queue did not accept message");
        }
        Ok(accepted)
    }
}

#[async_trait]
impl PollableChannel for QueueChannel {
    async fn receive(&self, timeout: Duration) -> Option<Message> {
        let mut rx = self.rx.lock().await;
        if timeout.is_zero() {
            return rx.try_recv().ok();
        }
        tokio::time::timeout(timeout, rx.recv()).await.ok().flatten()
    }
}
