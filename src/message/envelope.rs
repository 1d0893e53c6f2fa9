//! Immutable message envelope.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use crate::message::payload::Payload;

/// A payload plus headers. Never mutated after construction.
///
/// Clones share the payload and headers, so fanning a message out to
/// several channels does not copy the body.
#[derive(Debug, Clone)]
pub struct Message {
    id: Uuid,
    timestamp: u64,
    payload: Arc<Payload>,
    headers: Arc<HashMap<String, String>>,
}

impl Message {
    /// Shorthand for a message without headers.
    pub fn new(payload: impl Into<Payload>) -> Self {
        MessageBuilder::with_payload(payload).build()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The same message (id, timestamp, payload) with one header set.
    pub fn with_header(&self, name: impl Into<String>, value: impl Into<String>) -> Message {
        let mut headers = (*self.headers).clone();
        headers.insert(name.into(), value.into());
        Message {
            id: self.id,
            timestamp: self.timestamp,
            payload: self.payload.clone(),
            headers: Arc::new(headers),
        }
    }
}

/// Builder for [`Message`].
#[derive(Debug)]
pub struct MessageBuilder {
    payload: Payload,
    headers: HashMap<String, String>,
}

impl MessageBuilder {
    pub fn with_payload(payload: impl Into<Payload>) -> Self {
        Self {
            payload: payload.into(),
            headers: HashMap::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Copy every header of `other`, overwriting headers already set.
    pub fn copy_headers(mut self, other: &HashMap<String, String>) -> Self {
        self.headers
            .extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    pub fn build(self) -> Message {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Message {
            id: Uuid::new_v4(),
            timestamp,
            payload: Arc::new(self.payload),
            headers: Arc::new(self.headers),
        }
    }
}
