//! Named channel registry.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::channel::{ChannelResolver, MessageChannel};

/// Concurrent map of channel name to channel.
///
/// The default [`ChannelResolver`]. Channels can be registered while routers
/// are already resolving names against it.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: DashMap<String, Arc<dyn MessageChannel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel under its own name, replacing any previous one.
    pub fn register(&self, channel: Arc<dyn MessageChannel>) {
        let name = channel.name().to_string();
        if self.channels.insert(name.clone(), channel).is_some() {
            tracing::warn!(channel = %name, "Replaced existing channel registration");
        } else {
            tracing::debug!(channel = %name, "Channel registered");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MessageChannel>> {
        self.channels.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Registered channel names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl ChannelResolver for ChannelRegistry {
    fn resolve_channel_name(&self, name: &str) -> Option<Arc<dyn MessageChannel>> {
        self.get(name)
    }
}

/// Resolves names against a registry without keeping it alive.
///
/// Routers are registered in the registry they resolve against, so holding
/// it strongly would form a reference cycle.
#[derive(Debug, Clone)]
pub struct WeakRegistry {
    registry: Weak<ChannelRegistry>,
}

impl WeakRegistry {
    pub fn new(registry: &Arc<ChannelRegistry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
        }
    }
}

impl ChannelResolver for WeakRegistry {
    fn resolve_channel_name(&self, name: &str) -> Option<Arc<dyn MessageChannel>> {
        self.registry.upgrade()?.get(name)
    }
}
