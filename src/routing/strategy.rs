//! Target resolution strategies.
//!
//! # Responsibilities
//! - Turn a message into zero or more routing targets
//! - Accept channel handles, names, or collections of either
//!
//! # Design Decisions
//! - Strategy is chosen at configuration time, never by inspecting handlers
//! - Strategies only produce targets; name lookup happens in the router
//! - Names may list several channels separated by commas
//! - Empty or blank names are discarded here, never sent to the resolver

use std::fmt;
use std::sync::Arc;

use crate::channel::MessageChannel;
use crate::message::Message;

/// Where a router should send a message.
#[derive(Debug, Clone)]
pub enum RoutingTarget {
    /// A channel handle that needs no lookup.
    Channel(Arc<dyn MessageChannel>),
    /// A channel name resolved through the router's channel resolver.
    Name(String),
}

impl RoutingTarget {
    /// Name used for logging and deduplication.
    pub fn name(&self) -> &str {
        match self {
            RoutingTarget::Channel(c) => c.name(),
            RoutingTarget::Name(n) => n,
        }
    }
}

impl From<&str> for RoutingTarget {
    fn from(name: &str) -> Self {
        RoutingTarget::Name(name.to_string())
    }
}

impl From<String> for RoutingTarget {
    fn from(name: String) -> Self {
        RoutingTarget::Name(name)
    }
}

impl From<Arc<dyn MessageChannel>> for RoutingTarget {
    fn from(channel: Arc<dyn MessageChannel>) -> Self {
        RoutingTarget::Channel(channel)
    }
}

/// Result of a routing function: zero or more targets.
#[derive(Debug, Clone, Default)]
pub struct Targets(pub Vec<RoutingTarget>);

impl Targets {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn into_vec(self) -> Vec<RoutingTarget> {
        self.0
    }
}

impl From<RoutingTarget> for Targets {
    fn from(target: RoutingTarget) -> Self {
        Targets(vec![target])
    }
}

impl From<&str> for Targets {
    fn from(name: &str) -> Self {
        Targets(vec![name.into()])
    }
}

impl From<String> for Targets {
    fn from(name: String) -> Self {
        Targets(vec![name.into()])
    }
}

impl From<Arc<dyn MessageChannel>> for Targets {
    fn from(channel: Arc<dyn MessageChannel>) -> Self {
        Targets(vec![channel.into()])
    }
}

impl<T: Into<RoutingTarget>> From<Vec<T>> for Targets {
    fn from(items: Vec<T>) -> Self {
        Targets(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Targets>> From<Option<T>> for Targets {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or_default()
    }
}

/// A routing function.
pub type RouteFn = Arc<dyn Fn(&Message) -> Targets + Send + Sync>;

/// How a router picks its targets.
#[derive(Clone)]
pub enum RoutingStrategy {
    /// Always the same targets.
    FixedList(Vec<RoutingTarget>),
    /// A function computing targets from the message.
    SingleFunction(RouteFn),
    /// A text payload names one or more comma separated channels.
    PayloadAsName,
    /// The named header holds one or more comma separated channel names.
    HeaderValue(String),
}

impl RoutingStrategy {
    /// Wrap a closure returning anything convertible to [`Targets`].
    pub fn function<F, R>(f: F) -> Self
    where
        F: Fn(&Message) -> R + Send + Sync + 'static,
        R: Into<Targets>,
    {
        RoutingStrategy::SingleFunction(Arc::new(move |m| f(m).into()))
    }

    /// Compute the targets for `message`, in order, possibly with duplicates.
    ///
    /// Every name is treated as a comma separated list of channel names.
    pub fn resolve(&self, message: &Message) -> Vec<RoutingTarget> {
        let targets = match self {
            RoutingStrategy::FixedList(targets) => targets.clone(),
            RoutingStrategy::SingleFunction(f) => f(message).into_vec(),
            RoutingStrategy::PayloadAsName => message
                .payload()
                .as_text()
                .map(|names| vec![RoutingTarget::Name(names.to_string())])
                .unwrap_or_default(),
            RoutingStrategy::HeaderValue(header) => message
                .header(header)
                .map(|names| vec![RoutingTarget::Name(names.to_string())])
                .unwrap_or_default(),
        };

        targets.into_iter().flat_map(split_names).collect()
    }
}

/// Split a name target on commas, trimming and dropping blank names.
fn split_names(target: RoutingTarget) -> Vec<RoutingTarget> {
    match target {
        RoutingTarget::Name(names) => names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| RoutingTarget::Name(name.to_string()))
            .collect(),
        channel => vec![channel],
    }
}

impl fmt::Debug for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingStrategy::FixedList(targets) => f.debug_tuple("FixedList").field(targets).finish(),
            RoutingStrategy::SingleFunction(_) => f.write_str("SingleFunction(..)"),
            RoutingStrategy::PayloadAsName => f.write_str("PayloadAsName"),
            RoutingStrategy::HeaderValue(h) => f.debug_tuple("HeaderValue").field(h).finish(),
        }
    }
}
