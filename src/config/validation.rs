//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routers reference existing channels)
//! - Validate value ranges (timeouts > 0, capacities > 0)
//! - Parse URLs and HTTP methods up front
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Static routing cycles through direct input channels are rejected; a
//!   cycle would recurse on the sender's stack
//! - Names in payload/header strategies are dynamic and cannot be checked here;
//!   routers bound those at runtime with a hop count

use std::collections::{HashMap, HashSet};

use reqwest::Method;
use thiserror::Error;

use crate::config::schema::{RelayConfig, StrategyConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("channel '{0}' is defined more than once")]
    DuplicateChannel(String),

    #[error("{owner} references unknown channel '{channel}'")]
    UnknownChannel { owner: String, channel: String },

    #[error("{owner}: {field} must be greater than zero")]
    NotPositive { owner: String, field: &'static str },

    #[error("outbound '{name}': invalid url '{url}'")]
    InvalidUrl { name: String, url: String },

    #[error("outbound '{name}': invalid HTTP method '{method}'")]
    InvalidMethod { name: String, method: String },

    #[error("router '{0}': fixed_list needs at least one channel")]
    EmptyFixedList(String),

    #[error("{owner} routes back into its own input channel '{channel}'")]
    RoutingCycle { owner: String, channel: String },
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Every channel name in the flow: queues plus the direct input channels.
    let mut known = HashSet::new();
    let declared = config
        .channels
        .iter()
        .map(|c| c.name.as_str())
        .chain(config.routers.iter().map(|r| r.input_channel.as_str()))
        .chain(config.outbound.iter().map(|o| o.input_channel.as_str()));
    for name in declared {
        if !known.insert(name) {
            errors.push(ValidationError::DuplicateChannel(name.to_string()));
        }
    }

    for channel in &config.channels {
        if channel.capacity == 0 {
            errors.push(ValidationError::NotPositive {
                owner: format!("channel '{}'", channel.name),
                field: "capacity",
            });
        }
    }

    let check_ref = |owner: &str, channel: &str, errors: &mut Vec<ValidationError>| {
        if !known.contains(channel) {
            errors.push(ValidationError::UnknownChannel {
                owner: owner.to_string(),
                channel: channel.to_string(),
            });
        }
    };

    for router in &config.routers {
        let owner = format!("router '{}'", router.name);
        match &router.strategy {
            StrategyConfig::FixedList { channels } => {
                if channels.is_empty() {
                    errors.push(ValidationError::EmptyFixedList(router.name.clone()));
                }
                for channel in channels {
                    check_ref(&owner, channel, &mut errors);
                }
            }
            StrategyConfig::Mapping { mappings } => {
                for channel in mappings.values() {
                    check_ref(&owner, channel, &mut errors);
                }
            }
            StrategyConfig::PayloadAsName | StrategyConfig::HeaderValue { .. } => {}
        }
        if let Some(default) = &router.default_output {
            check_ref(&owner, default, &mut errors);
        }
        if router.send_timeout_ms == Some(0) {
            errors.push(ValidationError::NotPositive {
                owner,
                field: "send_timeout_ms",
            });
        }
    }

    for outbound in &config.outbound {
        let owner = format!("outbound '{}'", outbound.name);
        let url_ok = url::Url::parse(&outbound.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !url_ok {
            errors.push(ValidationError::InvalidUrl {
                name: outbound.name.clone(),
                url: outbound.url.clone(),
            });
        }
        if Method::from_bytes(outbound.http_method.to_uppercase().as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                name: outbound.name.clone(),
                method: outbound.http_method.clone(),
            });
        }
        if let Some(output) = &outbound.output_channel {
            check_ref(&owner, output, &mut errors);
        }
        if outbound.send_timeout_ms == Some(0) {
            errors.push(ValidationError::NotPositive {
                owner,
                field: "send_timeout_ms",
            });
        }
    }

    errors.extend(find_cycles(config));

    if config.http_client.timeout_secs == 0 {
        errors.push(ValidationError::NotPositive {
            owner: "http_client".to_string(),
            field: "timeout_secs",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Report every router or gateway whose input channel is reachable from its
/// own static targets. Only direct input channels forward synchronously, so
/// queue channels end a path.
fn find_cycles(config: &RelayConfig) -> Vec<ValidationError> {
    let mut nodes: Vec<(&str, String)> = Vec::new();
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();

    for router in &config.routers {
        let mut targets: Vec<&str> = match &router.strategy {
            StrategyConfig::FixedList { channels } => channels.iter().map(String::as_str).collect(),
            StrategyConfig::Mapping { mappings } => mappings.values().map(String::as_str).collect(),
            StrategyConfig::PayloadAsName | StrategyConfig::HeaderValue { .. } => Vec::new(),
        };
        targets.extend(router.default_output.as_deref());
        nodes.push((router.input_channel.as_str(), format!("router '{}'", router.name)));
        edges.entry(router.input_channel.as_str()).or_default().extend(targets);
    }
    for outbound in &config.outbound {
        nodes.push((outbound.input_channel.as_str(), format!("outbound '{}'", outbound.name)));
        edges
            .entry(outbound.input_channel.as_str())
            .or_default()
            .extend(outbound.output_channel.as_deref());
    }

    nodes
        .into_iter()
        .filter(|(input, _)| reaches_itself(input, &edges))
        .map(|(input, owner)| ValidationError::RoutingCycle {
            owner,
            channel: input.to_string(),
        })
        .collect()
}

fn reaches_itself(start: &str, edges: &HashMap<&str, Vec<&str>>) -> bool {
    let mut visited = HashSet::new();
    let mut stack: Vec<&str> = edges.get(start).cloned().unwrap_or_default();
    while let Some(node) = stack.pop() {
        if node == start {
            return true;
        }
        if visited.insert(node) {
            if let Some(next) = edges.get(node) {
                stack.extend(next.iter().copied());
            }
        }
    }
    false
}
