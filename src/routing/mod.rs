//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Message (payload, headers)
//!     → strategy.rs (compute targets: handles or names)
//!     → router.rs (resolve names, dedupe, send)
//!     → destination channels, or default output, or delivery error
//! ```
//!
//! # Design Decisions
//! - Routers are built at startup, immutable at runtime
//! - Deterministic: same message always yields the same targets
//! - A channel named twice still receives the message once

pub mod router;
pub mod strategy;

pub use router::{MessageRouter, MAX_ROUTING_HOPS, ROUTING_HOPS_HEADER};
pub use strategy::{RouteFn, RoutingStrategy, RoutingTarget, Targets};
