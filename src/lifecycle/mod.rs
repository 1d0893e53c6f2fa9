//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → queue channels → routers → outbound gateways
//!     → Flow (registry of every named channel)
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Routers resolve names lazily; gateway output channels are looked up
//!   eagerly, so gateways are built last

pub mod startup;

pub use startup::{build_flow, build_flow_with_client, Flow, StartupError};
