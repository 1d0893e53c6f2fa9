//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routers, channels, outbound handlers produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters per router / per outbound call)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Message id flows through every log event as a field
//! - Metrics are cheap counter increments; no exporter means no-op recorders

pub mod logging;
pub mod metrics;
