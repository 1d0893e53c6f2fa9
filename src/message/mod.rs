//! Message model.
//!
//! # Data Flow
//! ```text
//! Inbound event
//!     → MessageBuilder (payload + headers)
//!     → Message (immutable, shared by clone)
//!     → channel / router / http handler
//! ```
//!
//! # Design Decisions
//! - Payload is a closed sum type; handlers match on it exhaustively
//! - Headers are string-keyed and case-sensitive
//! - Every message gets a UUID v4 id at build time

pub mod envelope;
pub mod payload;

pub use envelope::{Message, MessageBuilder};
pub use payload::{FormData, MapKey, PackedArray, Payload, Value, XmlSource};
