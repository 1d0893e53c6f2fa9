//! HTTP outbound subsystem.
//!
//! # Data Flow
//! ```text
//! Message
//!     → handler.rs (outbound gateway entry point)
//!     → encoder.rs (classify payload → content type + body)
//!     → client.rs (HttpClient trait; reqwest renders the body)
//!         → form.rs (urlencoded / multipart wire rendering)
//!     → response → reply message on output channel (optional)
//! ```
//!
//! # Design Decisions
//! - Encoding is a pure function of method and payload
//! - The client is a trait so tests can record requests without a network
//! - Client failures are wrapped with the URL and never retried

pub mod client;
pub mod encoder;
pub mod form;
pub mod handler;

pub use client::{ClientError, HttpClient, HttpResponse, ReqwestClient};
pub use encoder::{encode, ContentType, EncodedRequest, RequestBody};
pub use handler::HttpRequestExecutingHandler;
