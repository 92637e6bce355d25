//! CORS relay library.
//!
//! Accepts a target description (GET query or POST JSON), forwards the
//! request and streams the answer back with permissive CORS headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
