//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handler, forwarder, lifecycle
//!     → tracing events with structured fields (request_id, url, status)
//!     → logging.rs subscriber (pretty or JSON on stdout)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request via the trace span
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
