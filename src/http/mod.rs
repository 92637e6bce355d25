//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, relay_handler)
//!     → request.rs (request ID generation and propagation)
//!     → relay::Normalizer → relay::Forwarder
//!     → response.rs (CORS headers, content type, error rendering)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_id, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
