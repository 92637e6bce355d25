//! Relay core: request normalization and forwarding.
//!
//! # Data Flow
//! ```text
//! Inbound request (GET query or POST JSON)
//!     → normalize.rs (classify, parse, validate)
//!     → descriptor.rs (TargetDescriptor, validated and immutable)
//!     → forward.rs (outbound call, streamed response)
//!     → http layer renders the final response
//! ```
//!
//! # Design Decisions
//! - Both inbound encodings collapse into one descriptor type
//! - Validation runs once, after either parse path
//! - The preset table is built at startup and only ever read

pub mod descriptor;
pub mod error;
pub mod forward;
pub mod normalize;
pub mod preset;

pub use descriptor::{TargetDescriptor, TargetHeaders};
pub use error::{HeaderFault, RelayError, ValidationError};
pub use forward::{Forwarder, OutboundResult};
pub use normalize::{InboundRequest, Normalizer};
pub use preset::PresetTable;
