//! Configuration schema definitions.
//!
//! All types derive Serde traits and default every field, so an empty
//! config file yields the stock relay.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::relay::normalize::DEFAULT_USER_AGENT;
use crate::relay::preset::Overlay;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Relay behavior.
    pub relay: RelaySettings,

    /// Extra header presets, layered over the builtin table.
    pub presets: BTreeMap<String, Overlay>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration. Unset timeouts are not enforced.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outbound connection establishment timeout in seconds.
    pub connect_secs: Option<u64>,

    /// Total outbound request timeout in seconds, body included.
    pub upstream_secs: Option<u64>,

    /// Inbound timeout until response headers are ready, in seconds.
    pub request_secs: Option<u64>,
}

/// Relay behavior knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// User-Agent injected when the caller sends none.
    pub user_agent: String,

    /// Largest accepted POST payload in bytes.
    pub max_payload_bytes: usize,

    /// Answer with the target's status instead of a fixed 200.
    pub propagate_status: bool,

    /// Attach CORS headers to error responses too.
    pub cors_on_error: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_payload_bytes: 1024 * 1024,
            propagate_status: false,
            cors_on_error: false,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
