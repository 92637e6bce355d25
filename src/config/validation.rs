//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, payload limit > 0)
//! - Check that preset headers are sendable over HTTP
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ConfigViolation>>
//! - Runs before config is accepted into the system

use axum::http::{HeaderName, HeaderValue};
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("relay.user_agent must be a non-empty header value")]
    UserAgent,

    #[error("relay.max_payload_bytes must be greater than zero")]
    PayloadLimit,

    #[error("timeouts.{0} must be greater than zero")]
    Timeout(&'static str),

    #[error("preset name must not be empty")]
    EmptyPresetName,

    #[error("preset `{preset}` has invalid header `{header}`")]
    PresetHeader { preset: String, header: String },
}

/// Check `config` and collect every violation.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigViolation::BindAddress(config.listener.bind_address.clone()));
    }

    let user_agent = &config.relay.user_agent;
    if user_agent.is_empty() || HeaderValue::from_str(user_agent).is_err() {
        errors.push(ConfigViolation::UserAgent);
    }

    if config.relay.max_payload_bytes == 0 {
        errors.push(ConfigViolation::PayloadLimit);
    }

    if config.timeouts.connect_secs == Some(0) {
        errors.push(ConfigViolation::Timeout("connect_secs"));
    }
    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ConfigViolation::Timeout("upstream_secs"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ConfigViolation::Timeout("request_secs"));
    }

    for (name, overlay) in &config.presets {
        if name.is_empty() {
            errors.push(ConfigViolation::EmptyPresetName);
        }
        for (header, value) in overlay {
            if HeaderName::from_bytes(header.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                errors.push(ConfigViolation::PresetHeader {
                    preset: name.clone(),
                    header: header.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
