//! Relay error taxonomy.
//!
//! Every kind renders as a plain-text message. Status mapping lives in
//! [`RelayError::status`] so the HTTP layer never inspects variants itself.

use axum::http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Which stage rejected the caller's headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFault {
    /// GET `headers` parameter was not valid JSON.
    Unparseable,
    /// Headers were not a flat object of string values.
    NotAMapping,
}

impl fmt::Display for HeaderFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderFault::Unparseable => write!(f, "headers not valid"),
            HeaderFault::NotAMapping => write!(f, "Headers not valid"),
        }
    }
}

/// Rejections produced while turning an inbound request into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Method not implemented")]
    UnsupportedMethod,

    #[error("URL not found")]
    MissingUrl,

    #[error("URL not valid")]
    InvalidUrl,

    #[error("GET method can't has body")]
    BodyNotAllowed,

    #[error("{0}")]
    InvalidHeaders(HeaderFault),

    #[error("URI malformed")]
    MalformedEncoding,

    #[error("{0}")]
    MalformedPayload(String),
}

/// Any failure between receiving the inbound request and streaming the answer.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Request with GET/HEAD method cannot have body")]
    BodyWithoutPayloadVerb,

    #[error("{0}")]
    Network(#[from] reqwest::Error),
}

impl RelayError {
    /// Status sent back to the caller. Every kind is a client-facing 400.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::InvalidMethod(_) => "invalid_method",
            RelayError::InvalidHeader(_) => "invalid_header",
            RelayError::BodyWithoutPayloadVerb => "body_not_allowed",
            RelayError::Network(_) => "network",
        }
    }
}
