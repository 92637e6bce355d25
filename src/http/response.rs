//! Response rendering.
//!
//! # Responsibilities
//! - Wrap the target's streamed body with CORS headers and its content type
//! - Render relay errors as plain text
//!
//! # Design Decisions
//! - Success status is a fixed 200 unless status propagation is enabled
//! - Error responses carry CORS headers only when configured to

use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::relay::{OutboundResult, RelayError};

/// Preflight cache lifetime advertised to browsers.
pub const CORS_MAX_AGE: &str = "86400";

/// Build the caller-facing response for a successful outbound call.
pub fn relay_response(origin: &str, outbound: OutboundResult, propagate_status: bool) -> Response {
    let mut response = Response::new(outbound.body);
    if propagate_status {
        *response.status_mut() = outbound.status;
    }

    let headers = response.headers_mut();
    insert_cors(headers, origin);
    if let Some(content_type) = outbound.content_type {
        headers.insert(CONTENT_TYPE, content_type);
    }
    response
}

/// Plain-text error response. `cors_origin` is set only when error
/// responses should be readable cross-origin.
pub fn error_response(err: &RelayError, cors_origin: Option<&str>) -> Response {
    let mut response = (err.status(), err.to_string()).into_response();
    if let Some(origin) = cors_origin {
        insert_cors(response.headers_mut(), origin);
    }
    response
}

fn insert_cors(headers: &mut HeaderMap, origin: &str) {
    let origin = HeaderValue::from_str(origin).unwrap_or(HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(CORS_MAX_AGE));
}
