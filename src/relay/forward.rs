//! Outbound call to the target.
//!
//! # Responsibilities
//! - Translate a [`TargetDescriptor`] into a `reqwest` request
//! - Stream the target's body back without buffering
//! - Keep only the target's `Content-Type`

use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use crate::config::TimeoutConfig;
use crate::relay::descriptor::TargetDescriptor;
use crate::relay::error::RelayError;

/// Verbs a browser fetch upper-cases before sending.
const NORMALIZED_METHODS: [&str; 6] = ["DELETE", "GET", "HEAD", "OPTIONS", "POST", "PUT"];

/// What the target answered.
pub struct OutboundResult {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Body,
}

/// Issues outbound requests on behalf of callers.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    /// Build a forwarder with the configured connect and upstream timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = timeouts.upstream_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Send `target` and hand back the response as a live stream.
    pub async fn forward(&self, target: &TargetDescriptor) -> Result<OutboundResult, RelayError> {
        let method = outbound_method(target.method())?;

        let mut headers = HeaderMap::with_capacity(target.headers().len());
        for (name, value) in target.headers() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| RelayError::InvalidHeader(name.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| RelayError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        let mut request = self
            .client
            .request(method.clone(), target.url())
            .headers(headers);

        if let Some(body) = target.body() {
            if method == Method::GET || method == Method::HEAD {
                return Err(RelayError::BodyWithoutPayloadVerb);
            }
            request = request.body(body.to_owned());
        }

        tracing::debug!(method = %method, url = %target.url(), "Sending outbound request");

        let response = request.send().await?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).cloned();

        tracing::debug!(status = %status, url = %target.url(), "Outbound response received");

        Ok(OutboundResult {
            status,
            content_type,
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}

fn outbound_method(raw: &str) -> Result<Method, RelayError> {
    let normalized = if NORMALIZED_METHODS.iter().any(|m| m.eq_ignore_ascii_case(raw)) {
        raw.to_ascii_uppercase()
    } else {
        raw.to_owned()
    };
    Method::from_bytes(normalized.as_bytes()).map_err(|_| RelayError::InvalidMethod(raw.to_owned()))
}
