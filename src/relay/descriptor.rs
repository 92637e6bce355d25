//! Canonical description of the outbound request.

use std::collections::BTreeMap;

/// Outbound headers, keyed by the exact name the caller supplied.
pub type TargetHeaders = BTreeMap<String, String>;

/// A fully validated outbound request.
///
/// Only [`Normalizer`](super::Normalizer) builds these, so holding one means
/// every validation rule has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    origin: String,
    url: String,
    method: String,
    body: Option<String>,
    headers: TargetHeaders,
}

impl TargetDescriptor {
    pub(crate) fn new(
        origin: String,
        url: String,
        method: String,
        body: String,
        headers: TargetHeaders,
    ) -> Self {
        Self {
            origin,
            url,
            method,
            body: (!body.is_empty()).then_some(body),
            headers,
        }
    }

    /// Caller origin echoed in `Access-Control-Allow-Origin`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Outbound body; `None` when the caller sent nothing.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn headers(&self) -> &TargetHeaders {
        &self.headers
    }
}
