//! Request normalization.
//!
//! # Responsibilities
//! - Classify the inbound request by its encoding (query string or JSON body)
//! - Parse either encoding into the same raw target
//! - Validate the raw target and produce a [`TargetDescriptor`]
//! - Inject the default User-Agent and apply preset overlays
//!
//! # Design Decisions
//! - Rules run in a fixed order and the first failure wins
//! - Header shape is checked by decoding into a typed map, not by inspection
//! - Unknown preset names are ignored

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::Value;

use crate::relay::descriptor::{TargetDescriptor, TargetHeaders};
use crate::relay::error::{HeaderFault, ValidationError};
use crate::relay::preset::PresetTable;

/// User-Agent sent when the caller does not provide one.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.0.0 Safari/537.36";

const USER_AGENT_KEY: &str = "User-Agent";
const DEFAULT_METHOD: &str = "GET";
const ANY_ORIGIN: &str = "*";

/// How the caller encoded its target description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Fields carried as query parameters on a GET.
    Query,
    /// Fields carried as a JSON object in a POST body.
    Json,
}

impl Encoding {
    /// Pick the encoding from the inbound verb, ignoring letter case.
    pub fn for_method(method: &str) -> Result<Self, ValidationError> {
        if method.eq_ignore_ascii_case("GET") {
            Ok(Encoding::Query)
        } else if method.eq_ignore_ascii_case("POST") {
            Ok(Encoding::Json)
        } else {
            Err(ValidationError::UnsupportedMethod)
        }
    }
}

/// An inbound request, reduced to the part that describes the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundRequest {
    GetEncoded { query: String },
    PostEncoded { payload: Vec<u8> },
}

/// Target fields as parsed, before any validation.
#[derive(Debug)]
struct RawTarget {
    url: String,
    method: String,
    body: String,
    headers: Value,
    preset: String,
}

impl Default for RawTarget {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: DEFAULT_METHOD.to_string(),
            body: String::new(),
            headers: Value::Object(Default::default()),
            preset: String::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostPayload {
    url: Option<Value>,
    method: Option<Value>,
    body: Option<Value>,
    headers: Option<Value>,
    preset: Option<Value>,
}

/// Turns inbound requests into validated descriptors.
#[derive(Debug, Clone)]
pub struct Normalizer {
    presets: Arc<PresetTable>,
    user_agent: String,
}

impl Normalizer {
    pub fn new(presets: Arc<PresetTable>, user_agent: impl Into<String>) -> Self {
        Self {
            presets,
            user_agent: user_agent.into(),
        }
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Parse and validate `inbound`. `origin` is the caller's `Origin` header.
    pub fn normalize(
        &self,
        origin: Option<&str>,
        inbound: &InboundRequest,
    ) -> Result<TargetDescriptor, ValidationError> {
        let raw = match inbound {
            InboundRequest::GetEncoded { query } => parse_query(query)?,
            InboundRequest::PostEncoded { payload } => parse_payload(payload)?,
        };
        let origin = origin
            .filter(|o| !o.is_empty())
            .unwrap_or(ANY_ORIGIN)
            .to_string();
        self.validate(origin, raw)
    }

    fn validate(&self, origin: String, raw: RawTarget) -> Result<TargetDescriptor, ValidationError> {
        if raw.url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        if !(raw.url.starts_with("http://") || raw.url.starts_with("https://")) {
            return Err(ValidationError::InvalidUrl);
        }
        if raw.method == DEFAULT_METHOD && !raw.body.is_empty() {
            return Err(ValidationError::BodyNotAllowed);
        }

        let mut headers: TargetHeaders = serde_json::from_value(raw.headers)
            .map_err(|_| ValidationError::InvalidHeaders(HeaderFault::NotAMapping))?;

        if headers.get(USER_AGENT_KEY).map_or(true, String::is_empty) {
            headers.insert(USER_AGENT_KEY.to_string(), self.user_agent.clone());
        }

        if let Some(overlay) = self.presets.get(&raw.preset) {
            // Header names are case-insensitive on the wire; drop any caller
            // spelling of an overlay key so the overlay value is the one sent.
            headers.retain(|name, _| !overlay.keys().any(|key| key.eq_ignore_ascii_case(name)));
            headers.extend(overlay.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        Ok(TargetDescriptor::new(origin, raw.url, raw.method, raw.body, headers))
    }
}

fn parse_query(query: &str) -> Result<RawTarget, ValidationError> {
    // First occurrence of a repeated parameter wins.
    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }

    let mut raw = RawTarget::default();
    if let Some(url) = params.get("url") {
        raw.url = decode_component(url)?;
    }
    if let Some(method) = params.get("method") {
        raw.method = method.clone();
    }
    if let Some(body) = params.get("body") {
        raw.body = decode_component(body)?;
    }
    if let Some(headers) = params.get("headers") {
        let decoded = decode_component(headers)
            .map_err(|_| ValidationError::InvalidHeaders(HeaderFault::Unparseable))?;
        raw.headers = serde_json::from_str(&decoded)
            .map_err(|_| ValidationError::InvalidHeaders(HeaderFault::Unparseable))?;
    }
    if let Some(preset) = params.get("preset") {
        raw.preset = decode_component(preset)?;
    }
    Ok(raw)
}

fn parse_payload(payload: &[u8]) -> Result<RawTarget, ValidationError> {
    let payload: PostPayload = serde_json::from_slice(payload)
        .map_err(|e| ValidationError::MalformedPayload(e.to_string()))?;

    let mut raw = RawTarget::default();
    if let Some(url) = text_field("url", payload.url)? {
        raw.url = url;
    }
    if let Some(method) = text_field("method", payload.method)? {
        raw.method = method;
    }
    if let Some(body) = text_field("body", payload.body)? {
        raw.body = body;
    }
    if let Some(headers) = payload.headers.filter(is_truthy) {
        raw.headers = headers;
    }
    if let Some(preset) = text_field("preset", payload.preset)? {
        raw.preset = preset;
    }
    Ok(raw)
}

/// A falsy field counts as absent. Truthy scalars are read as text the way a
/// browser would stringify them; arrays and objects are rejected.
fn text_field(name: &str, value: Option<Value>) -> Result<Option<String>, ValidationError> {
    match value.filter(is_truthy) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(ValidationError::MalformedPayload(format!(
            "field `{}` must be a string",
            name
        ))),
    }
}

/// JSON values a browser would treat as "present" in a conditional.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Strict percent-decoding: a `%` must start a two-digit hex escape and the
/// result must be UTF-8.
fn decode_component(input: &str) -> Result<String, ValidationError> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3).ok_or(ValidationError::MalformedEncoding)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return Err(ValidationError::MalformedEncoding);
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(input)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| ValidationError::MalformedEncoding)
}
