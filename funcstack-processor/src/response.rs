//! Result shapes and response normalization
//!
//! Handlers can produce results in several shapes: a bare string, raw
//! bytes, a `[status, payload]` pair, a structured value, or a full
//! response descriptor. The normalizer folds every shape, plus raised
//! errors, into the single canonical response the host transport consumes.
//! Normalization is total: malformed shapes map to a deterministic 500
//! diagnostic instead of an error.

use bytes::Bytes;
use funcstack_core::HandlerError;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

use crate::invocation::TerminalEvent;

pub const CONTENT_TYPE_TEXT: &str = "text/plain";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Value returned by, or delivered from, handler code
#[derive(Debug, Clone, PartialEq)]
pub enum RawResult {
    /// No payload
    Empty,
    /// Bare string
    Text(String),
    /// Raw bytes
    Binary(Bytes),
    /// `[status, payload]` pair; the payload is re-normalized recursively
    StatusPair(u16, Box<RawResult>),
    /// Mapping or sequence, serialized as JSON
    Structured(Value),
    /// Full response descriptor
    Full(Response),
}

impl RawResult {
    /// Classify a dynamically-shaped value into a result variant.
    ///
    /// A two-element array is a `[status, payload]` pair when its first
    /// element is an integer representable as an HTTP status; any other
    /// array stays a structured value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::String(s) => Self::Text(s),
            Value::Array(items) => match into_status_pair(items) {
                Ok((status, payload)) => {
                    Self::StatusPair(status, Box::new(classify_payload(payload)))
                }
                Err(items) => Self::Structured(Value::Array(items)),
            },
            other => Self::Structured(other),
        }
    }
}

fn into_status_pair(mut items: Vec<Value>) -> Result<(u16, Value), Vec<Value>> {
    if items.len() != 2 {
        return Err(items);
    }
    let status = match &items[0] {
        Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
        _ => None,
    };
    match status {
        Some(status) => {
            let payload = items.pop().unwrap_or(Value::Null);
            Ok((status, payload))
        }
        None => Err(items),
    }
}

fn classify_payload(payload: Value) -> RawResult {
    match payload {
        Value::Null => RawResult::Empty,
        Value::String(s) => RawResult::Text(s),
        other => RawResult::Structured(other),
    }
}

impl From<String> for RawResult {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for RawResult {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Bytes> for RawResult {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

impl From<Value> for RawResult {
    fn from(value: Value) -> Self {
        Self::Structured(value)
    }
}

impl From<Response> for RawResult {
    fn from(response: Response) -> Self {
        Self::Full(response)
    }
}

impl From<(u16, &str)> for RawResult {
    fn from((status, s): (u16, &str)) -> Self {
        Self::StatusPair(status, Box::new(Self::Text(s.to_string())))
    }
}

impl From<(u16, String)> for RawResult {
    fn from((status, s): (u16, String)) -> Self {
        Self::StatusPair(status, Box::new(Self::Text(s)))
    }
}

impl From<(u16, Value)> for RawResult {
    fn from((status, value): (u16, Value)) -> Self {
        Self::StatusPair(status, Box::new(classify_payload(value)))
    }
}

/// Body payload on a [`Response`] descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    #[default]
    Empty,
    Text(String),
    Binary(Bytes),
    Json(Value),
}

impl From<&str> for ResponseBody {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ResponseBody {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Bytes> for ResponseBody {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Response descriptor a handler can return to control every field of the
/// wire response. All fields are optional; a missing content type is
/// derived from the body shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: ResponseBody,
    pub headers: HashMap<String, String>,
    pub content_type: Option<String>,
    pub status_code: u16,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            body: ResponseBody::Empty,
            headers: HashMap::new(),
            content_type: None,
            status_code: 200,
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: impl Into<ResponseBody>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }
}

/// Result shape that matches none of the variant rules
#[derive(Debug, Clone, Error)]
pub enum MalformedResultError {
    #[error("status pair payload must be a string, bytes or a structured value")]
    UnsupportedPairPayload,

    #[error("cannot serialize structured result: {0}")]
    Serialization(String),
}

/// The canonical wire response
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub content_type: String,
    pub body: Bytes,
}

impl Default for CanonicalResponse {
    fn default() -> Self {
        Self {
            status_code: 200,
            headers: HashMap::new(),
            content_type: CONTENT_TYPE_TEXT.to_string(),
            body: Bytes::new(),
        }
    }
}

impl CanonicalResponse {
    fn text(status_code: u16, body: Bytes) -> Self {
        Self {
            status_code,
            body,
            ..Default::default()
        }
    }

    fn json(status_code: u16, body: Bytes) -> Self {
        Self {
            status_code,
            content_type: CONTENT_TYPE_JSON.to_string(),
            body,
            ..Default::default()
        }
    }
}

/// Convert a terminal event into the canonical response.
///
/// Total over every input: handler errors become 500-class responses (or
/// the status the error carries) and malformed shapes become a 500
/// diagnostic, so the host can always produce a wire response.
pub fn normalize(terminal: TerminalEvent) -> CanonicalResponse {
    match terminal {
        TerminalEvent::Returned(raw) | TerminalEvent::Delivered(raw) => from_raw(raw),
        TerminalEvent::Failed(err) => from_error(&err),
    }
}

fn from_raw(raw: RawResult) -> CanonicalResponse {
    match raw {
        RawResult::Empty => CanonicalResponse::text(200, Bytes::new()),
        RawResult::Text(s) => CanonicalResponse::text(200, Bytes::from(s)),
        RawResult::Binary(b) => CanonicalResponse::text(200, b),
        RawResult::StatusPair(status, payload) => from_pair(status, *payload),
        RawResult::Structured(value) => match serialize_json(&value) {
            Ok(body) => CanonicalResponse::json(200, body),
            Err(err) => diagnostic(&err),
        },
        RawResult::Full(response) => from_descriptor(response),
    }
}

fn from_pair(status_code: u16, payload: RawResult) -> CanonicalResponse {
    match payload {
        RawResult::Empty => CanonicalResponse::text(status_code, Bytes::new()),
        RawResult::Text(s) => CanonicalResponse::text(status_code, Bytes::from(s)),
        RawResult::Binary(b) => CanonicalResponse::text(status_code, b),
        RawResult::Structured(value) => match serialize_json(&value) {
            Ok(body) => CanonicalResponse::json(status_code, body),
            Err(err) => diagnostic(&err),
        },
        RawResult::StatusPair(..) | RawResult::Full(..) => {
            diagnostic(&MalformedResultError::UnsupportedPairPayload)
        }
    }
}

fn from_descriptor(response: Response) -> CanonicalResponse {
    let content_type = response.content_type.unwrap_or_else(|| {
        match &response.body {
            ResponseBody::Json(_) => CONTENT_TYPE_JSON,
            _ => CONTENT_TYPE_TEXT,
        }
        .to_string()
    });
    let body = match response.body {
        ResponseBody::Empty => Bytes::new(),
        ResponseBody::Text(s) => Bytes::from(s),
        ResponseBody::Binary(b) => b,
        ResponseBody::Json(value) => match serialize_json(&value) {
            Ok(body) => body,
            Err(err) => return diagnostic(&err),
        },
    };
    CanonicalResponse {
        status_code: response.status_code,
        headers: response.headers,
        content_type,
        body,
    }
}

fn from_error(err: &HandlerError) -> CanonicalResponse {
    CanonicalResponse::text(err.status_code.unwrap_or(500), Bytes::from(err.to_string()))
}

fn serialize_json(value: &Value) -> Result<Bytes, MalformedResultError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|err| MalformedResultError::Serialization(err.to_string()))
}

fn diagnostic(err: &MalformedResultError) -> CanonicalResponse {
    CanonicalResponse::text(500, Bytes::from(format!("malformed handler result: {err}")))
}
