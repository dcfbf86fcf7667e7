//! Inbound event model

use bytes::Bytes;
use chrono::{DateTime, Utc};
use funcstack_core::InvocationId;
use std::collections::HashMap;

/// A single inbound request handed to a handler.
///
/// Built once per invocation by the host and never mutated by handler code.
/// Header keys are case-insensitive: they are stored lowercased and lookups
/// lowercase the requested name.
#[derive(Debug, Clone)]
pub struct Event {
    id: InvocationId,
    method: String,
    path: String,
    url: String,
    content_type: String,
    timestamp: DateTime<Utc>,
    headers: HashMap<String, String>,
    body: Bytes,
    fields: HashMap<String, String>,
}

impl Event {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: InvocationId::new(),
            method: method.into(),
            path: path.into(),
            url: String::new(),
            content_type: String::new(),
            timestamp: Utc::now(),
            headers: HashMap::new(),
            body: Bytes::new(),
            fields: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: InvocationId) -> Self {
        self.id = id;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn id(&self) -> &InvocationId {
        &self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Look up a header by name, case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text, if it is valid UTF-8
    pub fn body_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let event = Event::new("GET", "/").with_header("Content-Encoding", "gzip");

        assert_eq!(event.header("content-encoding"), Some("gzip"));
        assert_eq!(event.header("CONTENT-ENCODING"), Some("gzip"));
        assert_eq!(event.header("Content-Encoding"), Some("gzip"));
        assert_eq!(event.header("accept"), None);
    }

    #[test]
    fn test_builder() {
        let event = Event::new("POST", "/path/to/nowhere")
            .with_url("http://localhost/path/to/nowhere?x=1&y=2")
            .with_content_type("text/plain")
            .with_body("hello")
            .with_field("x", "1")
            .with_field("y", "2");

        assert_eq!(event.method(), "POST");
        assert_eq!(event.path(), "/path/to/nowhere");
        assert_eq!(event.body_utf8(), Some("hello"));
        assert_eq!(event.field("x"), Some("1"));
        assert_eq!(event.field("y"), Some("2"));
        assert_eq!(event.field("z"), None);
    }

    #[test]
    fn test_body_utf8_rejects_invalid_bytes() {
        let event = Event::new("POST", "/").with_body(vec![0xff, 0xfe]);
        assert_eq!(event.body_utf8(), None);
    }
}
