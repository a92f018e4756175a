//! Minimal request capability used by the dispatcher.

use crate::fields::FieldBag;

/// What the dispatcher needs from an inbound HTTP request.
///
/// Implemented by framework adapters; [`RawRequest`] is a plain owned
/// implementation for tests and non-HTTP embeddings.
pub trait OAuth2Request {
    /// HTTP method name, e.g. `"GET"`.
    fn method(&self) -> &str;
    fn query(&self) -> &FieldBag;
    fn body(&self) -> &FieldBag;
    /// Header lookup; names compare case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    fn is_get(&self) -> bool {
        self.method().eq_ignore_ascii_case("GET")
    }

    fn authorization(&self) -> Option<&str> {
        self.header("authorization")
    }
}

#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    method: String,
    query: FieldBag,
    body: FieldBag,
    headers: Vec<(String, String)>,
}

impl RawRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new("GET")
    }

    pub fn post() -> Self {
        Self::new("POST")
    }

    pub fn with_query(mut self, query: FieldBag) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: FieldBag) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl OAuth2Request for RawRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn query(&self) -> &FieldBag {
        &self.query
    }

    fn body(&self) -> &FieldBag {
        &self.body
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
