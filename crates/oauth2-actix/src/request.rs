use actix_web::{http::header, web, HttpRequest};
use url::form_urlencoded;

use oauth2_core::{FieldBag, OAuth2Request};

/// An inbound request as seen by grant handlers.
///
/// Wraps the original [`HttpRequest`] untouched, plus the decoded query string
/// and body fields the dispatcher validated.
#[derive(Clone)]
pub struct GrantRequest {
    http: HttpRequest,
    query: FieldBag,
    body: FieldBag,
}

impl GrantRequest {
    /// Decode query and body. JSON bodies are read as objects, every other body
    /// as `application/x-www-form-urlencoded`.
    pub fn new(http: HttpRequest, body: &web::Bytes) -> Self {
        let query = parse_pairs(http.query_string().as_bytes());
        let body = if body.is_empty() {
            FieldBag::new()
        } else if is_json(&http) {
            serde_json::from_slice(body)
                .map(FieldBag::from_json)
                .unwrap_or_default()
        } else {
            parse_pairs(body)
        };
        Self { http, query, body }
    }

    pub fn http(&self) -> &HttpRequest {
        &self.http
    }

    pub fn into_http(self) -> HttpRequest {
        self.http
    }

    pub fn query_fields(&self) -> &FieldBag {
        &self.query
    }

    pub fn body_fields(&self) -> &FieldBag {
        &self.body
    }
}

impl std::fmt::Debug for GrantRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Body fields may carry secrets.
        f.debug_struct("GrantRequest")
            .field("method", self.http.method())
            .field("path", &self.http.path())
            .finish_non_exhaustive()
    }
}

impl OAuth2Request for GrantRequest {
    fn method(&self) -> &str {
        self.http.method().as_str()
    }

    fn query(&self) -> &FieldBag {
        &self.query
    }

    fn body(&self) -> &FieldBag {
        &self.body
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.http.headers().get(name).and_then(|v| v.to_str().ok())
    }
}

fn parse_pairs(input: &[u8]) -> FieldBag {
    FieldBag::from_pairs(
        form_urlencoded::parse(input).map(|(k, v)| (k.into_owned(), v.into_owned())),
    )
}

fn is_json(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}
