use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[cfg(feature = "actix")]
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// The closed OAuth2 error vocabulary (RFC 6749 §5.2 plus RFC 6750's `invalid_token`).
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuth2ErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    InvalidScope,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidToken,
}

impl OAuth2ErrorKind {
    pub const ALL: [OAuth2ErrorKind; 7] = [
        OAuth2ErrorKind::InvalidRequest,
        OAuth2ErrorKind::InvalidClient,
        OAuth2ErrorKind::InvalidGrant,
        OAuth2ErrorKind::InvalidScope,
        OAuth2ErrorKind::UnauthorizedClient,
        OAuth2ErrorKind::UnsupportedGrantType,
        OAuth2ErrorKind::InvalidToken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OAuth2ErrorKind::InvalidRequest => "invalid_request",
            OAuth2ErrorKind::InvalidClient => "invalid_client",
            OAuth2ErrorKind::InvalidGrant => "invalid_grant",
            OAuth2ErrorKind::InvalidScope => "invalid_scope",
            OAuth2ErrorKind::UnauthorizedClient => "unauthorized_client",
            OAuth2ErrorKind::UnsupportedGrantType => "unsupported_grant_type",
            OAuth2ErrorKind::InvalidToken => "invalid_token",
        }
    }
}

impl fmt::Display for OAuth2ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OAuth2ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown OAuth2 error kind '{}'", s))
    }
}

/// Wire-level rejection payload: `{error, error_description?, error_uri?}`.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OAuth2Error {
    pub error: OAuth2ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,
}

impl OAuth2Error {
    pub fn new(error: OAuth2ErrorKind, description: Option<&str>) -> Self {
        Self {
            error,
            error_description: description.map(|s| s.to_string()),
            error_uri: None,
        }
    }

    pub fn kind(&self) -> OAuth2ErrorKind {
        self.error
    }

    pub fn invalid_request(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::InvalidRequest, Some(description))
    }

    pub fn invalid_client(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::InvalidClient, Some(description))
    }

    pub fn invalid_grant(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::InvalidGrant, Some(description))
    }

    pub fn invalid_scope(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::InvalidScope, Some(description))
    }

    pub fn unauthorized_client(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::UnauthorizedClient, Some(description))
    }

    pub fn unsupported_grant_type(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::UnsupportedGrantType, Some(description))
    }

    pub fn invalid_token(description: &str) -> Self {
        Self::new(OAuth2ErrorKind::InvalidToken, Some(description))
    }

    /// `invalid_request` for a required parameter that is absent or not a string.
    pub fn missing_parameter(name: &str) -> Self {
        Self::invalid_request(&format!("Request was missing the '{}' parameter.", name))
    }

    /// `unsupported_grant_type` echoing the received `grant_type` value.
    pub fn unsupported_grant_type_value(received: &str) -> Self {
        Self::unsupported_grant_type(&format!(
            "Request does not support the 'grant_type' '{}'.",
            received
        ))
    }

    /// `invalid_request` echoing the received `response_type` value.
    pub fn unsupported_response_type(received: &str) -> Self {
        Self::invalid_request(&format!(
            "Request does not support the 'response_type' '{}'.",
            received
        ))
    }

    /// Answer for a well-formed request that no handler is configured to serve.
    ///
    /// The closed vocabulary has no "not implemented" kind, so this surfaces as
    /// `unauthorized_client` without a description.
    pub fn handler_unavailable() -> Self {
        Self::new(OAuth2ErrorKind::UnauthorizedClient, None)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.error_description = Some(description.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.error_uri = Some(uri.into());
        self
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.error_description = description;
        self
    }

    pub fn set_uri(&mut self, uri: Option<String>) -> &mut Self {
        self.error_uri = uri;
        self
    }
}

impl From<OAuth2ErrorKind> for OAuth2Error {
    fn from(kind: OAuth2ErrorKind) -> Self {
        Self::new(kind, None)
    }
}

impl fmt::Display for OAuth2Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {}", self.error, description),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuth2Error {}

#[cfg(feature = "actix")]
impl ResponseError for OAuth2Error {
    fn status_code(&self) -> StatusCode {
        match self.error {
            OAuth2ErrorKind::InvalidClient | OAuth2ErrorKind::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}
