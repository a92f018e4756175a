//! Client credential extraction (`client_id` / `client_secret`).
//!
//! Extraction never fails: missing or malformed input simply leaves the
//! corresponding half absent, and the grant validators decide which
//! `invalid_request` that becomes.

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurposeConfig, DecodePaddingMode, GeneralPurpose},
    Engine,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::fields::FieldBag;
use crate::request::OAuth2Request;

/// Length of the scheme name stripped from the `Authorization` header (`Basic`).
const AUTH_SCHEME_PREFIX_LEN: usize = 5;

/// Where a client sends its credentials.
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthentication {
    /// `client_id` / `client_secret` body fields.
    #[default]
    Body,
    /// HTTP Basic `Authorization` header.
    Header,
}

impl ClientAuthentication {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientAuthentication::Body => "body",
            ClientAuthentication::Header => "header",
        }
    }
}

impl std::str::FromStr for ClientAuthentication {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "body" => Ok(ClientAuthentication::Body),
            "header" => Ok(ClientAuthentication::Header),
            other => Err(format!("unknown client authentication mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientCredentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl ClientCredentials {
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            client_id: client_id.filter(|s| !s.is_empty()),
            client_secret: client_secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn from_body(body: &FieldBag) -> Self {
        Self::new(body.text_owned("client_id"), body.text_owned("client_secret"))
    }

    /// Decode `<scheme> base64(id:secret)`. Any malformation yields empty credentials.
    pub fn from_basic_header(header: Option<&str>) -> Self {
        header.and_then(decode_basic).unwrap_or_default()
    }

    pub fn extract<R: OAuth2Request + ?Sized>(mode: ClientAuthentication, req: &R) -> Self {
        match mode {
            ClientAuthentication::Body => Self::from_body(req.body()),
            ClientAuthentication::Header => Self::from_basic_header(req.authorization()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.client_id.is_none() && self.client_secret.is_none()
    }
}

/// Standard alphabet, padding optional.
const BASIC_PAYLOAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn decode_basic(header: &str) -> Option<ClientCredentials> {
    let encoded = header.get(AUTH_SCHEME_PREFIX_LEN..)?.trim();
    let decoded = BASIC_PAYLOAD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (id, secret) = decoded.split_once(':')?;
    Some(ClientCredentials::new(
        Some(id.to_string()),
        Some(secret.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RawRequest;
    use base64::engine::general_purpose::STANDARD;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn client_authentication_parses_case_insensitively() {
        assert_eq!(
            "Header".parse::<ClientAuthentication>(),
            Ok(ClientAuthentication::Header)
        );
        assert_eq!(
            " body ".parse::<ClientAuthentication>(),
            Ok(ClientAuthentication::Body)
        );
        assert!("basic".parse::<ClientAuthentication>().is_err());
    }

    #[test]
    fn header_with_id_and_secret() {
        let creds = ClientCredentials::from_basic_header(Some(&basic("id:secret")));
        assert_eq!(creds.client_id.as_deref(), Some("id"));
        assert_eq!(creds.client_secret.as_deref(), Some("secret"));
    }

    #[test]
    fn header_splits_on_first_colon_only() {
        let creds = ClientCredentials::from_basic_header(Some(&basic("id:se:cret")));
        assert_eq!(creds.client_id.as_deref(), Some("id"));
        assert_eq!(creds.client_secret.as_deref(), Some("se:cret"));
    }

    #[test]
    fn header_without_separator_yields_nothing() {
        let creds = ClientCredentials::from_basic_header(Some(&basic("idsecret")));
        assert!(creds.is_empty());
    }

    #[test]
    fn header_payload_padding_is_optional() {
        let creds = ClientCredentials::from_basic_header(Some("Basic aWQ6c2VjcmU"));
        assert_eq!(creds.client_id.as_deref(), Some("id"));
        assert_eq!(creds.client_secret.as_deref(), Some("secre"));

        let creds = ClientCredentials::from_basic_header(Some("Basic aWQ6c2VjcmU="));
        assert_eq!(creds.client_secret.as_deref(), Some("secre"));
    }

    #[test]
    fn malformed_headers_yield_nothing() {
        assert!(ClientCredentials::from_basic_header(None).is_empty());
        assert!(ClientCredentials::from_basic_header(Some("Bas")).is_empty());
        assert!(ClientCredentials::from_basic_header(Some("Basic !!!not-base64!!!")).is_empty());
        assert!(ClientCredentials::from_basic_header(Some("Basic ")).is_empty());
    }

    #[test]
    fn empty_halves_are_absent() {
        let creds = ClientCredentials::from_basic_header(Some(&basic(":secret")));
        assert_eq!(creds.client_id, None);
        assert_eq!(creds.client_secret.as_deref(), Some("secret"));

        let creds = ClientCredentials::from_basic_header(Some(&basic("id:")));
        assert_eq!(creds.client_id.as_deref(), Some("id"));
        assert_eq!(creds.client_secret, None);
    }

    #[test]
    fn body_mode_ignores_non_string_fields() {
        let body = FieldBag::new()
            .with("client_id", "app")
            .with("client_secret", 1234);
        let creds = ClientCredentials::from_body(&body);
        assert_eq!(creds.client_id.as_deref(), Some("app"));
        assert_eq!(creds.client_secret, None);
    }

    #[test]
    fn extract_follows_the_configured_mode() {
        let req = RawRequest::post()
            .with_body(
                FieldBag::new()
                    .with("client_id", "body_id")
                    .with("client_secret", "body_secret"),
            )
            .with_header("Authorization", basic("header_id:header_secret"));

        let body = ClientCredentials::extract(ClientAuthentication::Body, &req);
        assert_eq!(body.client_id.as_deref(), Some("body_id"));

        let header = ClientCredentials::extract(ClientAuthentication::Header, &req);
        assert_eq!(header.client_id.as_deref(), Some("header_id"));
        assert_eq!(header.client_secret.as_deref(), Some("header_secret"));
    }
}
