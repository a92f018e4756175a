use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::credentials::ClientAuthentication;

/// Grant flavour advertised to documentation consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentedGrant {
    AuthorizationCode,
    AuthorizationCodeWithPkce,
    Password,
    ClientCredentials,
}

/// Documentation-only projection of a configured flow.
///
/// Produced by flow builders, consumed by a documentation generator to render
/// an OpenAPI security scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDescriptor {
    pub scheme_name: String,
    pub grant_type: DocumentedGrant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    pub token_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    /// Scope name to short description. May be empty.
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub client_authentication: ClientAuthentication,
}

impl SecurityDescriptor {
    pub fn new(
        scheme_name: impl Into<String>,
        grant_type: DocumentedGrant,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            scheme_name: scheme_name.into(),
            grant_type,
            authorization_url: None,
            token_url: token_url.into(),
            refresh_url: None,
            scopes: BTreeMap::new(),
            description: None,
            client_authentication: ClientAuthentication::default(),
        }
    }

    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = Some(url.into());
        self
    }

    pub fn with_refresh_url(mut self, url: Option<String>) -> Self {
        self.refresh_url = url;
        self
    }

    pub fn with_scopes(mut self, scopes: BTreeMap<String, String>) -> Self {
        self.scopes = scopes;
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_client_authentication(mut self, mode: ClientAuthentication) -> Self {
        self.client_authentication = mode;
        self
    }
}
