//! Validated, typed grant parameters.
//!
//! Values of these types only exist once every structural check for their
//! grant has passed, so handlers can rely on required fields being present
//! and non-empty.

use serde::Serialize;

use super::grant::GrantType;

/// Authorization-Code grant, authorization step (`GET`/`POST` on the authorization URL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationParams {
    pub client_id: String,
    pub response_type: String,
    pub redirect_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
}

/// Authorization-Code grant, code-for-token exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationCodeTokenParams {
    pub grant_type: GrantType,
    pub code: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Resource Owner Password Credentials grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordTokenParams {
    pub grant_type: GrantType,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Client Credentials grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCredentialsTokenParams {
    pub grant_type: GrantType,
    pub client_id: String,
    pub client_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Refresh Token grant for a confidential client (id and secret supplied).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshTokenParams {
    pub grant_type: GrantType,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Refresh Token grant where the client secret may be absent (public clients).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsafeRefreshTokenParams {
    pub grant_type: GrantType,
    pub refresh_token: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl From<RefreshTokenParams> for UnsafeRefreshTokenParams {
    fn from(params: RefreshTokenParams) -> Self {
        Self {
            grant_type: params.grant_type,
            refresh_token: params.refresh_token,
            client_id: params.client_id,
            client_secret: Some(params.client_secret),
            scope: params.scope,
        }
    }
}

/// Outcome of a successful refresh validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshGrant {
    /// Both client credential halves were supplied.
    Confidential(RefreshTokenParams),
    /// Only `client_id` was supplied and an unsafe handler is allowed to take it.
    Public(UnsafeRefreshTokenParams),
}

/// Any validated grant, discriminated by grant step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantParams {
    Authorization(AuthorizationParams),
    AuthorizationCode(AuthorizationCodeTokenParams),
    Password(PasswordTokenParams),
    ClientCredentials(ClientCredentialsTokenParams),
    RefreshToken(RefreshGrant),
}

impl GrantParams {
    /// Grant type of a token request; `None` for the authorization step.
    pub fn grant_type(&self) -> Option<GrantType> {
        match self {
            GrantParams::Authorization(_) => None,
            GrantParams::AuthorizationCode(_) => Some(GrantType::AuthorizationCode),
            GrantParams::Password(_) => Some(GrantType::Password),
            GrantParams::ClientCredentials(_) => Some(GrantType::ClientCredentials),
            GrantParams::RefreshToken(_) => Some(GrantType::RefreshToken),
        }
    }

    pub fn client_id(&self) -> &str {
        match self {
            GrantParams::Authorization(p) => &p.client_id,
            GrantParams::AuthorizationCode(p) => &p.client_id,
            GrantParams::Password(p) => &p.client_id,
            GrantParams::ClientCredentials(p) => &p.client_id,
            GrantParams::RefreshToken(RefreshGrant::Confidential(p)) => &p.client_id,
            GrantParams::RefreshToken(RefreshGrant::Public(p)) => &p.client_id,
        }
    }
}

impl From<AuthorizationParams> for GrantParams {
    fn from(params: AuthorizationParams) -> Self {
        GrantParams::Authorization(params)
    }
}

impl From<AuthorizationCodeTokenParams> for GrantParams {
    fn from(params: AuthorizationCodeTokenParams) -> Self {
        GrantParams::AuthorizationCode(params)
    }
}

impl From<PasswordTokenParams> for GrantParams {
    fn from(params: PasswordTokenParams) -> Self {
        GrantParams::Password(params)
    }
}

impl From<ClientCredentialsTokenParams> for GrantParams {
    fn from(params: ClientCredentialsTokenParams) -> Self {
        GrantParams::ClientCredentials(params)
    }
}

impl From<RefreshGrant> for GrantParams {
    fn from(grant: RefreshGrant) -> Self {
        GrantParams::RefreshToken(grant)
    }
}
