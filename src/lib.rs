//! OAuth2 grant-flow request dispatching for Actix-web applications.
//!
//! Re-exports the workspace crates so applications depend on one crate:
//! - `oauth2-core`: validation, dispatch decisions, error taxonomy
//! - `oauth2-actix`: flow builders, route descriptors, handler slots
//! - `oauth2-config`, `oauth2-observability`, `oauth2-openapi`: ambient support

pub use oauth2_actix::{
    authorization_unavailable, error_response, AuthorizationCodeFlow,
    AuthorizationCodeTokenRoute, AuthorizationRoute, BadRequestHandler, ClientCredentialsFlow,
    ClientCredentialsTokenRoute, FlowRegistry, GrantHandler, GrantRequest, OAuth2Flow,
    PasswordFlow, PasswordTokenRoute, RefreshTokenRoute, SchemeInfo, TokenRoute,
};
pub use oauth2_config::{Config, ConfigError};
pub use oauth2_core::{
    pkce, AuthorizationCodeTokenParams, AuthorizationParams, ClientAuthentication,
    ClientCredentialsTokenParams, DocumentedGrant, GrantType, OAuth2Error, OAuth2ErrorKind,
    PasswordTokenParams, RefreshTokenParams, SecurityDescriptor, TokenResponse,
    UnsafeRefreshTokenParams,
};
pub use oauth2_observability::{encode_prometheus_text, init_telemetry, DispatchOutcome, Metrics};
pub use oauth2_openapi::{openapi_for, ApiDoc, SecuritySchemes};

/// OpenAPI document for the flows a configuration describes.
pub fn openapi_from_config(config: &Config) -> utoipa::openapi::OpenApi {
    openapi_for(&FlowRegistry::from_config(config, None).descriptors())
}
