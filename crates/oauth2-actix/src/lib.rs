//! Actix-web binding for OAuth2 grant-flow dispatch.
//!
//! This crate contains framework-specific code: the request
//! adapter, handler slots, route descriptors and the flow builders that
//! install routes into a [`actix_web::web::ServiceConfig`]. Validation and
//! error taxonomy live in `oauth2-core`.

pub mod flows;
pub mod handlers;
pub mod registry;
pub mod request;
pub mod respond;
pub mod routes;

pub use flows::{
    AuthorizationCodeFlow, ClientCredentialsFlow, OAuth2Flow, PasswordFlow, SchemeInfo,
};
pub use handlers::{BadRequestHandler, GrantHandler, HandlerFuture};
pub use registry::FlowRegistry;
pub use request::GrantRequest;
pub use respond::{authorization_unavailable, error_response};
pub use routes::{
    AuthorizationCodeTokenRoute, AuthorizationRoute, ClientCredentialsTokenRoute,
    PasswordTokenRoute, RefreshTokenRoute, TokenRoute,
};
