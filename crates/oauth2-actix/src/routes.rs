//! Route descriptors: a URL plus the handler slots configured for it.
//!
//! Descriptors are assembled once at startup. Setters exist for building
//! configuration incrementally, not for mutation while serving traffic.

use actix_web::HttpResponse;
use std::future::Future;

use oauth2_core::{
    AuthorizationCodeTokenParams, AuthorizationParams, ClientCredentialsTokenParams, OAuth2Error,
    PasswordTokenParams, RefreshTokenParams, UnsafeRefreshTokenParams,
};

use crate::handlers::{BadRequestHandler, GrantHandler};
use crate::request::GrantRequest;

pub const DEFAULT_AUTHORIZATION_URL: &str = "/oauth2/authorization";
pub const DEFAULT_TOKEN_URL: &str = "/oauth2/token";
pub const DEFAULT_REFRESH_TOKEN_URL: &str = "/oauth2/refresh_token";

/// A token URL and its handler slots.
#[derive(Debug, Clone)]
pub struct TokenRoute<P> {
    url: String,
    handler: Option<GrantHandler<P>>,
    bad_request_handler: Option<BadRequestHandler>,
}

pub type AuthorizationCodeTokenRoute = TokenRoute<AuthorizationCodeTokenParams>;
pub type PasswordTokenRoute = TokenRoute<PasswordTokenParams>;
pub type ClientCredentialsTokenRoute = TokenRoute<ClientCredentialsTokenParams>;

impl<P: 'static> TokenRoute<P> {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handler: None,
            bad_request_handler: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn with_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(P, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.handler = Some(GrantHandler::new(f));
        self
    }

    pub fn set_handler(&mut self, handler: Option<GrantHandler<P>>) -> &mut Self {
        self.handler = handler;
        self
    }

    pub fn handler(&self) -> Option<&GrantHandler<P>> {
        self.handler.as_ref()
    }

    pub fn with_bad_request_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(OAuth2Error, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.bad_request_handler = Some(BadRequestHandler::new(f));
        self
    }

    pub fn set_bad_request_handler(&mut self, handler: Option<BadRequestHandler>) -> &mut Self {
        self.bad_request_handler = handler;
        self
    }

    pub fn reset_bad_request_handler(&mut self) -> &mut Self {
        self.bad_request_handler = None;
        self
    }

    pub fn bad_request_handler(&self) -> Option<&BadRequestHandler> {
        self.bad_request_handler.as_ref()
    }
}

/// The authorization URL. `GET` and `POST` requests that validate go to
/// separate handlers.
#[derive(Debug, Clone)]
pub struct AuthorizationRoute {
    url: String,
    handler: Option<GrantHandler<AuthorizationParams>>,
    post_handler: Option<GrantHandler<AuthorizationParams>>,
    bad_request_handler: Option<BadRequestHandler>,
}

impl AuthorizationRoute {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handler: None,
            post_handler: None,
            bad_request_handler: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Handler for validated `GET` requests.
    pub fn with_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(AuthorizationParams, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.handler = Some(GrantHandler::new(f));
        self
    }

    /// Handler for validated `POST` requests (typically the consent form submission).
    pub fn with_post_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(AuthorizationParams, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.post_handler = Some(GrantHandler::new(f));
        self
    }

    pub fn set_handler(&mut self, handler: Option<GrantHandler<AuthorizationParams>>) -> &mut Self {
        self.handler = handler;
        self
    }

    pub fn set_post_handler(
        &mut self,
        handler: Option<GrantHandler<AuthorizationParams>>,
    ) -> &mut Self {
        self.post_handler = handler;
        self
    }

    pub fn handler(&self) -> Option<&GrantHandler<AuthorizationParams>> {
        self.handler.as_ref()
    }

    pub fn post_handler(&self) -> Option<&GrantHandler<AuthorizationParams>> {
        self.post_handler.as_ref()
    }

    pub fn with_bad_request_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(OAuth2Error, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.bad_request_handler = Some(BadRequestHandler::new(f));
        self
    }

    pub fn set_bad_request_handler(&mut self, handler: Option<BadRequestHandler>) -> &mut Self {
        self.bad_request_handler = handler;
        self
    }

    pub fn reset_bad_request_handler(&mut self) -> &mut Self {
        self.bad_request_handler = None;
        self
    }

    pub fn bad_request_handler(&self) -> Option<&BadRequestHandler> {
        self.bad_request_handler.as_ref()
    }
}

impl Default for AuthorizationRoute {
    fn default() -> Self {
        Self::new(DEFAULT_AUTHORIZATION_URL)
    }
}

/// The refresh URL, which may equal the owning flow's token URL.
///
/// `handler` serves confidential clients. `unsafe_handler` additionally
/// accepts requests without a `client_secret`; configuring it is what enables
/// secret-less refreshes.
#[derive(Debug, Clone)]
pub struct RefreshTokenRoute {
    url: String,
    handler: Option<GrantHandler<RefreshTokenParams>>,
    unsafe_handler: Option<GrantHandler<UnsafeRefreshTokenParams>>,
    bad_request_handler: Option<BadRequestHandler>,
}

impl RefreshTokenRoute {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handler: None,
            unsafe_handler: None,
            bad_request_handler: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn with_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(RefreshTokenParams, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.handler = Some(GrantHandler::new(f));
        self
    }

    pub fn with_unsafe_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(UnsafeRefreshTokenParams, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.unsafe_handler = Some(GrantHandler::new(f));
        self
    }

    pub fn set_handler(&mut self, handler: Option<GrantHandler<RefreshTokenParams>>) -> &mut Self {
        self.handler = handler;
        self
    }

    pub fn set_unsafe_handler(
        &mut self,
        handler: Option<GrantHandler<UnsafeRefreshTokenParams>>,
    ) -> &mut Self {
        self.unsafe_handler = handler;
        self
    }

    pub fn handler(&self) -> Option<&GrantHandler<RefreshTokenParams>> {
        self.handler.as_ref()
    }

    pub fn unsafe_handler(&self) -> Option<&GrantHandler<UnsafeRefreshTokenParams>> {
        self.unsafe_handler.as_ref()
    }

    pub fn with_bad_request_handler<F, Fut, E>(mut self, f: F) -> Self
    where
        F: Fn(OAuth2Error, GrantRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, E>> + 'static,
        E: Into<actix_web::Error> + 'static,
    {
        self.bad_request_handler = Some(BadRequestHandler::new(f));
        self
    }

    pub fn set_bad_request_handler(&mut self, handler: Option<BadRequestHandler>) -> &mut Self {
        self.bad_request_handler = handler;
        self
    }

    pub fn reset_bad_request_handler(&mut self) -> &mut Self {
        self.bad_request_handler = None;
        self
    }

    pub fn bad_request_handler(&self) -> Option<&BadRequestHandler> {
        self.bad_request_handler.as_ref()
    }
}

impl Default for RefreshTokenRoute {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_TOKEN_URL)
    }
}
