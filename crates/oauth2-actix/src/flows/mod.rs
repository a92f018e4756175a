//! Per-grant flow builders.
//!
//! A flow owns the route descriptors of one OAuth2 security scheme, installs
//! them into an actix [`ServiceConfig`](web::ServiceConfig) and exports the
//! scheme's [`SecurityDescriptor`].

mod authorization_code;
mod client_credentials;
mod password;

pub use authorization_code::AuthorizationCodeFlow;
pub use client_credentials::ClientCredentialsFlow;
pub use password::PasswordFlow;

use actix_web::{web, HttpRequest, HttpResponse, Route};
use std::collections::BTreeMap;
use std::future::Future;

use oauth2_core::{
    dispatch_refresh, OAuth2Error, RefreshBinding, RefreshGrant, Rejection, RouteRole,
    SecurityDescriptor, TokenOutcome,
};
use oauth2_observability::Metrics;

use crate::request::GrantRequest;
use crate::respond::{error_response, reject};
use crate::routes::{RefreshTokenRoute, TokenRoute};

const REFRESH_GRANT: &str = "refresh_token";

/// An OAuth2 security scheme that can serve its endpoints and describe itself.
pub trait OAuth2Flow: Send + Sync {
    fn scheme(&self) -> &SchemeInfo;

    fn scheme_mut(&mut self) -> &mut SchemeInfo;

    /// Documentation projection of the configured scheme.
    fn descriptor(&self) -> SecurityDescriptor;

    /// Install this flow's routes.
    fn configure(&self, cfg: &mut web::ServiceConfig);

    fn scheme_name(&self) -> &str {
        &self.scheme().name
    }

    fn with_description(mut self, description: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.scheme_mut().description = Some(description.into());
        self
    }

    /// Replace the scope map (scope name to short description). May be empty.
    fn with_scopes<I, K, V>(mut self, scopes: I) -> Self
    where
        Self: Sized,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.scheme_mut().scopes = scopes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    fn with_scope(mut self, name: impl Into<String>, description: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.scheme_mut()
            .scopes
            .insert(name.into(), description.into());
        self
    }
}

/// Naming and documentation shared by every flow.
#[derive(Debug, Clone, Default)]
pub struct SchemeInfo {
    pub name: String,
    pub description: Option<String>,
    pub scopes: BTreeMap<String, String>,
}

impl SchemeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Logging and metrics for dispatch outcomes.
#[derive(Clone, Default)]
pub(crate) struct Telemetry {
    metrics: Option<Metrics>,
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl Telemetry {
    pub(crate) fn new(metrics: Option<Metrics>) -> Self {
        Self { metrics }
    }

    pub(crate) fn dispatched(&self, grant: &str, route: RouteRole) {
        tracing::debug!(grant, route = route.as_str(), "dispatching validated OAuth2 request");
        if let Some(m) = &self.metrics {
            m.record_dispatched(grant);
        }
    }

    pub(crate) fn rejected(&self, grant: &str, rejection: &Rejection) {
        tracing::debug!(
            grant,
            route = rejection.route.as_str(),
            error = %rejection.error.error,
            description = ?rejection.error.error_description,
            "rejected OAuth2 request"
        );
        if let Some(m) = &self.metrics {
            m.record_rejected(grant, rejection.error.error);
        }
    }

    pub(crate) fn unconfigured(&self, grant: &str, route: RouteRole) {
        tracing::warn!(
            grant,
            route = route.as_str(),
            "no handler configured for a valid OAuth2 request"
        );
        if let Some(m) = &self.metrics {
            m.record_unconfigured(grant);
        }
    }
}

/// A `POST` route decoding the request into a [`GrantRequest`] before calling `f`.
pub(crate) fn post_route<F, Fut>(f: F) -> Route
where
    F: Fn(GrantRequest) -> Fut + Clone + 'static,
    Fut: Future<Output = Result<HttpResponse, actix_web::Error>> + 'static,
{
    web::post().to(move |req: HttpRequest, body: web::Bytes| f(GrantRequest::new(req, &body)))
}

/// Like [`post_route`] for `GET`.
pub(crate) fn get_route<F, Fut>(f: F) -> Route
where
    F: Fn(GrantRequest) -> Fut + Clone + 'static,
    Fut: Future<Output = Result<HttpResponse, actix_web::Error>> + 'static,
{
    web::get().to(move |req: HttpRequest, body: web::Bytes| f(GrantRequest::new(req, &body)))
}

pub(crate) fn refresh_binding(
    token_url: &str,
    refresh: Option<&RefreshTokenRoute>,
    client_authentication: oauth2_core::ClientAuthentication,
) -> Option<RefreshBinding> {
    refresh.map(|route| RefreshBinding {
        shared_url: route.url() == token_url,
        allow_unsafe: route.unsafe_handler().is_some(),
        client_authentication,
    })
}

/// Answer a token-URL outcome: hand valid parameters to the configured
/// handler, or hand the rejection to the owning route.
pub(crate) async fn serve_token<P: 'static>(
    grant: &str,
    req: GrantRequest,
    outcome: TokenOutcome<P>,
    token: &TokenRoute<P>,
    refresh: Option<&RefreshTokenRoute>,
    telemetry: &Telemetry,
) -> Result<HttpResponse, actix_web::Error> {
    match outcome {
        TokenOutcome::Grant(params) => match token.handler() {
            Some(handler) => {
                telemetry.dispatched(grant, RouteRole::Token);
                handler.call(params, req).await
            }
            None => {
                telemetry.unconfigured(grant, RouteRole::Token);
                Ok(error_response(&OAuth2Error::handler_unavailable()))
            }
        },
        TokenOutcome::Refresh(refresh_grant) => {
            serve_refresh_grant(req, refresh_grant, refresh, telemetry).await
        }
        TokenOutcome::Rejected(rejection) => {
            let (label, bad_request_handler) = match rejection.route {
                RouteRole::RefreshToken => (
                    REFRESH_GRANT,
                    refresh.and_then(RefreshTokenRoute::bad_request_handler),
                ),
                _ => (grant, token.bad_request_handler()),
            };
            telemetry.rejected(label, &rejection);
            reject(rejection.error, req, bad_request_handler).await
        }
    }
}

/// Answer a request on a dedicated refresh URL.
pub(crate) async fn serve_refresh(
    req: GrantRequest,
    route: &RefreshTokenRoute,
    binding: &RefreshBinding,
    telemetry: &Telemetry,
) -> Result<HttpResponse, actix_web::Error> {
    match dispatch_refresh(&req, binding) {
        Ok(grant) => serve_refresh_grant(req, grant, Some(route), telemetry).await,
        Err(rejection) => {
            telemetry.rejected(REFRESH_GRANT, &rejection);
            reject(rejection.error, req, route.bad_request_handler()).await
        }
    }
}

/// Confidential refreshes prefer the full handler and fall back to the unsafe
/// one; public refreshes only ever reach the unsafe handler.
async fn serve_refresh_grant(
    req: GrantRequest,
    grant: RefreshGrant,
    route: Option<&RefreshTokenRoute>,
    telemetry: &Telemetry,
) -> Result<HttpResponse, actix_web::Error> {
    let handled = match (grant, route) {
        (RefreshGrant::Confidential(params), Some(route)) => {
            match (route.handler(), route.unsafe_handler()) {
                (Some(handler), _) => Some(handler.call(params, req)),
                (None, Some(handler)) => Some(handler.call(params.into(), req)),
                (None, None) => None,
            }
        }
        (RefreshGrant::Public(params), Some(route)) => route
            .unsafe_handler()
            .map(|handler| handler.call(params, req)),
        (_, None) => None,
    };

    match handled {
        Some(fut) => {
            telemetry.dispatched(REFRESH_GRANT, RouteRole::RefreshToken);
            fut.await
        }
        None => {
            telemetry.unconfigured(REFRESH_GRANT, RouteRole::RefreshToken);
            Ok(error_response(&OAuth2Error::handler_unavailable()))
        }
    }
}
