use actix_web::{web, HttpResponse};
use std::sync::Arc;

use oauth2_config::AuthorizationCodeConfig;
use oauth2_core::{
    dispatch_authorization, dispatch_token, validate_authorization_code_token,
    ClientAuthentication, DocumentedGrant, GrantType, OAuth2Request, RefreshBinding, RouteRole,
    SecurityDescriptor,
};
use oauth2_observability::Metrics;

use super::{
    get_route, post_route, refresh_binding, serve_refresh, serve_token, OAuth2Flow, SchemeInfo,
    Telemetry,
};
use crate::request::GrantRequest;
use crate::respond::{authorization_unavailable, reject, run_or};
use crate::routes::{
    AuthorizationCodeTokenRoute, AuthorizationRoute, RefreshTokenRoute, DEFAULT_TOKEN_URL,
};

const AUTHORIZATION_STEP: &str = "authorization";

/// Authorization Code, optionally documented as requiring PKCE.
///
/// Serves the authorization step (`GET` and `POST`), the code exchange on the
/// token URL and, when configured, the refresh grant.
#[derive(Debug, Clone)]
pub struct AuthorizationCodeFlow {
    scheme: SchemeInfo,
    authorization: AuthorizationRoute,
    token: AuthorizationCodeTokenRoute,
    refresh: Option<RefreshTokenRoute>,
    pkce: bool,
    telemetry: Telemetry,
}

impl AuthorizationCodeFlow {
    pub fn new(scheme_name: impl Into<String>) -> Self {
        Self {
            scheme: SchemeInfo::new(scheme_name),
            authorization: AuthorizationRoute::default(),
            token: AuthorizationCodeTokenRoute::new(DEFAULT_TOKEN_URL),
            refresh: None,
            pkce: false,
            telemetry: Telemetry::default(),
        }
    }

    pub fn from_config(config: &AuthorizationCodeConfig) -> Self {
        let mut flow = Self::new(config.scheme_name.clone())
            .with_scopes(config.scopes.clone())
            .with_authorization_route(AuthorizationRoute::new(config.authorization_url.clone()))
            .with_token_route(AuthorizationCodeTokenRoute::new(config.token_url.clone()));
        flow.scheme.description = config.description.clone();
        flow.refresh = config
            .refresh_token_url
            .as_ref()
            .map(|url| RefreshTokenRoute::new(url.clone()));
        flow.pkce = config.pkce;
        flow
    }

    pub fn with_authorization_route(mut self, route: AuthorizationRoute) -> Self {
        self.authorization = route;
        self
    }

    pub fn with_token_route(mut self, route: AuthorizationCodeTokenRoute) -> Self {
        self.token = route;
        self
    }

    pub fn with_refresh_token_route(mut self, route: RefreshTokenRoute) -> Self {
        self.refresh = Some(route);
        self
    }

    /// Document the scheme as Authorization Code with PKCE.
    pub fn with_pkce(mut self) -> Self {
        self.pkce = true;
        self
    }

    pub fn without_pkce(mut self) -> Self {
        self.pkce = false;
        self
    }

    pub fn is_with_pkce(&self) -> bool {
        self.pkce
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.telemetry = Telemetry::new(Some(metrics));
        self
    }

    pub fn authorization_route(&self) -> &AuthorizationRoute {
        &self.authorization
    }

    pub fn authorization_route_mut(&mut self) -> &mut AuthorizationRoute {
        &mut self.authorization
    }

    pub fn token_route(&self) -> &AuthorizationCodeTokenRoute {
        &self.token
    }

    pub fn token_route_mut(&mut self) -> &mut AuthorizationCodeTokenRoute {
        &mut self.token
    }

    pub fn refresh_token_route(&self) -> Option<&RefreshTokenRoute> {
        self.refresh.as_ref()
    }

    pub fn refresh_token_route_mut(&mut self) -> Option<&mut RefreshTokenRoute> {
        self.refresh.as_mut()
    }

    fn refresh_binding(&self) -> Option<RefreshBinding> {
        refresh_binding(
            self.token.url(),
            self.refresh.as_ref(),
            ClientAuthentication::Body,
        )
    }

    /// Serve the authorization step. `GET` and `POST` validate identically;
    /// the method only picks the handler.
    pub async fn handle_authorization(
        &self,
        req: GrantRequest,
    ) -> Result<HttpResponse, actix_web::Error> {
        let post = !req.is_get();
        match dispatch_authorization(&req) {
            Ok(params) => {
                let handler = if post {
                    self.authorization.post_handler()
                } else {
                    self.authorization.handler()
                };
                if handler.is_some() {
                    self.telemetry
                        .dispatched(AUTHORIZATION_STEP, RouteRole::Authorization);
                } else {
                    self.telemetry
                        .unconfigured(AUTHORIZATION_STEP, RouteRole::Authorization);
                }
                run_or(handler.map(|h| h.call(params, req)), || {
                    authorization_unavailable(post)
                })
                .await
            }
            Err(rejection) => {
                self.telemetry.rejected(AUTHORIZATION_STEP, &rejection);
                reject(
                    rejection.error,
                    req,
                    self.authorization.bad_request_handler(),
                )
                .await
            }
        }
    }

    pub async fn handle_token(&self, req: GrantRequest) -> Result<HttpResponse, actix_web::Error> {
        let binding = self.refresh_binding();
        let outcome = dispatch_token(
            &req,
            |r: &GrantRequest| validate_authorization_code_token(r.body()),
            binding.as_ref(),
        );
        serve_token(
            GrantType::AuthorizationCode.as_str(),
            req,
            outcome,
            &self.token,
            self.refresh.as_ref(),
            &self.telemetry,
        )
        .await
    }

    pub async fn handle_refresh(
        &self,
        req: GrantRequest,
    ) -> Result<HttpResponse, actix_web::Error> {
        match (self.refresh.as_ref(), self.refresh_binding()) {
            (Some(route), Some(binding)) => {
                serve_refresh(req, route, &binding, &self.telemetry).await
            }
            _ => Ok(HttpResponse::NotFound().finish()),
        }
    }
}

impl OAuth2Flow for AuthorizationCodeFlow {
    fn scheme(&self) -> &SchemeInfo {
        &self.scheme
    }

    fn scheme_mut(&mut self) -> &mut SchemeInfo {
        &mut self.scheme
    }

    fn descriptor(&self) -> SecurityDescriptor {
        let grant = if self.pkce {
            DocumentedGrant::AuthorizationCodeWithPkce
        } else {
            DocumentedGrant::AuthorizationCode
        };
        SecurityDescriptor::new(self.scheme.name.clone(), grant, self.token.url())
            .with_authorization_url(self.authorization.url())
            .with_refresh_url(self.refresh.as_ref().map(|r| r.url().to_string()))
            .with_scopes(self.scheme.scopes.clone())
            .with_description(self.scheme.description.clone())
            .with_client_authentication(ClientAuthentication::Body)
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        let flow = Arc::new(self.clone());

        let authorize = {
            let flow = Arc::clone(&flow);
            move |req: GrantRequest| {
                let flow = Arc::clone(&flow);
                async move { flow.handle_authorization(req).await }
            }
        };
        cfg.service(
            web::resource(self.authorization.url().to_string())
                .route(get_route(authorize.clone()))
                .route(post_route(authorize)),
        );

        let token = {
            let flow = Arc::clone(&flow);
            move |req: GrantRequest| {
                let flow = Arc::clone(&flow);
                async move { flow.handle_token(req).await }
            }
        };
        cfg.service(web::resource(self.token.url().to_string()).route(post_route(token)));

        if let Some(refresh) = self
            .refresh
            .as_ref()
            .filter(|r| r.url() != self.token.url())
        {
            let handler = move |req: GrantRequest| {
                let flow = Arc::clone(&flow);
                async move { flow.handle_refresh(req).await }
            };
            cfg.service(web::resource(refresh.url().to_string()).route(post_route(handler)));
        }
    }
}
