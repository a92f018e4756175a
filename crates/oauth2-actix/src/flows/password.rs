use actix_web::{web, HttpResponse};
use std::sync::Arc;

use oauth2_config::PasswordConfig;
use oauth2_core::{
    dispatch_token, validate_password_token, ClientAuthentication, ClientCredentials,
    DocumentedGrant, GrantType, OAuth2Request, RefreshBinding, SecurityDescriptor,
};
use oauth2_observability::Metrics;

use super::{
    post_route, refresh_binding, serve_refresh, serve_token, OAuth2Flow, SchemeInfo, Telemetry,
};
use crate::request::GrantRequest;
use crate::routes::{PasswordTokenRoute, RefreshTokenRoute, DEFAULT_TOKEN_URL};

/// Resource Owner Password Credentials.
///
/// Client credentials are read from the body by default, or from the Basic
/// header after [`client_authentication_to_header`](Self::client_authentication_to_header).
/// The same mode applies to refresh requests.
#[derive(Debug, Clone)]
pub struct PasswordFlow {
    scheme: SchemeInfo,
    token: PasswordTokenRoute,
    refresh: Option<RefreshTokenRoute>,
    client_authentication: ClientAuthentication,
    telemetry: Telemetry,
}

impl PasswordFlow {
    pub fn new(scheme_name: impl Into<String>) -> Self {
        Self {
            scheme: SchemeInfo::new(scheme_name),
            token: PasswordTokenRoute::new(DEFAULT_TOKEN_URL),
            refresh: None,
            client_authentication: ClientAuthentication::Body,
            telemetry: Telemetry::default(),
        }
    }

    /// Scheme name, documentation and URLs from a config section. Handlers
    /// still have to be attached in code.
    pub fn from_config(config: &PasswordConfig) -> Self {
        let mut flow = Self::new(config.scheme_name.clone())
            .with_scopes(config.scopes.clone())
            .with_token_route(PasswordTokenRoute::new(config.token_url.clone()))
            .with_client_authentication(config.client_authentication);
        flow.scheme.description = config.description.clone();
        if let Some(url) = &config.refresh_token_url {
            flow.refresh = Some(RefreshTokenRoute::new(url.clone()));
        }
        flow
    }

    pub fn with_token_route(mut self, route: PasswordTokenRoute) -> Self {
        self.token = route;
        self
    }

    pub fn with_refresh_token_route(mut self, route: RefreshTokenRoute) -> Self {
        self.refresh = Some(route);
        self
    }

    pub fn with_client_authentication(mut self, mode: ClientAuthentication) -> Self {
        self.client_authentication = mode;
        self
    }

    pub fn client_authentication_to_body(self) -> Self {
        self.with_client_authentication(ClientAuthentication::Body)
    }

    pub fn client_authentication_to_header(self) -> Self {
        self.with_client_authentication(ClientAuthentication::Header)
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.telemetry = Telemetry::new(Some(metrics));
        self
    }

    pub fn client_authentication(&self) -> ClientAuthentication {
        self.client_authentication
    }

    pub fn token_route(&self) -> &PasswordTokenRoute {
        &self.token
    }

    pub fn token_route_mut(&mut self) -> &mut PasswordTokenRoute {
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
            self.client_authentication,
        )
    }

    /// Serve a request that arrived on the token URL.
    pub async fn handle_token(&self, req: GrantRequest) -> Result<HttpResponse, actix_web::Error> {
        let mode = self.client_authentication;
        let binding = self.refresh_binding();
        let outcome = dispatch_token(
            &req,
            |r: &GrantRequest| {
                validate_password_token(r.body(), &ClientCredentials::extract(mode, r))
            },
            binding.as_ref(),
        );
        serve_token(
            GrantType::Password.as_str(),
            req,
            outcome,
            &self.token,
            self.refresh.as_ref(),
            &self.telemetry,
        )
        .await
    }

    /// Serve a request that arrived on a dedicated refresh URL.
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

impl OAuth2Flow for PasswordFlow {
    fn scheme(&self) -> &SchemeInfo {
        &self.scheme
    }

    fn scheme_mut(&mut self) -> &mut SchemeInfo {
        &mut self.scheme
    }

    fn descriptor(&self) -> SecurityDescriptor {
        SecurityDescriptor::new(
            self.scheme.name.clone(),
            DocumentedGrant::Password,
            self.token.url(),
        )
        .with_refresh_url(self.refresh.as_ref().map(|r| r.url().to_string()))
        .with_scopes(self.scheme.scopes.clone())
        .with_description(self.scheme.description.clone())
        .with_client_authentication(self.client_authentication)
    }

    fn configure(&self, cfg: &mut web::ServiceConfig) {
        let flow = Arc::new(self.clone());

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
