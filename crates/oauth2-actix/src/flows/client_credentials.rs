use actix_web::{web, HttpResponse};
use std::sync::Arc;

use oauth2_config::ClientCredentialsConfig;
use oauth2_core::{
    dispatch_token, validate_client_credentials_token, ClientAuthentication, ClientCredentials,
    DocumentedGrant, GrantType, OAuth2Request, RefreshBinding, SecurityDescriptor,
};
use oauth2_observability::Metrics;

use super::{
    post_route, refresh_binding, serve_refresh, serve_token, OAuth2Flow, SchemeInfo, Telemetry,
};
use crate::request::GrantRequest;
use crate::routes::{ClientCredentialsTokenRoute, RefreshTokenRoute, DEFAULT_TOKEN_URL};

/// Client Credentials. The client always authenticates with HTTP Basic;
/// refresh requests carry their credentials in the body.
#[derive(Debug, Clone)]
pub struct ClientCredentialsFlow {
    scheme: SchemeInfo,
    token: ClientCredentialsTokenRoute,
    refresh: Option<RefreshTokenRoute>,
    telemetry: Telemetry,
}

impl ClientCredentialsFlow {
    pub fn new(scheme_name: impl Into<String>) -> Self {
        Self {
            scheme: SchemeInfo::new(scheme_name),
            token: ClientCredentialsTokenRoute::new(DEFAULT_TOKEN_URL),
            refresh: None,
            telemetry: Telemetry::default(),
        }
    }

    pub fn from_config(config: &ClientCredentialsConfig) -> Self {
        let mut flow = Self::new(config.scheme_name.clone())
            .with_scopes(config.scopes.clone())
            .with_token_route(ClientCredentialsTokenRoute::new(config.token_url.clone()));
        flow.scheme.description = config.description.clone();
        flow.refresh = config
            .refresh_token_url
            .as_ref()
            .map(|url| RefreshTokenRoute::new(url.clone()));
        flow
    }

    pub fn with_token_route(mut self, route: ClientCredentialsTokenRoute) -> Self {
        self.token = route;
        self
    }

    pub fn with_refresh_token_route(mut self, route: RefreshTokenRoute) -> Self {
        self.refresh = Some(route);
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.telemetry = Telemetry::new(Some(metrics));
        self
    }

    pub fn token_route(&self) -> &ClientCredentialsTokenRoute {
        &self.token
    }

    pub fn token_route_mut(&mut self) -> &mut ClientCredentialsTokenRoute {
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

    pub async fn handle_token(&self, req: GrantRequest) -> Result<HttpResponse, actix_web::Error> {
        let binding = self.refresh_binding();
        let outcome = dispatch_token(
            &req,
            |r: &GrantRequest| {
                let creds = ClientCredentials::from_basic_header(r.authorization());
                validate_client_credentials_token(r.body(), &creds)
            },
            binding.as_ref(),
        );
        serve_token(
            GrantType::ClientCredentials.as_str(),
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

impl OAuth2Flow for ClientCredentialsFlow {
    fn scheme(&self) -> &SchemeInfo {
        &self.scheme
    }

    fn scheme_mut(&mut self) -> &mut SchemeInfo {
        &mut self.scheme
    }

    fn descriptor(&self) -> SecurityDescriptor {
        SecurityDescriptor::new(
            self.scheme.name.clone(),
            DocumentedGrant::ClientCredentials,
            self.token.url(),
        )
        .with_refresh_url(self.refresh.as_ref().map(|r| r.url().to_string()))
        .with_scopes(self.scheme.scopes.clone())
        .with_description(self.scheme.description.clone())
        .with_client_authentication(ClientAuthentication::Header)
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
