use actix_web::web;
use std::collections::BTreeMap;

use oauth2_config::Config;
use oauth2_core::SecurityDescriptor;
use oauth2_observability::Metrics;

use crate::flows::{AuthorizationCodeFlow, ClientCredentialsFlow, OAuth2Flow, PasswordFlow};

/// Configured flows keyed by scheme name.
///
/// Flows are installed in scheme-name order. When two flows share a URL the
/// first one installed serves it.
#[derive(Default)]
pub struct FlowRegistry {
    flows: BTreeMap<String, Box<dyn OAuth2Flow>>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build undecorated flows (no handlers attached) for every configured section.
    pub fn from_config(config: &Config, metrics: Option<&Metrics>) -> Self {
        let mut registry = Self::new();
        if let Some(section) = &config.authorization_code {
            let mut flow = AuthorizationCodeFlow::from_config(section);
            if let Some(m) = metrics {
                flow = flow.with_metrics(m.clone());
            }
            registry.register(flow);
        }
        if let Some(section) = &config.password {
            let mut flow = PasswordFlow::from_config(section);
            if let Some(m) = metrics {
                flow = flow.with_metrics(m.clone());
            }
            registry.register(flow);
        }
        if let Some(section) = &config.client_credentials {
            let mut flow = ClientCredentialsFlow::from_config(section);
            if let Some(m) = metrics {
                flow = flow.with_metrics(m.clone());
            }
            registry.register(flow);
        }
        registry
    }

    /// Add a flow, replacing (and returning) any flow with the same scheme name.
    pub fn register<F: OAuth2Flow + 'static>(&mut self, flow: F) -> Option<Box<dyn OAuth2Flow>> {
        let name = flow.scheme_name().to_string();
        let replaced = self.flows.insert(name.clone(), Box::new(flow));
        if replaced.is_some() {
            tracing::warn!(scheme = %name, "replacing an already registered OAuth2 flow");
        }
        replaced
    }

    pub fn with<F: OAuth2Flow + 'static>(mut self, flow: F) -> Self {
        self.register(flow);
        self
    }

    pub fn get(&self, scheme_name: &str) -> Option<&dyn OAuth2Flow> {
        self.flows.get(scheme_name).map(|f| f.as_ref())
    }

    pub fn remove(&mut self, scheme_name: &str) -> Option<Box<dyn OAuth2Flow>> {
        self.flows.remove(scheme_name)
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn scheme_names(&self) -> impl Iterator<Item = &str> {
        self.flows.keys().map(String::as_str)
    }

    /// Install the routes of every registered flow.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        for (name, flow) in &self.flows {
            tracing::debug!(scheme = %name, "installing OAuth2 flow routes");
            flow.configure(cfg);
        }
    }

    pub fn descriptors(&self) -> Vec<SecurityDescriptor> {
        self.flows.values().map(|f| f.descriptor()).collect()
    }
}

impl std::fmt::Debug for FlowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowRegistry")
            .field("schemes", &self.flows.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2_config::{ClientCredentialsConfig, PasswordConfig};
    use oauth2_core::{ClientAuthentication, DocumentedGrant};

    #[test]
    fn registry_exports_one_descriptor_per_scheme() {
        let registry = FlowRegistry::new()
            .with(PasswordFlow::new("pw").client_authentication_to_header())
            .with(AuthorizationCodeFlow::new("ac").with_pkce())
            .with(ClientCredentialsFlow::new("cc").with_scope("read", "Read"));

        let descriptors = registry.descriptors();
        let names: Vec<_> = descriptors.iter().map(|d| d.scheme_name.as_str()).collect();
        assert_eq!(names, vec!["ac", "cc", "pw"]);
        assert_eq!(
            descriptors[0].grant_type,
            DocumentedGrant::AuthorizationCodeWithPkce
        );
        assert_eq!(
            descriptors[0].authorization_url.as_deref(),
            Some("/oauth2/authorization")
        );
        assert_eq!(descriptors[1].scopes.get("read").map(String::as_str), Some("Read"));
        assert_eq!(
            descriptors[2].client_authentication,
            ClientAuthentication::Header
        );
    }

    #[test]
    fn registering_the_same_scheme_twice_replaces_it() {
        let mut registry = FlowRegistry::new();
        assert!(registry.register(PasswordFlow::new("oauth2")).is_none());
        assert!(registry
            .register(ClientCredentialsFlow::new("oauth2"))
            .is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.descriptors()[0].grant_type,
            DocumentedGrant::ClientCredentials
        );
    }

    #[test]
    fn from_config_builds_configured_sections_only() {
        let config = Config {
            password: Some(PasswordConfig {
                refresh_token_url: Some("/oauth2/refresh".into()),
                ..PasswordConfig::default()
            }),
            client_credentials: Some(ClientCredentialsConfig {
                token_url: "/oauth2/cc".into(),
                ..ClientCredentialsConfig::default()
            }),
            ..Config::default()
        };
        let registry = FlowRegistry::from_config(&config, None);
        assert_eq!(registry.len(), 2);

        let password = registry.get("oauth2_password").unwrap().descriptor();
        assert_eq!(password.refresh_url.as_deref(), Some("/oauth2/refresh"));
        let cc = registry.get("oauth2_client_credentials").unwrap().descriptor();
        assert_eq!(cc.token_url, "/oauth2/cc");
    }
}
