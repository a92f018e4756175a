use oauth2_core::{DocumentedGrant, SecurityDescriptor};
use utoipa::openapi::security::{
    AuthorizationCode, ClientCredentials, Flow, OAuth2, Password, Scopes, SecurityScheme,
};
use utoipa::openapi::ComponentsBuilder;
use utoipa::{Modify, OpenApi};

/// OpenAPI document generator.
///
/// Carries the shared schemas; security schemes are added per configured flow
/// through [`SecuritySchemes`].
#[derive(OpenApi)]
#[openapi(
    components(
        schemas(
            oauth2_core::TokenResponse,
            oauth2_core::OAuth2Error,
            oauth2_core::OAuth2ErrorKind,
            oauth2_core::GrantType,
            oauth2_core::ClientAuthentication,
        )
    ),
    tags(
        (name = "OAuth2", description = "OAuth2 authorization and token endpoints"),
    ),
    info(
        title = "OAuth2 Grant Flows",
        version = "0.1.0",
        description = "OAuth2 authorization code, password, client credentials and refresh token endpoints",
        license(
            name = "MIT OR Apache-2.0"
        )
    )
)]
pub struct ApiDoc;

const PKCE_NOTE: &str = "PKCE (RFC 7636) is required.";

/// Adds one OAuth2 security scheme per descriptor to a document.
#[derive(Debug, Clone, Default)]
pub struct SecuritySchemes(pub Vec<SecurityDescriptor>);

impl Modify for SecuritySchemes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(|| ComponentsBuilder::new().build());
        for descriptor in &self.0 {
            components.add_security_scheme(
                descriptor.scheme_name.clone(),
                security_scheme(descriptor),
            );
        }
    }
}

/// Render a descriptor as an OpenAPI `oauth2` security scheme with a single flow.
pub fn security_scheme(descriptor: &SecurityDescriptor) -> SecurityScheme {
    let scopes = Scopes::from_iter(
        descriptor
            .scopes
            .iter()
            .map(|(name, description)| (name.clone(), description.clone())),
    );
    let token_url = descriptor.token_url.clone();
    let refresh_url = descriptor.refresh_url.clone();

    let flow = match descriptor.grant_type {
        DocumentedGrant::AuthorizationCode | DocumentedGrant::AuthorizationCodeWithPkce => {
            let authorization_url = descriptor.authorization_url.clone().unwrap_or_default();
            Flow::AuthorizationCode(match refresh_url {
                Some(refresh) => {
                    AuthorizationCode::with_refresh_url(authorization_url, token_url, scopes, refresh)
                }
                None => AuthorizationCode::new(authorization_url, token_url, scopes),
            })
        }
        DocumentedGrant::Password => Flow::Password(match refresh_url {
            Some(refresh) => Password::with_refresh_url(token_url, scopes, refresh),
            None => Password::new(token_url, scopes),
        }),
        DocumentedGrant::ClientCredentials => Flow::ClientCredentials(match refresh_url {
            Some(refresh) => ClientCredentials::with_refresh_url(token_url, scopes, refresh),
            None => ClientCredentials::new(token_url, scopes),
        }),
    };

    let description = match (descriptor.grant_type, descriptor.description.as_deref()) {
        (DocumentedGrant::AuthorizationCodeWithPkce, Some(text)) => {
            Some(format!("{} {}", text, PKCE_NOTE))
        }
        (DocumentedGrant::AuthorizationCodeWithPkce, None) => Some(PKCE_NOTE.to_string()),
        (_, text) => text.map(str::to_string),
    };

    let oauth2 = match description {
        Some(text) => OAuth2::with_description([flow], text),
        None => OAuth2::new([flow]),
    };
    SecurityScheme::OAuth2(oauth2)
}

/// The full document for a set of configured flows.
pub fn openapi_for(descriptors: &[SecurityDescriptor]) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    SecuritySchemes(descriptors.to_vec()).modify(&mut doc);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth2_core::ClientAuthentication;
    use std::collections::BTreeMap;

    fn password_descriptor() -> SecurityDescriptor {
        SecurityDescriptor::new("petstore_auth", DocumentedGrant::Password, "/oauth2/token")
            .with_refresh_url(Some("/oauth2/token".into()))
            .with_scopes(BTreeMap::from([("read".to_string(), "Read access".to_string())]))
            .with_description(Some("Password grant".into()))
            .with_client_authentication(ClientAuthentication::Header)
    }

    #[test]
    fn password_descriptor_becomes_password_flow() {
        let doc = openapi_for(&[password_descriptor()]);
        let json = serde_json::to_value(&doc).unwrap();
        let scheme = &json["components"]["securitySchemes"]["petstore_auth"];
        assert_eq!(scheme["type"], "oauth2");
        assert_eq!(scheme["description"], "Password grant");
        assert_eq!(scheme["flows"]["password"]["tokenUrl"], "/oauth2/token");
        assert_eq!(scheme["flows"]["password"]["refreshUrl"], "/oauth2/token");
        assert_eq!(scheme["flows"]["password"]["scopes"]["read"], "Read access");
    }

    #[test]
    fn pkce_is_documented_on_the_authorization_code_flow() {
        let descriptor = SecurityDescriptor::new(
            "code",
            DocumentedGrant::AuthorizationCodeWithPkce,
            "/oauth2/token",
        )
        .with_authorization_url("/oauth2/authorization");
        let json = serde_json::to_value(openapi_for(&[descriptor])).unwrap();
        let scheme = &json["components"]["securitySchemes"]["code"];
        assert_eq!(
            scheme["flows"]["authorizationCode"]["authorizationUrl"],
            "/oauth2/authorization"
        );
        assert!(scheme["flows"]["authorizationCode"]
            .get("refreshUrl")
            .is_none());
        assert_eq!(scheme["description"], PKCE_NOTE);
    }

    #[test]
    fn shared_schemas_are_present() {
        let json = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let schemas = &json["components"]["schemas"];
        assert!(schemas.get("OAuth2Error").is_some());
        assert!(schemas.get("TokenResponse").is_some());
    }
}
