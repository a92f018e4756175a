//! Endpoint-level dispatch decisions.
//!
//! A token URL may serve its primary grant and, when the refresh URL is the
//! same path, the refresh grant as well. These functions decide which of the
//! two (if any) a request belongs to and which route owns the rejection, but
//! they never invoke handlers.

use crate::credentials::{ClientAuthentication, ClientCredentials};
use crate::fields::FieldBag;
use crate::models::{AuthorizationParams, GrantType, OAuth2Error, RefreshGrant};
use crate::request::OAuth2Request;
use crate::validate::{validate_authorization, validate_refresh_token, RefreshRules};

/// Which configured route a decision belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteRole {
    Authorization,
    Token,
    RefreshToken,
}

impl RouteRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteRole::Authorization => "authorization",
            RouteRole::Token => "token",
            RouteRole::RefreshToken => "refresh_token",
        }
    }
}

/// A rejected request: the single error to answer with and the route whose
/// bad-request handler (if any) should see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub error: OAuth2Error,
    pub route: RouteRole,
}

impl Rejection {
    pub fn new(error: OAuth2Error, route: RouteRole) -> Self {
        Self { error, route }
    }
}

/// How a flow's refresh route relates to its token route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshBinding {
    /// The refresh URL equals the token URL.
    pub shared_url: bool,
    /// An unsafe (secret-less) refresh handler is configured.
    pub allow_unsafe: bool,
    /// Where refresh requests carry client credentials.
    pub client_authentication: ClientAuthentication,
}

impl RefreshBinding {
    fn credentials<R: OAuth2Request + ?Sized>(&self, req: &R) -> ClientCredentials {
        ClientCredentials::extract(self.client_authentication, req)
    }
}

/// Result of dispatching a request that arrived on a token URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome<P> {
    /// The primary grant validated.
    Grant(P),
    /// The token URL doubles as refresh URL and the refresh grant validated.
    Refresh(RefreshGrant),
    Rejected(Rejection),
}

/// Fields consulted by the authorization step.
///
/// `GET` reads the query string; other methods overlay body fields on the
/// query string.
pub fn authorization_fields<R: OAuth2Request + ?Sized>(req: &R) -> FieldBag {
    let mut fields = req.query().clone();
    if !req.is_get() {
        fields.merge(req.body());
    }
    fields
}

/// Validate the authorization step. The method only matters for picking a handler later.
pub fn dispatch_authorization<R: OAuth2Request + ?Sized>(
    req: &R,
) -> Result<AuthorizationParams, Rejection> {
    validate_authorization(&authorization_fields(req))
        .map_err(|error| Rejection::new(error, RouteRole::Authorization))
}

/// Dispatch a request on a token URL.
///
/// The primary grant's validator runs first. Only when it fails, the token URL
/// is shared with the refresh route and `grant_type` is `refresh_token`, the
/// refresh grant is validated instead. Every other failure is the primary
/// grant's error, which already reports `unsupported_grant_type` for a
/// `grant_type` matching neither grant.
pub fn dispatch_token<R, P, F>(
    req: &R,
    validate_primary: F,
    refresh: Option<&RefreshBinding>,
) -> TokenOutcome<P>
where
    R: OAuth2Request + ?Sized,
    F: FnOnce(&R) -> Result<P, OAuth2Error>,
{
    let primary_error = match validate_primary(req) {
        Ok(params) => return TokenOutcome::Grant(params),
        Err(error) => error,
    };

    match refresh {
        Some(binding)
            if binding.shared_url
                && req.body().is("grant_type", GrantType::RefreshToken.as_str()) =>
        {
            match validate_refresh_token(
                req.body(),
                &binding.credentials(req),
                RefreshRules::shared(binding.allow_unsafe),
            ) {
                Ok(grant) => TokenOutcome::Refresh(grant),
                Err(error) => {
                    TokenOutcome::Rejected(Rejection::new(error, RouteRole::RefreshToken))
                }
            }
        }
        _ => TokenOutcome::Rejected(Rejection::new(primary_error, RouteRole::Token)),
    }
}

/// Dispatch a request on a dedicated refresh URL.
pub fn dispatch_refresh<R: OAuth2Request + ?Sized>(
    req: &R,
    binding: &RefreshBinding,
) -> Result<RefreshGrant, Rejection> {
    validate_refresh_token(
        req.body(),
        &binding.credentials(req),
        RefreshRules::dedicated(binding.allow_unsafe),
    )
    .map_err(|error| Rejection::new(error, RouteRole::RefreshToken))
}
