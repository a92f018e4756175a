//! Per-grant structural validation.
//!
//! Every validator is a pure function of its inputs and returns either typed
//! parameters or exactly one [`OAuth2Error`]. When several fields are wrong,
//! the error reported is the first one in the grant's precedence order.

use crate::credentials::{ClientAuthentication, ClientCredentials};
use crate::fields::FieldBag;
use crate::models::{
    AuthorizationCodeTokenParams, AuthorizationParams, ClientCredentialsTokenParams, GrantParams,
    GrantType, OAuth2Error, PasswordTokenParams, RefreshGrant, RefreshTokenParams,
    UnsafeRefreshTokenParams, RESPONSE_TYPE_CODE,
};
use crate::request::OAuth2Request;

fn required(fields: &FieldBag, name: &str) -> Result<String, OAuth2Error> {
    fields
        .text_owned(name)
        .ok_or_else(|| OAuth2Error::missing_parameter(name))
}

fn require_grant_type(body: &FieldBag, grant: GrantType) -> Result<(), OAuth2Error> {
    if body.is("grant_type", grant.as_str()) {
        Ok(())
    } else {
        Err(OAuth2Error::unsupported_grant_type_value(
            &body.display("grant_type"),
        ))
    }
}

fn client_id_of(creds: &ClientCredentials) -> Result<String, OAuth2Error> {
    creds
        .client_id
        .clone()
        .ok_or_else(|| OAuth2Error::missing_parameter("client_id"))
}

fn client_secret_of(creds: &ClientCredentials) -> Result<String, OAuth2Error> {
    creds
        .client_secret
        .clone()
        .ok_or_else(|| OAuth2Error::missing_parameter("client_secret"))
}

/// Authorization step: `client_id`, then `response_type == "code"`, then `redirect_uri`.
pub fn validate_authorization(fields: &FieldBag) -> Result<AuthorizationParams, OAuth2Error> {
    let client_id = required(fields, "client_id")?;
    if !fields.is("response_type", RESPONSE_TYPE_CODE) {
        return Err(OAuth2Error::unsupported_response_type(
            &fields.display("response_type"),
        ));
    }
    let redirect_uri = required(fields, "redirect_uri")?;

    Ok(AuthorizationParams {
        client_id,
        response_type: RESPONSE_TYPE_CODE.to_string(),
        redirect_uri,
        scope: fields.text_owned("scope"),
        state: fields.text_owned("state"),
        code_challenge: fields.text_owned("code_challenge"),
        code_challenge_method: fields.text_owned("code_challenge_method"),
    })
}

/// Code exchange: `grant_type`, then `client_id`, then `code`.
pub fn validate_authorization_code_token(
    body: &FieldBag,
) -> Result<AuthorizationCodeTokenParams, OAuth2Error> {
    require_grant_type(body, GrantType::AuthorizationCode)?;
    let client_id = required(body, "client_id")?;
    let code = required(body, "code")?;

    Ok(AuthorizationCodeTokenParams {
        grant_type: GrantType::AuthorizationCode,
        code,
        client_id,
        client_secret: body.text_owned("client_secret"),
        code_verifier: body.text_owned("code_verifier"),
        redirect_uri: body.text_owned("redirect_uri"),
    })
}

/// Password grant.
///
/// The resource-owner triple is checked first (`grant_type`, `username`,
/// `password`); client credentials are only inspected once the triple is
/// complete.
pub fn validate_password_token(
    body: &FieldBag,
    creds: &ClientCredentials,
) -> Result<PasswordTokenParams, OAuth2Error> {
    require_grant_type(body, GrantType::Password)?;
    let username = required(body, "username")?;
    let password = required(body, "password")?;

    let client_id = client_id_of(creds)?;
    let client_secret = client_secret_of(creds)?;

    Ok(PasswordTokenParams {
        grant_type: GrantType::Password,
        client_id,
        client_secret,
        username,
        password,
        scope: body.text_owned("scope"),
    })
}

/// Client Credentials grant. `creds` must come from the Basic header.
pub fn validate_client_credentials_token(
    body: &FieldBag,
    creds: &ClientCredentials,
) -> Result<ClientCredentialsTokenParams, OAuth2Error> {
    require_grant_type(body, GrantType::ClientCredentials)?;
    let client_id = client_id_of(creds)?;
    let client_secret = client_secret_of(creds)?;

    Ok(ClientCredentialsTokenParams {
        grant_type: GrantType::ClientCredentials,
        client_id,
        client_secret,
        scope: body.text_owned("scope"),
    })
}

/// Knobs for refresh validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshRules {
    /// Reject anything but `grant_type=refresh_token` first. Off when the
    /// caller already routed on `grant_type` (shared token URL).
    pub check_grant_type: bool,
    /// Accept a missing `client_secret`, producing [`RefreshGrant::Public`].
    pub allow_unsafe: bool,
}

impl RefreshRules {
    pub fn dedicated(allow_unsafe: bool) -> Self {
        Self {
            check_grant_type: true,
            allow_unsafe,
        }
    }

    pub fn shared(allow_unsafe: bool) -> Self {
        Self {
            check_grant_type: false,
            allow_unsafe,
        }
    }
}

/// Refresh grant: (`grant_type`), `client_id`, `client_secret`, `refresh_token`.
///
/// With `allow_unsafe`, a missing secret is not an error and the result is
/// [`RefreshGrant::Public`].
pub fn validate_refresh_token(
    body: &FieldBag,
    creds: &ClientCredentials,
    rules: RefreshRules,
) -> Result<RefreshGrant, OAuth2Error> {
    if rules.check_grant_type {
        require_grant_type(body, GrantType::RefreshToken)?;
    }
    let client_id = client_id_of(creds)?;
    if creds.client_secret.is_none() && !rules.allow_unsafe {
        return Err(OAuth2Error::missing_parameter("client_secret"));
    }
    let refresh_token = required(body, "refresh_token")?;
    let scope = body.text_owned("scope");

    Ok(match creds.client_secret.clone() {
        Some(client_secret) => RefreshGrant::Confidential(RefreshTokenParams {
            grant_type: GrantType::RefreshToken,
            refresh_token,
            client_id,
            client_secret,
            scope,
        }),
        None => RefreshGrant::Public(UnsafeRefreshTokenParams {
            grant_type: GrantType::RefreshToken,
            refresh_token,
            client_id,
            client_secret: None,
            scope,
        }),
    })
}

/// Validate a token request for `grant` as if it arrived on that grant's own URL.
///
/// `mode` selects the credential source for the password and refresh grants;
/// client credentials always come from the Basic header and the code exchange
/// reads them from the body.
pub fn validate_token_request<R: OAuth2Request + ?Sized>(
    grant: GrantType,
    req: &R,
    mode: ClientAuthentication,
) -> Result<GrantParams, OAuth2Error> {
    let body = req.body();
    match grant {
        GrantType::AuthorizationCode => validate_authorization_code_token(body).map(Into::into),
        GrantType::Password => {
            validate_password_token(body, &ClientCredentials::extract(mode, req)).map(Into::into)
        }
        GrantType::ClientCredentials => validate_client_credentials_token(
            body,
            &ClientCredentials::from_basic_header(req.authorization()),
        )
        .map(Into::into),
        GrantType::RefreshToken => validate_refresh_token(
            body,
            &ClientCredentials::extract(mode, req),
            RefreshRules::dedicated(false),
        )
        .map(Into::into),
    }
}
