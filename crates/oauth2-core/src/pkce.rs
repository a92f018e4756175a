//! PKCE (RFC 7636) verification for code-exchange handlers.
//!
//! The dispatcher only forwards `code_challenge` / `code_verifier`; handlers
//! that persisted the challenge call [`verify_code_verifier`] during exchange.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::models::OAuth2Error;

pub const METHOD_PLAIN: &str = "plain";
pub const METHOD_S256: &str = "S256";

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn s256_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Check `verifier` against a stored challenge. A missing method means `plain`.
pub fn verify_code_verifier(
    verifier: &str,
    challenge: &str,
    method: Option<&str>,
) -> Result<(), OAuth2Error> {
    // RFC 7636 §4.1: 43..=128 unreserved characters.
    let well_formed = (43..=128).contains(&verifier.len())
        && verifier
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'));
    if !well_formed {
        return Err(OAuth2Error::invalid_request("Malformed code_verifier"));
    }

    let computed = match method.unwrap_or(METHOD_PLAIN) {
        METHOD_PLAIN => verifier.to_string(),
        METHOD_S256 => s256_challenge(verifier),
        other => {
            return Err(OAuth2Error::invalid_request(&format!(
                "Unsupported code_challenge_method '{}'",
                other
            )))
        }
    };

    if bool::from(computed.as_bytes().ct_eq(challenge.as_bytes())) {
        Ok(())
    } else {
        Err(OAuth2Error::invalid_grant("PKCE verification failed"))
    }
}
