#![allow(dead_code)]

use actix_web::HttpResponse;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Serialize;

use rust_oauth2_flows::{GrantRequest, OAuth2Error};

/// `Authorization` header value for HTTP Basic client authentication.
pub fn basic(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", client_id, client_secret))
    )
}

/// Handler answering 200 with the validated parameters it received.
pub async fn echo<P: Serialize>(
    params: P,
    _req: GrantRequest,
) -> Result<HttpResponse, actix_web::Error> {
    Ok(HttpResponse::Ok().json(params))
}

/// Like [`echo`], tagging the body so tests can tell which slot answered.
pub fn tagged<P: Serialize>(
    tag: &'static str,
) -> impl Fn(P, GrantRequest) -> futures::future::Ready<Result<HttpResponse, actix_web::Error>>
       + Send
       + Sync
       + 'static {
    move |params: P, _req: GrantRequest| {
        futures::future::ready(Ok(HttpResponse::Ok().json(serde_json::json!({
            "handler": tag,
            "params": params,
        }))))
    }
}

/// Bad-request handler answering 418 with the rejected error as JSON.
pub async fn teapot(
    error: OAuth2Error,
    _req: GrantRequest,
) -> Result<HttpResponse, actix_web::Error> {
    Ok(HttpResponse::ImATeapot().json(error))
}
