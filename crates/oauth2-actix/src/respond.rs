use actix_web::{http::header::ContentType, HttpResponse, ResponseError};

use oauth2_core::OAuth2Error;

use crate::handlers::{BadRequestHandler, HandlerFuture};
use crate::request::GrantRequest;

/// Default rejection: the JSON error envelope with the kind's status (400 for
/// every error the dispatcher itself produces).
pub fn error_response(error: &OAuth2Error) -> HttpResponse {
    error.error_response()
}

/// Hand a rejection to the route's bad-request handler, or answer it directly.
pub async fn reject(
    error: OAuth2Error,
    req: GrantRequest,
    bad_request_handler: Option<&BadRequestHandler>,
) -> Result<HttpResponse, actix_web::Error> {
    match bad_request_handler {
        Some(handler) => handler.call(error, req).await,
        None => Ok(error_response(&error)),
    }
}

/// Answer for a validated authorization-step request with no handler configured.
///
/// Unlike every other path this is a 401 with an HTML body.
pub fn authorization_unavailable(post: bool) -> HttpResponse {
    let message = if post {
        "Authorization post unavailable"
    } else {
        "Authorization unavailable"
    };
    HttpResponse::Unauthorized()
        .content_type(ContentType::html())
        .body(format!("<h1>OAuth Error</h1><p>{}</p>", message))
}

/// Run a handler future, or answer with `fallback` when the slot is empty.
pub async fn run_or(
    handler: Option<HandlerFuture>,
    fallback: impl FnOnce() -> HttpResponse,
) -> Result<HttpResponse, actix_web::Error> {
    match handler {
        Some(fut) => fut.await,
        None => Ok(fallback()),
    }
}
