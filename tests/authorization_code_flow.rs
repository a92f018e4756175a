mod common;

use actix_web::{http::header, test, App};
use serde_json::{json, Value};

use common::{echo, tagged};
use rust_oauth2_flows::{
    AuthorizationCodeFlow, AuthorizationCodeTokenRoute, AuthorizationRoute, OAuth2Error,
    OAuth2Flow, RefreshTokenRoute,
};

fn flow() -> AuthorizationCodeFlow {
    AuthorizationCodeFlow::new("code")
        .with_authorization_route(
            AuthorizationRoute::new("/oauth2/authorization")
                .with_handler(tagged("get"))
                .with_post_handler(tagged("post")),
        )
        .with_token_route(AuthorizationCodeTokenRoute::new("/oauth2/token").with_handler(echo))
}

#[actix_web::test]
async fn authorization_get_reads_the_query_string() {
    let flow = flow();
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/oauth2/authorization?client_id=app&response_type=code&redirect_uri=https%3A%2F%2Fapp.example%2Fcb&state=xyz&code_challenge=abc")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["handler"], "get");
    assert_eq!(
        body["params"],
        json!({
            "client_id": "app",
            "response_type": "code",
            "redirect_uri": "https://app.example/cb",
            "state": "xyz",
            "code_challenge": "abc",
        })
    );
}

#[actix_web::test]
async fn authorization_post_goes_to_the_post_handler() {
    let flow = flow();
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/oauth2/authorization?client_id=app&response_type=code")
        .set_form([("redirect_uri", "https://app.example/cb")])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["handler"], "post");
    assert_eq!(body["params"]["redirect_uri"], "https://app.example/cb");
}

#[actix_web::test]
async fn authorization_errors_follow_field_precedence() {
    let flow = flow();
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let req = test::TestRequest::get()
        .uri("/oauth2/authorization?client_id=app&response_type=code")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body,
        json!({
            "error": "invalid_request",
            "error_description": "Request was missing the 'redirect_uri' parameter.",
        })
    );

    let req = test::TestRequest::get()
        .uri("/oauth2/authorization?response_type=token&redirect_uri=x")
        .to_request();
    let body: OAuth2Error = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, OAuth2Error::missing_parameter("client_id"));

    let req = test::TestRequest::get()
        .uri("/oauth2/authorization?client_id=app&response_type=token&redirect_uri=x")
        .to_request();
    let body: OAuth2Error = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, OAuth2Error::unsupported_response_type("token"));
}

#[actix_web::test]
async fn authorization_without_handlers_answers_401_html() {
    let flow = AuthorizationCodeFlow::new("code");
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let query = "/oauth2/authorization?client_id=app&response_type=code&redirect_uri=cb";
    let resp = test::call_service(&app, test::TestRequest::get().uri(query).to_request()).await;
    assert_eq!(resp.status(), 401);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/html; charset=utf-8"
    );
    let body = test::read_body(resp).await;
    assert_eq!(
        body.as_ref(),
        b"<h1>OAuth Error</h1><p>Authorization unavailable</p>"
    );

    let resp = test::call_service(&app, test::TestRequest::post().uri(query).to_request()).await;
    assert_eq!(resp.status(), 401);
    let body = test::read_body(resp).await;
    assert_eq!(
        body.as_ref(),
        b"<h1>OAuth Error</h1><p>Authorization post unavailable</p>"
    );
}

#[actix_web::test]
async fn code_exchange_precedence() {
    let flow = flow();
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form([("grant_type", "authorization_code"), ("code", "c")])
        .to_request();
    let body: OAuth2Error = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, OAuth2Error::missing_parameter("client_id"));

    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form([
            ("grant_type", "authorization_code"),
            ("client_id", "app"),
            ("code", "c"),
            ("code_verifier", "v"),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        json!({
            "grant_type": "authorization_code",
            "client_id": "app",
            "code": "c",
            "code_verifier": "v",
        })
    );
}

#[actix_web::test]
async fn dedicated_refresh_url_is_installed_separately() {
    let flow = flow().with_refresh_token_route(
        RefreshTokenRoute::new("/oauth2/refresh_token").with_handler(tagged("refresh")),
    );
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let refresh = [
        ("grant_type", "refresh_token"),
        ("refresh_token", "rt"),
        ("client_id", "app"),
        ("client_secret", "s"),
    ];

    let req = test::TestRequest::post()
        .uri("/oauth2/refresh_token")
        .set_form(refresh)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["handler"], "refresh");

    // Not shared, so the token URL does not know the refresh grant.
    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form(refresh)
        .to_request();
    let body: OAuth2Error = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body,
        OAuth2Error::unsupported_grant_type_value("refresh_token")
    );

    let req = test::TestRequest::post()
        .uri("/oauth2/refresh_token")
        .set_form([("grant_type", "password")])
        .to_request();
    let body: OAuth2Error = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, OAuth2Error::unsupported_grant_type_value("password"));
}

#[actix_web::test]
async fn unsafe_refresh_accepts_public_clients() {
    let flow = flow().with_refresh_token_route(
        RefreshTokenRoute::new("/oauth2/token").with_unsafe_handler(tagged("unsafe")),
    );
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form([
            ("grant_type", "refresh_token"),
            ("refresh_token", "rt"),
            ("client_id", "app"),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["handler"], "unsafe");
    assert!(body["params"].get("client_secret").is_none());

    // Confidential requests fall back to the unsafe slot without a full handler.
    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form([
            ("grant_type", "refresh_token"),
            ("refresh_token", "rt"),
            ("client_id", "app"),
            ("client_secret", "s"),
        ])
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["handler"], "unsafe");
    assert_eq!(body["params"]["client_secret"], "s");
}

#[actix_web::test]
async fn refresh_bad_request_handler_owns_refresh_rejections() {
    let flow = flow().with_refresh_token_route(
        RefreshTokenRoute::new("/oauth2/token")
            .with_handler(tagged("refresh"))
            .with_bad_request_handler(common::teapot),
    );
    let app = test::init_service(App::new().configure(|cfg| flow.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form([
            ("grant_type", "refresh_token"),
            ("client_id", "app"),
            ("client_secret", "s"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 418);
    let body: OAuth2Error = test::read_body_json(resp).await;
    assert_eq!(body, OAuth2Error::missing_parameter("refresh_token"));

    // Code-exchange rejections still use the default responder.
    let req = test::TestRequest::post()
        .uri("/oauth2/token")
        .set_form([("grant_type", "authorization_code")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}
