use std::io::Read;

use axum::http::{self, Request, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use mock_server::{app, app_with_encoding, Encoding, API_KEY, LOGIN_PASSWORD, LOGIN_USERNAME, SITE_URL};
use serde_json::Value;
use tower::ServiceExt;

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn request(method: &str, uri: &str, authorization: Option<&str>) -> Request<String> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(value) = authorization {
        builder = builder.header(http::header::AUTHORIZATION, value);
    }
    builder.body(String::new()).unwrap()
}

fn api_key_auth() -> String {
    basic(API_KEY, "x")
}

// --- authentication ---

#[tokio::test]
async fn clients_require_credentials() {
    let resp = app()
        .oneshot(request("GET", "/api/v3/clients.json", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["Code"], 50);
}

#[tokio::test]
async fn clients_accept_api_key() {
    let resp = app()
        .oneshot(request("GET", "/api/v3/clients.json", Some(&api_key_auth())))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["Name"], "Client One");
}

#[tokio::test]
async fn expired_bearer_token_returns_121() {
    let resp = app()
        .oneshot(request(
            "GET",
            "/api/v3/countries.json",
            Some(&format!("Bearer {}", mock_server::EXPIRED_ACCESS_TOKEN)),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["Code"], 121);
    assert_eq!(body["Message"], "Expired OAuth Token");
}

// --- apikey ---

#[tokio::test]
async fn apikey_returns_key_for_valid_login() {
    let resp = app()
        .oneshot(request(
            "GET",
            &format!("/api/v3/apikey.json?SiteUrl={SITE_URL}"),
            Some(&basic(LOGIN_USERNAME, LOGIN_PASSWORD)),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ApiKey"], API_KEY);
}

#[tokio::test]
async fn apikey_rejects_api_key_auth() {
    let resp = app()
        .oneshot(request(
            "GET",
            &format!("/api/v3/apikey.json?SiteUrl={SITE_URL}"),
            Some(&api_key_auth()),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn apikey_rejects_unknown_site() {
    let resp = app()
        .oneshot(request(
            "GET",
            "/api/v3/apikey.json?SiteUrl=elsewhere.com",
            Some(&basic(LOGIN_USERNAME, LOGIN_PASSWORD)),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- status ---

#[tokio::test]
async fn status_route_echoes_code() {
    let resp = app()
        .oneshot(request("GET", "/api/v3/status/400?code=172", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["Code"], 172);
}

#[tokio::test]
async fn status_route_redirects_point_at_success() {
    let resp = app()
        .oneshot(request("GET", "/api/v3/status/302", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(http::header::LOCATION).unwrap(),
        mock_server::REDIRECT_TARGET
    );
    let body = body_json(resp).await;
    assert_eq!(body["Code"], 1);
}

#[tokio::test]
async fn padding_route_sizes_body_exactly() {
    let resp = app()
        .oneshot(request("GET", "/api/v3/padding/16", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await.len(), 16);

    let resp = app()
        .oneshot(request("GET", "/api/v3/padding/1", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- encoding ---

#[tokio::test]
async fn gzip_encoding_compresses_body() {
    let resp = app_with_encoding(Encoding::Gzip)
        .oneshot(request("GET", "/api/v3/billingdetails.json", Some(&api_key_auth())))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_ENCODING).unwrap(),
        "gzip"
    );
    let compressed = body_bytes(resp).await;
    let mut decoded = String::new();
    flate2::read::GzDecoder::new(compressed.as_ref())
        .read_to_string(&mut decoded)
        .unwrap();
    assert_eq!(decoded, r#"{"Credits":3021}"#);
}

// --- primary contact lifecycle ---

#[tokio::test]
async fn primary_contact_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();
    let auth = api_key_auth();

    // get the default
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/api/v3/primarycontact.json", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["EmailAddress"], "admin@example.com");

    // set a new one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "PUT",
            "/api/v3/primarycontact.json?email=other%40example.com",
            Some(&auth),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["EmailAddress"], "other@example.com");

    // invalid address is a 400 with an envelope
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request(
            "PUT",
            "/api/v3/primarycontact.json?email=nope",
            Some(&auth),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["Code"], 1);

    // the change persisted
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/api/v3/primarycontact.json", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["EmailAddress"], "other@example.com");
}
