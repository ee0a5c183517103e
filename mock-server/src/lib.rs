//! In-memory stand-in for the CreateSend account endpoints.
//!
//! Serves the `/api/v3` account routes with the provider's authentication
//! rules and error envelopes, optionally compressing every response body, so
//! the client can be exercised over real HTTP.

use std::io::Write;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

pub const API_KEY: &str = "mock-api-key";
pub const ACCESS_TOKEN: &str = "mock-access-token";
pub const EXPIRED_ACCESS_TOKEN: &str = "mock-expired-token";
pub const SITE_URL: &str = "example.createsend.com";
pub const LOGIN_USERNAME: &str = "admin";
pub const LOGIN_PASSWORD: &str = "secret";
/// Target of the `Location` header sent with 3xx answers.
pub const REDIRECT_TARGET: &str = "/api/v3/status/200";
/// Largest body the padding route will generate.
pub const MAX_PADDING: usize = 64 * 1024 * 1024;

/// Content encoding applied to every response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Identity,
    Gzip,
    Deflate,
}

#[derive(Debug, Clone)]
pub struct Account {
    pub primary_contact: String,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            primary_contact: "admin@example.com".to_string(),
        }
    }
}

pub type Db = Arc<RwLock<Account>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    encoding: Encoding,
}

#[derive(Deserialize)]
struct ApiKeyParams {
    #[serde(rename = "SiteUrl")]
    site_url: Option<String>,
}

#[derive(Deserialize)]
struct EmailParams {
    email: Option<String>,
}

#[derive(Deserialize)]
struct StatusParams {
    code: Option<i64>,
}

pub fn app() -> Router {
    app_with_encoding(Encoding::Identity)
}

pub fn app_with_encoding(encoding: Encoding) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Account::default())),
        encoding,
    };
    Router::new()
        .route("/api/v3/apikey.json", get(apikey))
        .route("/api/v3/clients.json", get(clients))
        .route("/api/v3/billingdetails.json", get(billing_details))
        .route("/api/v3/countries.json", get(countries))
        .route("/api/v3/systemdate.json", get(system_date))
        .route("/api/v3/timezones.json", get(timezones))
        .route("/api/v3/admins.json", get(administrators))
        .route(
            "/api/v3/primarycontact.json",
            get(get_primary_contact).put(set_primary_contact),
        )
        .route("/api/v3/status/{status}", get(status))
        .route("/api/v3/padding/{size}", get(padding))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_encoding(listener, Encoding::Identity).await
}

pub async fn run_with_encoding(listener: TcpListener, encoding: Encoding) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_encoding(encoding)).await
}

fn error_envelope(code: i64, message: &str) -> Value {
    json!({ "Code": code, "Message": message })
}

fn compress(encoding: Encoding, raw: Vec<u8>) -> std::io::Result<Vec<u8>> {
    match encoding {
        Encoding::Identity => Ok(raw),
        Encoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&raw)?;
            encoder.finish()
        }
        Encoding::Deflate => {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&raw)?;
            encoder.finish()
        }
    }
}

impl AppState {
    fn respond(&self, status: StatusCode, body: &Value) -> Response {
        let raw = body.to_string().into_bytes();
        let content_type = (header::CONTENT_TYPE, "application/json; charset=utf-8");
        let encoded = match compress(self.encoding, raw) {
            Ok(encoded) => encoded,
            Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        };
        match self.encoding {
            Encoding::Identity => (status, [content_type], encoded).into_response(),
            Encoding::Gzip => {
                (status, [content_type, (header::CONTENT_ENCODING, "gzip")], encoded).into_response()
            }
            Encoding::Deflate => {
                (status, [content_type, (header::CONTENT_ENCODING, "deflate")], encoded).into_response()
            }
        }
    }

    /// Responds with `body` when the caller holds the API key or a live
    /// OAuth token, otherwise with the provider's 401 envelope.
    fn authorized(&self, headers: &HeaderMap, body: Value) -> Response {
        match check_credentials(headers) {
            Ok(()) => self.respond(StatusCode::OK, &body),
            Err(envelope) => self.respond(StatusCode::UNAUTHORIZED, &envelope),
        }
    }
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn check_credentials(headers: &HeaderMap) -> Result<(), Value> {
    let Some(value) = authorization(headers) else {
        return Err(error_envelope(50, "Must supply a valid HTTP Basic Authorization header"));
    };
    if let Some(token) = value.strip_prefix("Bearer ") {
        return match token {
            ACCESS_TOKEN => Ok(()),
            EXPIRED_ACCESS_TOKEN => Err(error_envelope(121, "Expired OAuth Token")),
            _ => Err(error_envelope(120, "Invalid OAuth Token")),
        };
    }
    match decode_basic(value) {
        Some((username, _)) if username == API_KEY => Ok(()),
        _ => Err(error_envelope(100, "Invalid API Key")),
    }
}

async fn apikey(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ApiKeyParams>,
) -> Response {
    let login = authorization(&headers).and_then(decode_basic);
    let valid_login = matches!(
        &login,
        Some((username, password)) if username == LOGIN_USERNAME && password == LOGIN_PASSWORD
    );
    if !valid_login {
        return state.respond(
            StatusCode::UNAUTHORIZED,
            &error_envelope(50, "Must supply a valid HTTP Basic Authorization header"),
        );
    }
    if params.site_url.as_deref() != Some(SITE_URL) {
        return state.respond(
            StatusCode::BAD_REQUEST,
            &error_envelope(1, "Invalid SiteUrl"),
        );
    }
    state.respond(StatusCode::OK, &json!({ "ApiKey": API_KEY }))
}

async fn clients(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.authorized(
        &headers,
        json!([
            { "ClientID": "4a397ccaaa55eb4e6aa1221e1e2d7122", "Name": "Client One" },
            { "ClientID": "a206def0582eec7dae47d937a4109cb2", "Name": "Client Two" }
        ]),
    )
}

async fn billing_details(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.authorized(&headers, json!({ "Credits": 3021 }))
}

async fn countries(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.authorized(&headers, json!(["Afghanistan", "Australia", "Brazil"]))
}

async fn system_date(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.authorized(&headers, json!({ "SystemDate": "2010-10-15 09:27:00" }))
}

async fn timezones(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.authorized(
        &headers,
        json!(["(GMT) Casablanca", "(GMT+10:00) Canberra, Melbourne, Sydney"]),
    )
}

async fn administrators(State(state): State<AppState>, headers: HeaderMap) -> Response {
    state.authorized(
        &headers,
        json!([
            { "EmailAddress": "admin@example.com", "Name": "Admin One", "Status": "Active" },
            { "EmailAddress": "other@example.com", "Name": "Admin Two", "Status": "Waiting to Accept the Invitation" }
        ]),
    )
}

async fn get_primary_contact(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let email = state.db.read().await.primary_contact.clone();
    state.authorized(&headers, json!({ "EmailAddress": email }))
}

async fn set_primary_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EmailParams>,
) -> Response {
    if let Err(envelope) = check_credentials(&headers) {
        return state.respond(StatusCode::UNAUTHORIZED, &envelope);
    }
    let Some(email) = params.email.filter(|e| e.contains('@')) else {
        return state.respond(
            StatusCode::BAD_REQUEST,
            &error_envelope(1, "Invalid Email Address"),
        );
    };
    debug!(%email, "primary contact updated");
    state.db.write().await.primary_contact = email.clone();
    state.respond(StatusCode::OK, &json!({ "EmailAddress": email }))
}

/// Answers with an arbitrary status; non-2xx statuses carry an error
/// envelope whose `Code` is taken from the `code` query parameter, and 3xx
/// statuses point `Location` at the 200 route.
async fn status(
    State(state): State<AppState>,
    Path(status): Path<u16>,
    Query(params): Query<StatusParams>,
) -> Response {
    let Ok(status) = StatusCode::from_u16(status) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if status.is_success() {
        return state.respond(status, &json!({ "Status": status.as_u16() }));
    }
    let envelope = error_envelope(params.code.unwrap_or(1), "Mock failure");
    let mut response = state.respond(status, &envelope);
    if status.is_redirection() {
        response
            .headers_mut()
            .insert(header::LOCATION, HeaderValue::from_static(REDIRECT_TARGET));
    }
    response
}

/// A 200 JSON string of exactly `size` bytes once quoted.
async fn padding(State(state): State<AppState>, Path(size): Path<usize>) -> Response {
    if !(2..=MAX_PADDING).contains(&size) {
        return state.respond(StatusCode::BAD_REQUEST, &error_envelope(1, "Invalid size"));
    }
    state.respond(StatusCode::OK, &Value::String("a".repeat(size - 2)))
}
