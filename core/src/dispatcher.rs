//! The request dispatcher every API call goes through.
//!
//! # Design
//! A call is split the same way every time: `build_request` resolves the URL
//! and headers from the shared context and the dispatcher's own credentials
//! without touching the network; the request then goes either to the ureq
//! transport or, in test mode, to the installed fixture; finally
//! `response::classify` turns the status into the payload or a typed error.
//! Nothing is retried.

use std::fmt;

use tracing::{debug, trace};
use ureq::Agent;

use crate::auth::{self, BasicAuth, Credentials};
use crate::config::{ClientConfig, Context};
use crate::error::Result;
use crate::fixture::{Fixture, FixtureError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::response;
use crate::transport;

pub const CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const ACCEPT_ENCODING: &str = "gzip, deflate";

/// Method, path, query and body of one call, before it is resolved against
/// the base endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    /// Serialized in insertion order.
    pub query: Vec<(String, String)>,
    /// Forwarded as-is; usually JSON serialized by the caller.
    pub body: String,
    /// Replaces every other credential for this call only. Ignored unless
    /// both username and password are non-empty.
    pub basic_override: Option<BasicAuth>,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: String::new(),
            basic_override: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query_pairs<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn basic_override(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_override = Some(BasicAuth::new(username, password));
        self
    }
}

/// Owns authentication state and performs calls against the CreateSend API.
pub struct Dispatcher {
    context: Context,
    credentials: Option<Credentials>,
    test_mode: bool,
    fixture: Option<Fixture>,
    last_request: Option<HttpRequest>,
    agent: Agent,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("context", &self.context)
            .field("credentials", &self.credentials)
            .field("test_mode", &self.test_mode)
            .field("fixture", &self.fixture)
            .finish_non_exhaustive()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Context::default())
    }
}

impl Dispatcher {
    /// Dispatcher reading its base endpoint and default credentials from
    /// `context`.
    pub fn new(context: Context) -> Self {
        Self {
            context,
            credentials: None,
            test_mode: false,
            fixture: None,
            last_request: None,
            agent: transport::default_agent(),
        }
    }

    /// Dispatcher with a private context built from `config`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the configuration does not validate.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(Context::new(config)))
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Replaces this dispatcher's credentials; the previous kind is dropped.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        debug!(kind = credentials.kind(), "credentials replaced");
        self.credentials = Some(credentials);
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn clear_credentials(&mut self) {
        self.credentials = None;
    }

    /// Switches this dispatcher into test mode; the next call is answered by
    /// `fixture` instead of the network.
    pub fn install_fixture(&mut self, fixture: Fixture) {
        trace!(url = fixture.url(), "fixture installed");
        self.test_mode = true;
        self.fixture = Some(fixture);
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    /// The last request this dispatcher built, headers included.
    pub fn last_request(&self) -> Option<&HttpRequest> {
        self.last_request.as_ref()
    }

    /// Resolves `spec` into the exact request that would be sent.
    pub fn build_request(&self, spec: &RequestSpec) -> HttpRequest {
        let config = self.context.snapshot();

        let mut headers = vec![
            ("User-Agent".to_string(), config.user_agent.clone()),
            ("Content-Type".to_string(), CONTENT_TYPE.to_string()),
            ("Accept-Encoding".to_string(), ACCEPT_ENCODING.to_string()),
        ];
        if let Some(value) = auth::authorization_header(
            spec.basic_override.as_ref(),
            config.credentials.as_ref(),
            self.credentials.as_ref(),
        ) {
            headers.push(("Authorization".to_string(), value));
        }

        HttpRequest {
            method: spec.method,
            url: build_url(&config.base_uri, &spec.path, &spec.query),
            headers,
            body: spec.body.clone(),
        }
    }

    /// Performs one call and returns the raw success payload.
    ///
    /// # Errors
    ///
    /// Classified API failures per `response::classify`, `Error::Transport`
    /// for failures below HTTP, and `Error::Fixture` when a test fixture does
    /// not match the request.
    pub fn execute(&mut self, spec: RequestSpec) -> Result<Vec<u8>> {
        let request = self.build_request(&spec);
        let masked = request.header("Authorization").map(auth::mask_authorization);
        debug!(
            method = %request.method,
            url = %request.url,
            authorization = masked.as_deref(),
            test_mode = self.test_mode,
            "dispatching request"
        );
        self.last_request = Some(request.clone());

        let response = if self.test_mode {
            self.intercept(&request)?
        } else {
            transport::execute(&self.agent, &request)?
        };
        response::handle_response(response)
    }

    pub fn get(&mut self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.execute(RequestSpec::get(path).query_pairs(query.iter().copied()))
    }

    pub fn post(&mut self, path: &str, body: impl Into<String>) -> Result<Vec<u8>> {
        self.execute(RequestSpec::post(path).body(body))
    }

    pub fn put(&mut self, path: &str, body: impl Into<String>, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.execute(
            RequestSpec::put(path)
                .body(body)
                .query_pairs(query.iter().copied()),
        )
    }

    pub fn delete(&mut self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>> {
        self.execute(RequestSpec::delete(path).query_pairs(query.iter().copied()))
    }

    fn intercept(&mut self, request: &HttpRequest) -> Result<HttpResponse> {
        let fixture = self.fixture.take().ok_or_else(|| FixtureError::Exhausted {
            url: request.url.clone(),
        })?;
        fixture.verify(&request.url, &request.body)?;

        let status = fixture.status();
        let body = fixture.open()?;
        trace!(status, url = %request.url, "request answered by fixture");
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// `base + path`, plus `?` and the form-encoded pairs when there are any.
pub fn build_url(base_uri: &str, path: &str, query: &[(String, String)]) -> String {
    let mut url = format!("{}{}", base_uri.trim_end_matches('/'), path);
    if !query.is_empty() {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish();
        url.push('?');
        url.push_str(&encoded);
    }
    url
}
