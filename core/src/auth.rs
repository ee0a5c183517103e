//! Credentials and the `Authorization` header they produce.
//!
//! # Design
//! Resolution is a pure function over the three places credentials can come
//! from: a per-call Basic override, the shared context default, and the
//! dispatcher's own credentials. Precedence is Basic override, then API key
//! (context before instance), then OAuth (instance before context), then
//! stored Basic credentials, then nothing.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Password sent alongside an API key, which travels as the Basic username.
pub const API_KEY_PASSWORD: &str = "x";

/// Username and password for HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Basic <base64(username:password)>`.
    pub fn header_value(&self) -> String {
        basic_header(&self.username, &self.password)
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// The authentication scheme attached to outgoing requests.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey {
        key: String,
    },
    OAuth {
        access_token: String,
        refresh_token: Option<String>,
    },
    Basic(BasicAuth),
}

impl Credentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey { key: key.into() }
    }

    pub fn oauth(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Credentials::OAuth {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::Basic(BasicAuth::new(username, password))
    }

    /// Short label for logs; never includes the secret.
    pub fn kind(&self) -> &'static str {
        match self {
            Credentials::ApiKey { .. } => "api_key",
            Credentials::OAuth { .. } => "oauth",
            Credentials::Basic(_) => "basic",
        }
    }

    fn as_api_key(&self) -> Option<&str> {
        match self {
            Credentials::ApiKey { key } => Some(key),
            _ => None,
        }
    }

    fn as_access_token(&self) -> Option<&str> {
        match self {
            Credentials::OAuth { access_token, .. } => Some(access_token),
            _ => None,
        }
    }

    fn as_basic(&self) -> Option<&BasicAuth> {
        match self {
            Credentials::Basic(basic) => Some(basic),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::ApiKey { key } => f
                .debug_struct("ApiKey")
                .field("key", &mask_secret(key))
                .finish(),
            Credentials::OAuth {
                access_token,
                refresh_token,
            } => f
                .debug_struct("OAuth")
                .field("access_token", &mask_secret(access_token))
                .field("refresh_token", &refresh_token.as_deref().map(mask_secret))
                .finish(),
            Credentials::Basic(basic) => basic.fmt(f),
        }
    }
}

/// Picks the `Authorization` header value for one call, if any.
///
/// A Basic override with an empty username or password is ignored.
pub fn authorization_header(
    basic_override: Option<&BasicAuth>,
    shared: Option<&Credentials>,
    instance: Option<&Credentials>,
) -> Option<String> {
    let complete = |b: &&BasicAuth| !b.username.is_empty() && !b.password.is_empty();
    if let Some(basic) = basic_override.filter(complete) {
        return Some(basic.header_value());
    }

    let api_key = shared
        .and_then(Credentials::as_api_key)
        .or_else(|| instance.and_then(Credentials::as_api_key));
    if let Some(key) = api_key {
        return Some(basic_header(key, API_KEY_PASSWORD));
    }

    let access_token = instance
        .and_then(Credentials::as_access_token)
        .or_else(|| shared.and_then(Credentials::as_access_token));
    if let Some(token) = access_token {
        return Some(format!("Bearer {token}"));
    }

    instance
        .and_then(Credentials::as_basic)
        .or_else(|| shared.and_then(Credentials::as_basic))
        .map(BasicAuth::header_value)
}

fn basic_header(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// Mask sensitive values for logging.
pub(crate) fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

/// Masks the credential of an `Authorization` value, keeping the scheme.
pub(crate) fn mask_authorization(value: &str) -> String {
    match value.split_once(' ') {
        Some((scheme, credential)) => format!("{scheme} {}", mask_secret(credential)),
        None => mask_secret(value),
    }
}
