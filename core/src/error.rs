//! Error types for the CreateSend client.
//!
//! # Design
//! Each classified status gets its own variant so callers can match on the
//! exact failure. `ExpiredOAuthToken` is a refinement of `Unauthorized`:
//! match it first to refresh a token, or use `Error::is_unauthorized` to
//! treat both alike. 400 and 401 carry the provider's structured error body;
//! the other classified failures carry only the status.

use std::fmt;

use serde::Deserialize;

use crate::fixture::FixtureError;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Provider-defined `Code` returned with a 401 when an OAuth token expired.
pub const EXPIRED_OAUTH_TOKEN_CODE: i64 = 121;

/// The JSON error envelope `{Code, Message, ResultData?}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "Code")]
    pub code: i64,
    #[serde(rename = "Message")]
    pub message: String,
    /// Opaque; its shape differs per endpoint.
    #[serde(rename = "ResultData", default)]
    pub result_data: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Looks up a key inside `ResultData` when it is a JSON object.
    pub fn result_field(&self, key: &str) -> Option<&serde_json::Value> {
        self.result_data.as_ref().and_then(|data| data.get(key))
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The CreateSend API responded with the following error - {}: {}",
            self.code, self.message
        )?;
        if let Some(data) = &self.result_data {
            write!(f, "\nExtra result data: {data}")?;
        }
        Ok(())
    }
}

/// Every failure a dispatched call can produce.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 400.
    #[error("{0}")]
    BadRequest(ErrorBody),

    /// 401 with any code other than 121.
    #[error("{0}")]
    Unauthorized(ErrorBody),

    /// 401 with code 121.
    #[error("{0}")]
    ExpiredOAuthToken(ErrorBody),

    /// 404.
    #[error("resource not found")]
    NotFound,

    /// 402, 403 and 405 through 499.
    #[error("client error: HTTP {status}")]
    ClientError { status: u16 },

    /// 500 through 599.
    #[error("server error: HTTP {status}")]
    ServerError { status: u16 },

    /// DNS, connect, TLS or read failure below HTTP.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The response declared a content encoding its body did not match.
    #[error("failed to decompress response body: {0}")]
    Decompression(#[source] std::io::Error),

    /// A test fixture did not match the request it intercepted.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// A success payload could not be decoded into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for both `Unauthorized` and `ExpiredOAuthToken`.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_) | Error::ExpiredOAuthToken(_))
    }

    /// The structured error body, for the variants that carry one.
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            Error::BadRequest(body) | Error::Unauthorized(body) | Error::ExpiredOAuthToken(body) => {
                Some(body)
            }
            _ => None,
        }
    }

    /// The HTTP status behind a classified API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::BadRequest(_) => Some(400),
            Error::Unauthorized(_) | Error::ExpiredOAuthToken(_) => Some(401),
            Error::NotFound => Some(404),
            Error::ClientError { status } | Error::ServerError { status } => Some(*status),
            _ => None,
        }
    }
}
