//! Recorded responses substituted for the network in tests.
//!
//! A `Fixture` states which URL (and optionally which body) the next call
//! must produce, and what status and payload to answer it with. Installing
//! one on a dispatcher switches that dispatcher into test mode; the fixture
//! is consumed by the first call it intercepts.

use std::fs;
use std::path::PathBuf;

/// Status served when a fixture does not set one.
pub const DEFAULT_FIXTURE_STATUS: u16 = 200;

/// Where a fixture's payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureSource {
    Inline(Vec<u8>),
    File(PathBuf),
}

/// Programmer-facing failures of fixture mode; never API errors.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("fixture's expected URL ({expected}) doesn't match actual URL ({actual})")]
    UrlMismatch { expected: String, actual: String },

    #[error("fixture's expected body ({expected}) doesn't match actual body ({actual})")]
    BodyMismatch { expected: String, actual: String },

    #[error("test mode is active but no fixture is installed for {url}")]
    Exhausted { url: String },

    #[error("failed to read fixture payload {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A recorded request/response pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    url: String,
    source: FixtureSource,
    status: Option<u16>,
    body: Option<String>,
}

impl Fixture {
    pub fn new(expected_url: impl Into<String>, source: FixtureSource) -> Self {
        Self {
            url: expected_url.into(),
            source,
            status: None,
            body: None,
        }
    }

    /// Fixture answering with an in-memory payload.
    pub fn inline(expected_url: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(expected_url, FixtureSource::Inline(payload.into()))
    }

    /// Fixture answering with the contents of a file, read when intercepted.
    pub fn from_file(expected_url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(expected_url, FixtureSource::File(path.into()))
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Requires the intercepted request body to equal `body` exactly.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn status(&self) -> u16 {
        self.status.unwrap_or(DEFAULT_FIXTURE_STATUS)
    }

    /// Checks an intercepted request against the expectations.
    pub(crate) fn verify(&self, actual_url: &str, actual_body: &str) -> Result<(), FixtureError> {
        if self.url != actual_url {
            return Err(FixtureError::UrlMismatch {
                expected: self.url.clone(),
                actual: actual_url.to_string(),
            });
        }
        if let Some(expected) = &self.body {
            if expected != actual_body {
                return Err(FixtureError::BodyMismatch {
                    expected: expected.clone(),
                    actual: actual_body.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reads the payload, consuming the fixture.
    pub(crate) fn open(self) -> Result<Vec<u8>, FixtureError> {
        match self.source {
            FixtureSource::Inline(bytes) => Ok(bytes),
            FixtureSource::File(path) => {
                fs::read(&path).map_err(|source| FixtureError::Source { path, source })
            }
        }
    }
}
