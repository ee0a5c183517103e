//! Client configuration and the shared context handle.
//!
//! `ClientConfig` is a plain value with builder methods. `Context` wraps one
//! behind a lock so several dispatchers can share a base endpoint and a
//! default set of credentials; each call reads a snapshot of it.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::auth::Credentials;
use crate::error::{Error, Result};

/// Production endpoint of the CreateSend API.
pub const DEFAULT_BASE_URI: &str = "http://api.createsend.com/api/v3";

/// Version reported in the `User-Agent` header.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and base path every request path is appended to.
    pub base_uri: String,

    /// User agent string.
    pub user_agent: String,

    /// Default credentials for every dispatcher sharing this configuration.
    pub credentials: Option<Credentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            user_agent: format!("createsend-rust-{CLIENT_VERSION}"),
            credentials: None,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with the given base URI.
    #[must_use]
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the default credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the base URI is empty, is not
    /// http(s), or has no host.
    pub fn validate(&self) -> Result<()> {
        if self.base_uri.is_empty() {
            return Err(Error::InvalidConfig("base_uri cannot be empty".to_string()));
        }

        let parsed = url::Url::parse(&self.base_uri)
            .map_err(|e| Error::InvalidConfig(format!("base_uri is not a valid URL: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(
                "base_uri must start with http:// or https://".to_string(),
            ));
        }

        if parsed.host_str().is_none() {
            return Err(Error::InvalidConfig("base_uri must name a host".to_string()));
        }

        Ok(())
    }
}

/// Shared, mutable configuration handed to dispatchers explicitly.
///
/// Clones share the same state. Writers are last-write-wins; a call in
/// progress keeps the snapshot it started with.
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<RwLock<ClientConfig>>,
}

impl Context {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> ClientConfig {
        self.inner.read().clone()
    }

    pub fn base_uri(&self) -> String {
        self.inner.read().base_uri.clone()
    }

    /// Points every dispatcher sharing this context at another deployment.
    pub fn set_base_uri(&self, base_uri: impl Into<String>) {
        self.inner.write().base_uri = base_uri.into().trim_end_matches('/').to_string();
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.inner.read().credentials.clone()
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        self.inner.write().credentials = Some(credentials);
    }

    pub fn clear_credentials(&self) {
        self.inner.write().credentials = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_production() {
        let config = ClientConfig::default();
        assert_eq!(config.base_uri, DEFAULT_BASE_URI);
        assert_eq!(config.user_agent, format!("createsend-rust-{CLIENT_VERSION}"));
        assert!(config.credentials.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_sets_fields() {
        let config = ClientConfig::new("https://api.example.com/api/v3/")
            .with_user_agent("my-app/1.0")
            .with_credentials(Credentials::api_key("abc"));
        assert_eq!(config.base_uri, "https://api.example.com/api/v3");
        assert_eq!(config.user_agent, "my-app/1.0");
        assert_eq!(config.credentials, Some(Credentials::api_key("abc")));
    }

    #[test]
    fn validate_rejects_empty_uri() {
        assert!(matches!(
            ClientConfig::new("").validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_other_schemes() {
        assert!(ClientConfig::new("ftp://api.example.com").validate().is_err());
        assert!(ClientConfig::new("not a url").validate().is_err());
    }

    #[test]
    fn context_clones_share_state() {
        let context = Context::default();
        let other = context.clone();
        other.set_credentials(Credentials::api_key("shared"));
        other.set_base_uri("http://localhost:9999/api/v3/");
        assert_eq!(context.credentials(), Some(Credentials::api_key("shared")));
        assert_eq!(context.base_uri(), "http://localhost:9999/api/v3");

        context.clear_credentials();
        assert!(other.credentials().is_none());
    }

    #[test]
    fn snapshot_is_detached() {
        let context = Context::default();
        let before = context.snapshot();
        context.set_credentials(Credentials::oauth("t", None));
        assert!(before.credentials.is_none());
    }
}
