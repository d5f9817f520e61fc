//! Connection configuration for the dispatch layer.
//!
//! This module provides the types passed to
//! [`Graphql::initialize`](crate::Graphql::initialize) and forwarded to the
//! [`ClientFactory`](crate::clients::ClientFactory) when a client is built.
//!
//! # Overview
//!
//! - [`ConnectionConfig`]: Everything needed to construct a client
//! - [`ConnectionConfigBuilder`]: A builder for constructing [`ConnectionConfig`] instances
//! - [`Endpoint`]: A validated endpoint URL, also the client cache key
//! - [`RequestPolicy`]: Cache policy hint for the client
//!
//! # Example
//!
//! ```rust
//! use graphql_dispatch::{ConnectionConfig, Endpoint, RequestPolicy};
//!
//! let config = ConnectionConfig::builder()
//!     .endpoint(Endpoint::new("https://api.example.com/graphql").unwrap())
//!     .header("Authorization", "Bearer token")
//!     .request_policy(RequestPolicy::NetworkOnly)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.endpoint().as_str(), "https://api.example.com/graphql");
//! ```

mod newtypes;
mod policy;

pub use newtypes::Endpoint;
pub use policy::RequestPolicy;

use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Parameters needed to construct a GraphQL client.
///
/// Supplying a new configuration replaces the previous one entirely; fields
/// are never merged across calls to `initialize`.
///
/// # Thread Safety
///
/// `ConnectionConfig` is `Clone`, `Send`, and `Sync`.
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::{ConnectionConfig, Endpoint};
///
/// let config = ConnectionConfig::new(Endpoint::new("wss://api.example.com/graphql").unwrap());
/// assert!(config.headers().is_empty());
/// assert!(!config.prefer_get_method());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    endpoint: Endpoint,
    headers: BTreeMap<String, String>,
    request_policy: RequestPolicy,
    prefer_get_method: bool,
    user_agent_prefix: Option<String>,
}

impl ConnectionConfig {
    /// Creates a configuration for `endpoint` with every other field defaulted.
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            headers: BTreeMap::new(),
            request_policy: RequestPolicy::default(),
            prefer_get_method: false,
            user_agent_prefix: None,
        }
    }

    /// Creates a new builder for constructing a `ConnectionConfig`.
    #[must_use]
    pub fn builder() -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new()
    }

    /// Returns the endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the default headers sent with every operation.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the default request policy.
    #[must_use]
    pub const fn request_policy(&self) -> RequestPolicy {
        self.request_policy
    }

    /// Returns whether queries should be sent as GET requests when possible.
    #[must_use]
    pub const fn prefer_get_method(&self) -> bool {
        self.prefer_get_method
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify ConnectionConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConnectionConfig>();
};

/// Builder for constructing [`ConnectionConfig`] instances.
///
/// `endpoint` is required. All other fields have defaults.
///
/// # Defaults
///
/// - `headers`: Empty
/// - `request_policy`: [`RequestPolicy::CacheFirst`]
/// - `prefer_get_method`: `false`
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    endpoint: Option<Endpoint>,
    headers: BTreeMap<String, String>,
    request_policy: Option<RequestPolicy>,
    prefer_get_method: Option<bool>,
    user_agent_prefix: Option<String>,
}

impl ConnectionConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint (required).
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Adds a default header. A later call with the same name replaces the value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the default request policy.
    #[must_use]
    pub const fn request_policy(mut self, policy: RequestPolicy) -> Self {
        self.request_policy = Some(policy);
        self
    }

    /// Sets whether queries should prefer GET requests.
    #[must_use]
    pub const fn prefer_get_method(mut self, prefer: bool) -> Self {
        self.prefer_get_method = Some(prefer);
        self
    }

    /// Sets the user agent prefix for requests made by the client.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ConnectionConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `endpoint` is not set.
    pub fn build(self) -> Result<ConnectionConfig, ConfigError> {
        let endpoint = self
            .endpoint
            .ok_or(ConfigError::MissingRequiredField { field: "endpoint" })?;

        Ok(ConnectionConfig {
            endpoint,
            headers: self.headers,
            request_policy: self.request_policy.unwrap_or_default(),
            prefer_get_method: self.prefer_get_method.unwrap_or(false),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Endpoint {
        Endpoint::new("https://api.example.com/graphql").unwrap()
    }

    #[test]
    fn test_builder_requires_endpoint() {
        let result = ConnectionConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "endpoint" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ConnectionConfig::builder()
            .endpoint(endpoint())
            .build()
            .unwrap();

        assert_eq!(config.request_policy(), RequestPolicy::CacheFirst);
        assert!(config.headers().is_empty());
        assert!(!config.prefer_get_method());
        assert!(config.user_agent_prefix().is_none());
        assert_eq!(config, ConnectionConfig::new(endpoint()));
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ConnectionConfig::builder()
            .endpoint(endpoint())
            .header("Authorization", "Bearer a")
            .header("Authorization", "Bearer b")
            .header("X-Client", "tests")
            .request_policy(RequestPolicy::CacheAndNetwork)
            .prefer_get_method(true)
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        assert_eq!(config.headers().len(), 2);
        assert_eq!(
            config.headers().get("Authorization").map(String::as_str),
            Some("Bearer b")
        );
        assert_eq!(config.request_policy(), RequestPolicy::CacheAndNetwork);
        assert!(config.prefer_get_method());
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
    }

    #[test]
    fn test_config_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConnectionConfig>();
    }
}
