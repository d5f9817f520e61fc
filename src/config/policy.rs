//! Request policy definitions.
//!
//! This module provides the [`RequestPolicy`] enum that tells the underlying
//! client how to consult its own result cache. The dispatch layer never
//! caches results itself; it only carries the policy through.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cache policy hint handed to the GraphQL client.
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::RequestPolicy;
///
/// let policy: RequestPolicy = "network-only".parse().unwrap();
/// assert_eq!(policy, RequestPolicy::NetworkOnly);
/// assert_eq!(policy.to_string(), "network-only");
/// assert_eq!(RequestPolicy::default(), RequestPolicy::CacheFirst);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestPolicy {
    /// Use a cached result when present, otherwise fetch.
    #[default]
    CacheFirst,
    /// Only ever use cached results.
    CacheOnly,
    /// Always fetch, never use the cache.
    NetworkOnly,
    /// Return a cached result and refresh it in the background.
    CacheAndNetwork,
}

impl RequestPolicy {
    /// Returns the policy's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CacheFirst => "cache-first",
            Self::CacheOnly => "cache-only",
            Self::NetworkOnly => "network-only",
            Self::CacheAndNetwork => "cache-and-network",
        }
    }
}

impl fmt::Display for RequestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cache-first" => Ok(Self::CacheFirst),
            "cache-only" => Ok(Self::CacheOnly),
            "network-only" => Ok(Self::NetworkOnly),
            "cache-and-network" => Ok(Self::CacheAndNetwork),
            _ => Err(ConfigError::InvalidRequestPolicy {
                policy: s.to_string(),
            }),
        }
    }
}
