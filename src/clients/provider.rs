//! Lazy, endpoint-keyed client construction.
//!
//! This module provides the [`ClientProvider`], which holds the current
//! [`ConnectionConfig`] and builds clients on first use through a
//! [`ClientFactory`], caching one instance per endpoint.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};

use crate::clients::client::GraphqlClient;
use crate::config::ConnectionConfig;

/// Builds a client for a connection configuration.
///
/// Implemented for any `Fn(&ConnectionConfig) -> C` where `C` is a client,
/// so a closure is usually all that is needed.
///
/// # Example
///
/// ```rust,ignore
/// use graphql_dispatch::{ConnectionConfig, clients::ClientProvider};
///
/// let provider = ClientProvider::new(|config: &ConnectionConfig| MyClient::connect(config));
/// ```
pub trait ClientFactory: Send + Sync {
    /// Constructs a new client. Called at most once per endpoint by a provider.
    fn construct(&self, config: &ConnectionConfig) -> Arc<dyn GraphqlClient>;
}

impl<F, C> ClientFactory for F
where
    F: Fn(&ConnectionConfig) -> C + Send + Sync,
    C: GraphqlClient + 'static,
{
    fn construct(&self, config: &ConnectionConfig) -> Arc<dyn GraphqlClient> {
        Arc::new(self(config))
    }
}

/// Owns the connection configuration and the per-endpoint client cache.
///
/// # Caching
///
/// The client for an endpoint is constructed the first time
/// [`get_client`](Self::get_client) is called while that endpoint is
/// configured. It is then reused for the provider's whole lifetime, even if
/// the configuration is later replaced and restored. Other settings in a
/// later configuration with the same endpoint do not rebuild the client.
///
/// # Thread Safety
///
/// `ClientProvider` is `Send + Sync`. The factory runs with no provider lock
/// held, so it may call back into the provider, but it must not request a
/// client for the endpoint it is building. Concurrent first requests for one
/// endpoint wait for a single construction.
pub struct ClientProvider {
    factory: Box<dyn ClientFactory>,
    config: RwLock<Option<ConnectionConfig>>,
    clients: Mutex<HashMap<String, ClientSlot>>,
}

type ClientSlot = Arc<OnceLock<Arc<dyn GraphqlClient>>>;

// Verify ClientProvider is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientProvider>();
};

impl ClientProvider {
    /// Creates an unconfigured provider.
    #[must_use]
    pub fn new(factory: impl ClientFactory + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            config: RwLock::new(None),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Stores `config`, replacing any previous configuration.
    pub fn configure(&self, config: ConnectionConfig) {
        let mut current = self.config.write().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some(previous) if previous.endpoint() != config.endpoint() => {
                tracing::debug!(
                    "GraphQL client reconfigured from {} to {}",
                    previous.endpoint(),
                    config.endpoint()
                );
            }
            Some(_) => {
                tracing::debug!(
                    "GraphQL client reconfigured for {}; the cached client is kept",
                    config.endpoint()
                );
            }
            None => tracing::debug!("GraphQL client configured for {}", config.endpoint()),
        }
        *current = Some(config);
    }

    /// Returns the client for the configured endpoint, building it on first use.
    ///
    /// Returns `None` if [`configure`](Self::configure) has never been called.
    #[must_use]
    pub fn get_client(&self) -> Option<Arc<dyn GraphqlClient>> {
        let config = self.config()?;
        let slot = Arc::clone(
            self.lock_clients()
                .entry(config.endpoint().as_str().to_string())
                .or_default(),
        );

        let client = slot.get_or_init(|| {
            tracing::debug!("Constructing GraphQL client for {}", config.endpoint());
            self.factory.construct(&config)
        });
        Some(Arc::clone(client))
    }

    /// Returns `true` once a configuration has been supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns a copy of the current configuration.
    #[must_use]
    pub fn config(&self) -> Option<ConnectionConfig> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the endpoints that have a constructed client, sorted.
    #[must_use]
    pub fn cached_endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self
            .lock_clients()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(endpoint, _)| endpoint.clone())
            .collect();
        endpoints.sort();
        endpoints
    }

    fn lock_clients(&self) -> MutexGuard<'_, HashMap<String, ClientSlot>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ClientProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientProvider")
            .field("config", &self.config())
            .field("clients", &self.cached_endpoints())
            .finish_non_exhaustive()
    }
}
