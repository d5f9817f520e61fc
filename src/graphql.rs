//! The dispatch facade.
//!
//! This module provides [`Graphql`], which ties an [`OperationSet`] to a
//! [`ClientProvider`] and a [`SubscriptionRegistry`] and hands out the five
//! operation namespaces.

use std::fmt;

use crate::clients::{ClientFactory, ClientProvider};
use crate::config::ConnectionConfig;
use crate::operations::{Category, OperationSet, Operations, RawOperations};
use crate::subscriptions::{SubscriptionRegistry, Subscriptions};

/// Named GraphQL operations backed by a lazily constructed client.
///
/// The facade owns its client provider and subscription registry; nothing
/// is shared between two `Graphql` values.
///
/// # Lifecycle
///
/// 1. [`Graphql::new`] creates an idle registry bucket for every
///    subscription in the already validated [`OperationSet`]
/// 2. [`Graphql::initialize`] supplies the connection configuration; it can
///    be called again later, and the last call wins
/// 3. Operations are looked up by name and called; the first call for an
///    endpoint constructs its client
///
/// Calling an operation before `initialize` fails with
/// [`DispatchError::ClientNotConfigured`](crate::DispatchError::ClientNotConfigured).
///
/// # Thread Safety
///
/// `Graphql` is `Send + Sync`; share it behind an `Arc` between tasks.
///
/// # Example
///
/// ```rust,ignore
/// use graphql_dispatch::operations::OperationSet;
/// use graphql_dispatch::{ConnectionConfig, Endpoint, Graphql};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Me {
///     me: User,
/// }
///
/// let operations = OperationSet::builder()
///     .query("me", "query Me { me { id name } }")
///     .raw_mutation("rename", "mutation Rename($name: String!) { rename(name: $name) { id } }")
///     .build()?;
///
/// let graphql = Graphql::new(operations, |config: &ConnectionConfig| MyClient::connect(config));
/// graphql.initialize(ConnectionConfig::new(Endpoint::new("https://api.example.com/graphql")?));
///
/// let me: Me = graphql.queries().get("me")?.call(&(), None).await?;
/// ```
pub struct Graphql {
    operations: OperationSet,
    provider: ClientProvider,
    registry: SubscriptionRegistry,
}

// Verify Graphql is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Graphql>();
};

impl Graphql {
    /// Creates a facade over `operations`, building clients with `factory`.
    #[must_use]
    pub fn new(operations: OperationSet, factory: impl ClientFactory + 'static) -> Self {
        let registry = SubscriptionRegistry::new();
        for (_, document) in operations.iter(Category::Subscription) {
            registry.ensure_bucket(document.canonical());
        }
        Self {
            operations,
            provider: ClientProvider::new(factory),
            registry,
        }
    }

    /// Supplies the connection configuration, replacing any previous one.
    pub fn initialize(&self, config: ConnectionConfig) {
        self.provider.configure(config);
    }

    /// Returns `true` once [`initialize`](Self::initialize) has been called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.provider.is_configured()
    }

    /// Queries whose callables return the data alone.
    #[must_use]
    pub const fn queries(&self) -> Operations<'_> {
        Operations::new(Category::Query, &self.operations, &self.provider)
    }

    /// Queries whose callables return the full result.
    #[must_use]
    pub const fn raw_queries(&self) -> RawOperations<'_> {
        RawOperations::new(Category::RawQuery, &self.operations, &self.provider)
    }

    /// Mutations whose callables return the data alone.
    #[must_use]
    pub const fn mutations(&self) -> Operations<'_> {
        Operations::new(Category::Mutation, &self.operations, &self.provider)
    }

    /// Mutations whose callables return the full result.
    #[must_use]
    pub const fn raw_mutations(&self) -> RawOperations<'_> {
        RawOperations::new(Category::RawMutation, &self.operations, &self.provider)
    }

    /// Subscriptions.
    #[must_use]
    pub const fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions::new(&self.operations, &self.provider, &self.registry)
    }

    /// Returns the registered operations.
    #[must_use]
    pub const fn operations(&self) -> &OperationSet {
        &self.operations
    }

    /// Returns the client provider.
    #[must_use]
    pub const fn provider(&self) -> &ClientProvider {
        &self.provider
    }

    /// Returns the subscription registry.
    #[must_use]
    pub const fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }
}

impl fmt::Debug for Graphql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graphql")
            .field("operations", &self.operations.len())
            .field("provider", &self.provider)
            .field("registry", &self.registry)
            .finish()
    }
}
