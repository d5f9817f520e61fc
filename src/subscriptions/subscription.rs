//! Subscription callables.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::{
    ClientProvider, ExecutionOptions, OperationRequest, OperationResult, ResultCallback, Variables,
};
use crate::document::{OperationDocument, OperationKind};
use crate::operations::{lookup, to_variables, Category, DispatchError, OperationSet};
use crate::subscriptions::registry::SubscriptionRegistry;

/// The subscriptions of a [`Graphql`](crate::Graphql) facade.
#[derive(Clone, Copy)]
pub struct Subscriptions<'a> {
    operations: &'a OperationSet,
    provider: &'a ClientProvider,
    registry: &'a SubscriptionRegistry,
}

impl<'a> Subscriptions<'a> {
    pub(crate) const fn new(
        operations: &'a OperationSet,
        provider: &'a ClientProvider,
        registry: &'a SubscriptionRegistry,
    ) -> Self {
        Self {
            operations,
            provider,
            registry,
        }
    }

    /// Returns the subscription registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownOperation`] if no subscription has that name.
    pub fn get(&self, name: &str) -> Result<SubscriptionFn<'a>, DispatchError> {
        let (name, document) = lookup(self.operations, Category::Subscription, name)?;
        Ok(SubscriptionFn {
            name,
            document,
            provider: self.provider,
            registry: self.registry,
        })
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.operations.names(Category::Subscription)
    }

    /// Returns `true` if a subscription is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.get(Category::Subscription, name).is_some()
    }

    /// Returns the number of registered subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.table(Category::Subscription).len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named subscription: starts new subscriptions and disposes live ones.
///
/// Disposal acts on the whole bucket for this operation's canonical
/// document, so subscriptions started through another name with an
/// equivalent document are disposed too.
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct OnMessage {
///     message: Message,
/// }
///
/// let on_message = graphql.subscriptions().get("onMessage")?;
///
/// on_message
///     .call(&json!({ "room": "general" }), None)?
///     .subscribe(|event: OnMessage| println!("{}", event.message.text))?;
///
/// // Stop only the subscriptions for one room.
/// on_message.dispose_where(|variables| variables["room"] == "general");
///
/// // Stop everything started for this operation.
/// on_message.dispose();
/// ```
#[derive(Clone, Copy)]
pub struct SubscriptionFn<'a> {
    name: &'a str,
    document: &'a Arc<OperationDocument>,
    provider: &'a ClientProvider,
    registry: &'a SubscriptionRegistry,
}

impl<'a> SubscriptionFn<'a> {
    /// Returns the name the subscription is registered under.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name
    }

    /// Returns the subscription document.
    #[must_use]
    pub fn document(&self) -> &OperationDocument {
        self.document
    }

    /// Returns the registry key: the document's canonical form.
    #[must_use]
    pub fn key(&self) -> &str {
        self.document.canonical()
    }

    /// Prepares a subscription with `variables` and `options`.
    ///
    /// Nothing is started until [`PendingSubscription::subscribe`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidVariables`] if `variables` is not a JSON object.
    pub fn call<V>(
        &self,
        variables: &V,
        options: Option<ExecutionOptions>,
    ) -> Result<PendingSubscription<'a>, DispatchError>
    where
        V: Serialize + ?Sized,
    {
        Ok(PendingSubscription {
            name: self.name,
            document: self.document,
            provider: self.provider,
            registry: self.registry,
            variables: to_variables(variables)?,
            options: options.unwrap_or_default(),
        })
    }

    /// Cancels every live subscription for this operation.
    ///
    /// Returns how many were disposed; `0` when none were active.
    pub fn dispose(&self) -> usize {
        let disposed = self.registry.dispose_all(self.key());
        tracing::debug!("Disposed {} subscription(s) for '{}'", disposed, self.name);
        disposed
    }

    /// Cancels the live subscriptions whose variables match `predicate`.
    ///
    /// The rest keep running. Returns how many were disposed.
    pub fn dispose_where<P>(&self, predicate: P) -> usize
    where
        P: FnMut(&Variables) -> bool,
    {
        let disposed = self.registry.dispose_where(self.key(), predicate);
        tracing::debug!("Disposed {} subscription(s) for '{}'", disposed, self.name);
        disposed
    }

    /// Returns how many subscriptions are live for this operation.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.registry.active_count(self.key())
    }

    /// Returns the variables of every live subscription, in start order.
    #[must_use]
    pub fn active_variables(&self) -> Vec<Variables> {
        self.registry.active_variables(self.key())
    }
}

/// A prepared subscription waiting for its data callback.
#[must_use = "a subscription does not start until `subscribe` is called"]
pub struct PendingSubscription<'a> {
    name: &'a str,
    document: &'a Arc<OperationDocument>,
    provider: &'a ClientProvider,
    registry: &'a SubscriptionRegistry,
    variables: Variables,
    options: ExecutionOptions,
}

impl PendingSubscription<'_> {
    /// Returns the variables the subscription will start with.
    #[must_use]
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Starts the subscription and records it in the registry.
    ///
    /// `on_data` receives the decoded data of every event that carries
    /// data. Events with an error are logged at `warn`; their data, if any,
    /// is still delivered. Events whose data does not decode into `D` are
    /// logged at `warn` and dropped.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ClientNotConfigured`] before `initialize`
    /// - [`DispatchError::Upstream`] if the client refuses to start the
    ///   subscription; nothing is recorded in that case
    pub fn subscribe<D, F>(self, mut on_data: F) -> Result<(), DispatchError>
    where
        D: DeserializeOwned + 'static,
        F: FnMut(D) + Send + 'static,
    {
        let client = self
            .provider
            .get_client()
            .ok_or(DispatchError::ClientNotConfigured {
                kind: OperationKind::Subscription,
            })?;

        tracing::debug!("Starting GraphQL subscription '{}'", self.name);

        let name = self.name.to_string();
        let on_result: ResultCallback = Box::new(move |result: OperationResult| {
            if let Some(error) = &result.error {
                tracing::warn!("Subscription '{}' received an error: {}", name, error);
            }
            match result.decode::<D>() {
                Ok(OperationResult {
                    data: Some(data), ..
                }) => on_data(data),
                Ok(_) => {}
                Err(error) => tracing::warn!(
                    "Dropping subscription '{}' event whose data failed to decode: {}",
                    name,
                    error
                ),
            }
        });

        let request = OperationRequest::new(
            Arc::clone(self.document),
            self.variables.clone(),
            self.options,
        );
        let cancel = client.start_subscription(request, on_result)?;
        let id = self
            .registry
            .insert(self.document.canonical(), self.variables, cancel);

        tracing::debug!("Subscription '{}' is live as {}", self.name, id);
        Ok(())
    }
}
