//! Per-operation callables for queries and mutations.
//!
//! Each callable resolves the client from the
//! [`ClientProvider`](crate::clients::ClientProvider) at call time, so a
//! callable obtained before [`Graphql::initialize`](crate::Graphql::initialize)
//! works once a configuration has been supplied.
//!
//! # Unwrapping
//!
//! [`OperationFn`] unwraps the client's [`OperationResult`]:
//!
//! 1. An error, if present, is returned as [`DispatchError::Upstream`]
//! 2. Missing or `null` data is [`DispatchError::EmptyResult`]
//! 3. Otherwise the data is decoded into the caller's type
//!
//! [`RawOperationFn`] returns the whole result with only its data decoded.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::clients::{
    BoxFuture, ClientProvider, ExecutionOptions, GraphqlClient, OperationRequest, OperationResult,
};
use crate::document::{OperationDocument, OperationKind};
use crate::operations::errors::DispatchError;
use crate::operations::to_variables;

type Execute = for<'c> fn(&'c dyn GraphqlClient, OperationRequest) -> BoxFuture<'c, OperationResult>;

fn run_query(client: &dyn GraphqlClient, request: OperationRequest) -> BoxFuture<'_, OperationResult> {
    client.execute_query(request)
}

fn run_mutation(
    client: &dyn GraphqlClient,
    request: OperationRequest,
) -> BoxFuture<'_, OperationResult> {
    client.execute_mutation(request)
}

/// What a callable targets: one document, executed one way.
#[derive(Clone, Copy)]
struct Target<'a> {
    kind: OperationKind,
    name: &'a str,
    document: &'a Arc<OperationDocument>,
    provider: &'a ClientProvider,
    execute: Execute,
}

impl<'a> Target<'a> {
    fn query(
        name: &'a str,
        document: &'a Arc<OperationDocument>,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            kind: OperationKind::Query,
            name,
            document,
            provider,
            execute: run_query,
        }
    }

    fn mutation(
        name: &'a str,
        document: &'a Arc<OperationDocument>,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            kind: OperationKind::Mutation,
            name,
            document,
            provider,
            execute: run_mutation,
        }
    }

    async fn dispatch<V>(
        self,
        variables: &V,
        options: Option<ExecutionOptions>,
    ) -> Result<OperationResult, DispatchError>
    where
        V: Serialize + ?Sized,
    {
        let client = self
            .provider
            .get_client()
            .ok_or(DispatchError::ClientNotConfigured { kind: self.kind })?;
        let variables = to_variables(variables)?;

        tracing::debug!("Dispatching GraphQL {} '{}'", self.kind, self.name);

        let request =
            OperationRequest::new(Arc::clone(self.document), variables, options.unwrap_or_default());
        Ok((self.execute)(client.as_ref(), request).await)
    }
}

/// A query or mutation callable that returns the data alone.
///
/// Obtained from [`Graphql::queries`](crate::Graphql::queries) or
/// [`Graphql::mutations`](crate::Graphql::mutations).
///
/// # Example
///
/// ```rust,ignore
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Deserialize)]
/// struct Post {
///     post: PostData,
/// }
///
/// let post: Post = graphql
///     .queries()
///     .get("post")?
///     .call(&json!({ "id": 7 }), None)
///     .await?;
/// ```
pub struct OperationFn<'a> {
    target: Target<'a>,
}

/// Unwrapped query callable.
pub type QueryFn<'a> = OperationFn<'a>;
/// Unwrapped mutation callable.
pub type MutationFn<'a> = OperationFn<'a>;

impl<'a> OperationFn<'a> {
    pub(crate) fn query(
        name: &'a str,
        document: &'a Arc<OperationDocument>,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            target: Target::query(name, document, provider),
        }
    }

    pub(crate) fn mutation(
        name: &'a str,
        document: &'a Arc<OperationDocument>,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            target: Target::mutation(name, document, provider),
        }
    }

    /// Returns the name the operation is registered under.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.target.name
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.target.kind
    }

    /// Returns the operation document.
    #[must_use]
    pub fn document(&self) -> &OperationDocument {
        self.target.document
    }

    /// Executes the operation and returns its data.
    ///
    /// `variables` may be any value that serializes to a JSON object;
    /// `&()` means no variables.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ClientNotConfigured`] before `initialize`
    /// - [`DispatchError::InvalidVariables`] if `variables` is not an object
    /// - [`DispatchError::Upstream`] with the client's error, unchanged
    /// - [`DispatchError::EmptyResult`] if there is neither error nor data
    /// - [`DispatchError::Decode`] if the data does not match `D`
    pub async fn call<V, D>(
        &self,
        variables: &V,
        options: Option<ExecutionOptions>,
    ) -> Result<D, DispatchError>
    where
        V: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        let result = self.target.dispatch(variables, options).await?;
        unwrap_result(self.target.kind, result)
    }
}

/// A query or mutation callable that returns the full result.
///
/// Obtained from [`Graphql::raw_queries`](crate::Graphql::raw_queries) or
/// [`Graphql::raw_mutations`](crate::Graphql::raw_mutations). Upstream
/// errors are left in [`OperationResult::error`] for the caller.
///
/// # Example
///
/// ```rust,ignore
/// let result = graphql
///     .raw_mutations()
///     .get("like")?
///     .call::<_, serde_json::Value>(&json!({ "id": 7 }), None)
///     .await?;
///
/// if let Some(error) = &result.error {
///     println!("like failed: {error}");
/// }
/// ```
pub struct RawOperationFn<'a> {
    target: Target<'a>,
}

/// Raw query callable.
pub type RawQueryFn<'a> = RawOperationFn<'a>;
/// Raw mutation callable.
pub type RawMutationFn<'a> = RawOperationFn<'a>;

impl<'a> RawOperationFn<'a> {
    pub(crate) fn query(
        name: &'a str,
        document: &'a Arc<OperationDocument>,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            target: Target::query(name, document, provider),
        }
    }

    pub(crate) fn mutation(
        name: &'a str,
        document: &'a Arc<OperationDocument>,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            target: Target::mutation(name, document, provider),
        }
    }

    /// Returns the name the operation is registered under.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.target.name
    }

    /// Returns the operation kind.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.target.kind
    }

    /// Returns the operation document.
    #[must_use]
    pub fn document(&self) -> &OperationDocument {
        self.target.document
    }

    /// Executes the operation and returns the full result.
    ///
    /// When the result carries an error, data that does not match `D` is
    /// dropped so the error is still returned.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::ClientNotConfigured`] before `initialize`
    /// - [`DispatchError::InvalidVariables`] if `variables` is not an object
    /// - [`DispatchError::Decode`] if the result has no error and its data
    ///   does not match `D`
    pub async fn call<V, D>(
        &self,
        variables: &V,
        options: Option<ExecutionOptions>,
    ) -> Result<OperationResult<D>, DispatchError>
    where
        V: Serialize + ?Sized,
        D: DeserializeOwned,
    {
        let result = self.target.dispatch(variables, options).await?;
        Ok(result.decode_keeping_error()?)
    }
}

fn unwrap_result<D: DeserializeOwned>(
    kind: OperationKind,
    result: OperationResult,
) -> Result<D, DispatchError> {
    if let Some(error) = result.error {
        return Err(DispatchError::Upstream(error));
    }
    match result.data {
        None | Some(Value::Null) => Err(DispatchError::EmptyResult { kind }),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}
