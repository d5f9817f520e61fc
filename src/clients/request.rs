//! Operation request types.
//!
//! This module provides the [`OperationRequest`] handed to a
//! [`GraphqlClient`](crate::clients::GraphqlClient) and the per-call
//! [`ExecutionOptions`] that travel with it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::RequestPolicy;
use crate::document::{OperationDocument, OperationKind};

/// Variables an operation is executed with: always a JSON object.
pub type Variables = serde_json::Map<String, Value>;

/// Per-call context passed through to the client.
///
/// Every field is optional; an empty `ExecutionOptions` means "use the
/// connection defaults". The dispatch layer never inspects these values.
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::{ExecutionOptions, RequestPolicy};
/// use serde_json::json;
///
/// let options = ExecutionOptions::new()
///     .request_policy(RequestPolicy::NetworkOnly)
///     .header("X-Request-Id", "abc-123")
///     .meta(json!({ "source": "refresh-button" }));
///
/// assert_eq!(options.request_policy, Some(RequestPolicy::NetworkOnly));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionOptions {
    /// Overrides the connection's default request policy.
    pub request_policy: Option<RequestPolicy>,
    /// Extra headers merged over the connection's default headers.
    pub headers: BTreeMap<String, String>,
    /// Free-form metadata for the client.
    pub meta: Option<Value>,
}

impl ExecutionOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request policy override.
    #[must_use]
    pub const fn request_policy(mut self, policy: RequestPolicy) -> Self {
        self.request_policy = Some(policy);
        self
    }

    /// Adds an extra header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches metadata.
    #[must_use]
    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Returns the policy to use given the connection default.
    #[must_use]
    pub fn effective_policy(&self, default: RequestPolicy) -> RequestPolicy {
        self.request_policy.unwrap_or(default)
    }
}

/// A single operation execution request.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use graphql_dispatch::{ExecutionOptions, OperationRequest, Variables};
/// use graphql_dispatch::document::OperationDocument;
///
/// let document = Arc::new(OperationDocument::parse("query Me { me { id } }").unwrap());
/// let request = OperationRequest::new(document, Variables::new(), ExecutionOptions::new());
///
/// assert_eq!(request.body()["operationName"], "Me");
/// ```
#[derive(Clone, Debug)]
pub struct OperationRequest {
    /// The document to execute.
    pub document: Arc<OperationDocument>,
    /// The variables to execute it with.
    pub variables: Variables,
    /// Per-call options.
    pub options: ExecutionOptions,
}

impl OperationRequest {
    /// Creates a new request.
    #[must_use]
    pub const fn new(
        document: Arc<OperationDocument>,
        variables: Variables,
        options: ExecutionOptions,
    ) -> Self {
        Self {
            document,
            variables,
            options,
        }
    }

    /// Returns the kind of the document's operation.
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.document.kind()
    }

    /// Returns the standard GraphQL-over-HTTP request body for this request.
    #[must_use]
    pub fn body(&self) -> Value {
        serde_json::json!({
            "query": self.document.source(),
            "variables": self.variables,
            "operationName": self.document.operation_name(),
        })
    }
}
