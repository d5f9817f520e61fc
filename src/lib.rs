//! # graphql-dispatch
//!
//! A typed dispatch layer that maps a static table of named GraphQL
//! operations onto a lazily constructed GraphQL client, exposing each
//! operation as a callable looked up by name.
//!
//! ## Overview
//!
//! This crate provides:
//! - A validated table of named queries, mutations and subscriptions via
//!   [`operations::OperationSet`]
//! - Type-safe connection configuration via [`ConnectionConfig`] and
//!   [`ConnectionConfigBuilder`]
//! - Lazy client construction, cached per endpoint, via
//!   [`clients::ClientProvider`]
//! - Unwrapped and raw callables for queries and mutations
//! - A subscription registry with bulk and variable-based disposal via
//!   [`subscriptions::SubscriptionRegistry`]
//!
//! Transport, execution and result caching are left to the client: anything
//! implementing [`clients::GraphqlClient`] can be plugged in.
//!
//! ## Quick Start
//!
//! ```rust
//! use graphql_dispatch::clients::{BoxFuture, GraphqlClient, ResultCallback, SubscriptionCancel};
//! use graphql_dispatch::operations::OperationSet;
//! use graphql_dispatch::{
//!     ConnectionConfig, DispatchError, Endpoint, Graphql, OperationError, OperationRequest,
//!     OperationResult,
//! };
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! struct Echo;
//!
//! impl GraphqlClient for Echo {
//!     fn execute_query(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult> {
//!         Box::pin(async move { OperationResult::ok(json!({ "echo": request.variables })) })
//!     }
//!
//!     fn execute_mutation(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
//!         Box::pin(async { OperationResult::err(OperationError::graphql(["read-only"])) })
//!     }
//!
//!     fn start_subscription(
//!         &self,
//!         _request: OperationRequest,
//!         _on_result: ResultCallback,
//!     ) -> Result<SubscriptionCancel, OperationError> {
//!         Ok(SubscriptionCancel::noop())
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct Echoed {
//!     echo: serde_json::Value,
//! }
//!
//! # tokio_test::block_on(async {
//! let operations = OperationSet::builder()
//!     .query("echo", "query Echo($text: String!) { echo(text: $text) }")
//!     .mutation("write", "mutation Write { write }")
//!     .build()
//!     .unwrap();
//!
//! let graphql = Graphql::new(operations, |_config: &ConnectionConfig| Echo);
//!
//! // Nothing is configured yet.
//! let echo = graphql.queries().get("echo").unwrap();
//! let early = echo.call::<_, Echoed>(&json!({ "text": "hi" }), None).await;
//! assert!(matches!(early, Err(DispatchError::ClientNotConfigured { .. })));
//!
//! graphql.initialize(ConnectionConfig::new(Endpoint::new("https://api.example.com/graphql").unwrap()));
//!
//! let echoed: Echoed = echo.call(&json!({ "text": "hi" }), None).await.unwrap();
//! assert_eq!(echoed.echo["text"], "hi");
//!
//! let write = graphql.mutations().get("write").unwrap();
//! let error = write.call::<_, serde_json::Value>(&(), None).await.unwrap_err();
//! assert_eq!(error.to_string(), "[GraphQL] read-only");
//! # });
//! ```
//!
//! ## Raw Callables
//!
//! Raw queries and mutations return the whole [`OperationResult`], including
//! `error`, `extensions` and `stale`, so the caller decides what an error
//! means:
//!
//! ```rust,ignore
//! let result = graphql
//!     .raw_queries()
//!     .get("feed")?
//!     .call::<_, Feed>(&json!({ "first": 10 }), None)
//!     .await?;
//!
//! if result.stale {
//!     println!("showing cached feed while a refresh is in flight");
//! }
//! ```
//!
//! ## Subscriptions
//!
//! ```rust,ignore
//! let on_message = graphql.subscriptions().get("onMessage")?;
//!
//! on_message
//!     .call(&json!({ "room": "general" }), None)?
//!     .subscribe(|event: OnMessage| println!("{}", event.message.text))?;
//!
//! on_message.dispose_where(|variables| variables["room"] == "general");
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: The subscription registry and client cache belong
//!   to a [`Graphql`] instance
//! - **Fail-fast validation**: Documents, endpoints and names are checked
//!   when the operation table and configuration are built
//! - **Thread-safe**: All shared types are `Send + Sync`
//! - **Async-first**: Query and mutation callables are futures; subscription
//!   cancel capabilities can wrap Tokio tasks

pub mod clients;
pub mod config;
pub mod document;
pub mod error;
mod graphql;
pub mod operations;
pub mod subscriptions;

// Re-export public types at crate root for convenience
pub use config::{ConnectionConfig, ConnectionConfigBuilder, Endpoint, RequestPolicy};
pub use error::{ConfigError, DocumentError};
pub use graphql::Graphql;

// Re-export client boundary types
pub use clients::{
    ExecutionOptions, GraphqlErrorEntry, OperationError, OperationRequest, OperationResult,
    Variables,
};

// Re-export dispatch types
pub use document::{canonicalize, OperationDocument, OperationKind};
pub use operations::{DispatchError, OperationSet, OperationSetBuilder};
pub use subscriptions::{SubscriptionId, SubscriptionRegistry};
