//! The client boundary and its lazy provider.
//!
//! This module defines everything that sits between the dispatch layer and
//! an actual GraphQL client. Transport, execution and caching are the
//! client's business; this crate only decides *which* client to use and
//! what to do with the results.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`GraphqlClient`]: The trait a client implements
//! - [`ClientFactory`]: Builds a client from a [`ConnectionConfig`](crate::ConnectionConfig)
//! - [`ClientProvider`]: Lazily builds and caches one client per endpoint
//! - [`OperationRequest`]: A document, its variables and per-call options
//! - [`ExecutionOptions`]: Per-call policy, header and metadata overrides
//! - [`OperationResult`]: The `data`/`error`/`extensions`/`stale` envelope
//! - [`OperationError`]: Network and GraphQL errors combined
//! - [`SubscriptionCancel`]: The capability that stops a live subscription
//! - [`CancelError`]: Failure reported by a cancel capability
//!
//! # Example
//!
//! ```rust
//! use graphql_dispatch::clients::{
//!     BoxFuture, ClientProvider, GraphqlClient, ResultCallback, SubscriptionCancel,
//! };
//! use graphql_dispatch::{ConnectionConfig, Endpoint, OperationError, OperationRequest, OperationResult};
//!
//! struct Offline;
//!
//! impl GraphqlClient for Offline {
//!     fn execute_query(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
//!         Box::pin(async { OperationResult::err(OperationError::network("offline")) })
//!     }
//!
//!     fn execute_mutation(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
//!         Box::pin(async { OperationResult::err(OperationError::network("offline")) })
//!     }
//!
//!     fn start_subscription(
//!         &self,
//!         _request: OperationRequest,
//!         _on_result: ResultCallback,
//!     ) -> Result<SubscriptionCancel, OperationError> {
//!         Err(OperationError::network("offline"))
//!     }
//! }
//!
//! let provider = ClientProvider::new(|_config: &ConnectionConfig| Offline);
//! assert!(provider.get_client().is_none());
//!
//! provider.configure(ConnectionConfig::new(Endpoint::new("https://api.example.com/graphql").unwrap()));
//! assert!(provider.get_client().is_some());
//! ```

mod client;
mod errors;
mod provider;
mod request;
mod result;

pub use client::{BoxFuture, GraphqlClient, ResultCallback, SubscriptionCancel};
pub use errors::CancelError;
pub use provider::{ClientFactory, ClientProvider};
pub use request::{ExecutionOptions, OperationRequest, Variables};
pub use result::{GraphqlErrorEntry, OperationError, OperationResult};
