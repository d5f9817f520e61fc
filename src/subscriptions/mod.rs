//! Subscription lifecycle management.
//!
//! This module tracks every subscription started through a
//! [`Graphql`](crate::Graphql) facade so it can later be disposed, either
//! wholesale or selectively by the variables it was started with.
//!
//! # Overview
//!
//! - [`SubscriptionRegistry`]: Per-operation buckets of live handles
//! - [`SubscriptionHandle`] / [`SubscriptionId`]: One live subscription
//! - [`Subscriptions`]: The name-keyed namespace handed out by the facade
//! - [`SubscriptionFn`]: Starts and disposes one named subscription
//! - [`PendingSubscription`]: A prepared subscription awaiting its callback
//!
//! # Buckets
//!
//! Buckets are keyed by the canonical form of the operation document, not
//! by the name it was registered under. Two names whose documents differ
//! only in formatting share a bucket, and disposing through either name
//! reaches subscriptions started through both.
//!
//! # Example
//!
//! ```rust
//! use graphql_dispatch::clients::{
//!     BoxFuture, GraphqlClient, ResultCallback, SubscriptionCancel,
//! };
//! use graphql_dispatch::operations::OperationSet;
//! use graphql_dispatch::{
//!     ConnectionConfig, Endpoint, Graphql, OperationError, OperationRequest, OperationResult,
//! };
//! use serde_json::{json, Value};
//!
//! struct Silent;
//!
//! impl GraphqlClient for Silent {
//!     fn execute_query(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
//!         Box::pin(async { OperationResult::empty() })
//!     }
//!
//!     fn execute_mutation(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
//!         Box::pin(async { OperationResult::empty() })
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
//! let operations = OperationSet::builder()
//!     .subscription("onMessage", "subscription OnMessage($room: ID!) { message(room: $room) { id } }")
//!     .subscription("onMessageAgain", "subscription OnMessage($room:ID!){message(room:$room){id}}")
//!     .build()
//!     .unwrap();
//!
//! let graphql = Graphql::new(operations, |_config: &ConnectionConfig| Silent);
//! graphql.initialize(ConnectionConfig::new(Endpoint::new("wss://api.example.com/graphql").unwrap()));
//!
//! let on_message = graphql.subscriptions().get("onMessage").unwrap();
//! let again = graphql.subscriptions().get("onMessageAgain").unwrap();
//!
//! for room in ["a", "b"] {
//!     on_message
//!         .call(&json!({ "room": room }), None)
//!         .unwrap()
//!         .subscribe(|_: Value| {})
//!         .unwrap();
//! }
//!
//! assert_eq!(again.active_count(), 2);
//! assert_eq!(again.dispose_where(|variables| variables["room"] == "a"), 1);
//! assert_eq!(on_message.dispose(), 1);
//! ```

mod registry;
mod subscription;

pub use registry::{SubscriptionHandle, SubscriptionId, SubscriptionRegistry};
pub use subscription::{PendingSubscription, SubscriptionFn, Subscriptions};
