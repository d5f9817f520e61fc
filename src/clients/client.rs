//! The GraphQL client boundary.
//!
//! This module defines the [`GraphqlClient`] trait the dispatch layer
//! drives, and the [`SubscriptionCancel`] capability a client hands back
//! when it starts a subscription. Transport, execution and result caching
//! all live behind this trait.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::clients::errors::CancelError;
use crate::clients::request::OperationRequest;
use crate::clients::result::{OperationError, OperationResult};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Callback a client invokes with every event of a subscription.
pub type ResultCallback = Box<dyn FnMut(OperationResult) + Send + 'static>;

/// Capabilities the dispatch layer needs from a GraphQL client.
///
/// Implementations own transport and caching. Queries and mutations resolve
/// to a single [`OperationResult`]; failures are reported inside the result,
/// never as a panic.
///
/// # Thread Safety
///
/// Clients are shared through `Arc` by every operation that targets the same
/// endpoint, so they must be `Send + Sync`.
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::clients::{BoxFuture, GraphqlClient, ResultCallback, SubscriptionCancel};
/// use graphql_dispatch::{OperationError, OperationRequest, OperationResult};
/// use serde_json::json;
///
/// struct Static;
///
/// impl GraphqlClient for Static {
///     fn execute_query(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
///         Box::pin(async { OperationResult::ok(json!({ "me": { "id": "1" } })) })
///     }
///
///     fn execute_mutation(&self, _request: OperationRequest) -> BoxFuture<'_, OperationResult> {
///         Box::pin(async { OperationResult::err(OperationError::network("read-only")) })
///     }
///
///     fn start_subscription(
///         &self,
///         _request: OperationRequest,
///         _on_result: ResultCallback,
///     ) -> Result<SubscriptionCancel, OperationError> {
///         Ok(SubscriptionCancel::noop())
///     }
/// }
/// ```
pub trait GraphqlClient: Send + Sync {
    /// Executes a query.
    fn execute_query(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult>;

    /// Executes a mutation.
    fn execute_mutation(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult>;

    /// Starts a subscription, delivering every event to `on_result` until cancelled.
    ///
    /// # Errors
    ///
    /// Returns an [`OperationError`] if the subscription cannot be started at
    /// all (for example, the client has no streaming transport).
    fn start_subscription(
        &self,
        request: OperationRequest,
        on_result: ResultCallback,
    ) -> Result<SubscriptionCancel, OperationError>;
}

impl<T: GraphqlClient + ?Sized> GraphqlClient for Arc<T> {
    fn execute_query(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult> {
        (**self).execute_query(request)
    }

    fn execute_mutation(&self, request: OperationRequest) -> BoxFuture<'_, OperationResult> {
        (**self).execute_mutation(request)
    }

    fn start_subscription(
        &self,
        request: OperationRequest,
        on_result: ResultCallback,
    ) -> Result<SubscriptionCancel, OperationError> {
        (**self).start_subscription(request, on_result)
    }
}

type CancelFn = Box<dyn FnOnce() -> Result<(), CancelError> + Send + 'static>;

/// The opaque capability that stops one live subscription.
///
/// A cancel runs at most once: [`cancel`](Self::cancel) consumes it.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use graphql_dispatch::clients::SubscriptionCancel;
///
/// let stopped = Arc::new(AtomicBool::new(false));
/// let flag = Arc::clone(&stopped);
/// let cancel = SubscriptionCancel::from_fn(move || flag.store(true, Ordering::SeqCst));
///
/// cancel.cancel().unwrap();
/// assert!(stopped.load(Ordering::SeqCst));
/// ```
pub struct SubscriptionCancel {
    inner: CancelFn,
}

impl SubscriptionCancel {
    /// Wraps a fallible cancel function.
    #[must_use]
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() -> Result<(), CancelError> + Send + 'static,
    {
        Self {
            inner: Box::new(cancel),
        }
    }

    /// Wraps an infallible cancel function.
    #[must_use]
    pub fn from_fn<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::new(move || {
            cancel();
            Ok(())
        })
    }

    /// Cancels by aborting a Tokio task.
    ///
    /// Reports [`CancelError::NotActive`] if the task had already finished.
    #[must_use]
    pub fn from_abort_handle(handle: tokio::task::AbortHandle) -> Self {
        Self::new(move || {
            if handle.is_finished() {
                return Err(CancelError::NotActive);
            }
            handle.abort();
            Ok(())
        })
    }

    /// A capability that does nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| Ok(()))
    }

    /// Runs the capability.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying capability reports.
    pub fn cancel(self) -> Result<(), CancelError> {
        (self.inner)()
    }
}

impl From<tokio::task::AbortHandle> for SubscriptionCancel {
    fn from(handle: tokio::task::AbortHandle) -> Self {
        Self::from_abort_handle(handle)
    }
}

impl fmt::Debug for SubscriptionCancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubscriptionCancel(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_cancel_runs_wrapped_function_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cancel = SubscriptionCancel::from_fn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(cancel.cancel().is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_propagates_failure() {
        let cancel = SubscriptionCancel::new(|| {
            Err(CancelError::Failed {
                reason: "gone".to_string(),
            })
        });
        assert!(matches!(cancel.cancel(), Err(CancelError::Failed { .. })));
    }

    #[test]
    fn test_noop_cancel_succeeds() {
        assert!(SubscriptionCancel::noop().cancel().is_ok());
    }

    #[tokio::test]
    async fn test_abort_handle_cancel_stops_task() {
        let task = tokio::spawn(std::future::pending::<()>());
        let cancel = SubscriptionCancel::from(task.abort_handle());

        assert!(cancel.cancel().is_ok());
        let joined = task.await;
        assert!(joined.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn test_abort_handle_cancel_reports_finished_task() {
        let task = tokio::spawn(async {});
        let handle = task.abort_handle();
        task.await.unwrap();

        let cancel = SubscriptionCancel::from_abort_handle(handle);
        assert_eq!(cancel.cancel(), Err(CancelError::NotActive));
    }

    #[test]
    fn test_debug_is_opaque() {
        assert_eq!(
            format!("{:?}", SubscriptionCancel::noop()),
            "SubscriptionCancel(..)"
        );
    }
}
