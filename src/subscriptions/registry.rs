//! Bookkeeping for live subscriptions.
//!
//! This module provides the [`SubscriptionRegistry`], which tracks every
//! started subscription in a bucket keyed by the canonical form of its
//! operation document.
//!
//! # Example
//!
//! ```rust
//! use graphql_dispatch::clients::SubscriptionCancel;
//! use graphql_dispatch::subscriptions::SubscriptionRegistry;
//! use graphql_dispatch::Variables;
//! use serde_json::json;
//!
//! let registry = SubscriptionRegistry::new();
//! let key = "subscription{tick}";
//!
//! for room in ["a", "b", "a"] {
//!     let mut variables = Variables::new();
//!     variables.insert("room".to_string(), json!(room));
//!     registry.insert(key, variables, SubscriptionCancel::noop());
//! }
//!
//! let disposed = registry.dispose_where(key, |variables| variables["room"] == "a");
//! assert_eq!(disposed, 2);
//! assert_eq!(registry.active_count(key), 1);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::clients::{CancelError, SubscriptionCancel, Variables};

/// Identifies one started subscription within a registry.
///
/// Ids increase monotonically in start order and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The live record of one started subscription.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    variables: Variables,
    cancel: SubscriptionCancel,
}

impl SubscriptionHandle {
    /// Returns the handle's id.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns the variables the subscription was started with.
    #[must_use]
    pub const fn variables(&self) -> &Variables {
        &self.variables
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

/// Active subscription handles, grouped per canonical operation.
///
/// # Buckets
///
/// Each bucket is an insertion-ordered list of handles. A bucket is either
/// idle (empty) or active; there is no terminal state, and buckets are never
/// removed once created.
///
/// # Disposal
///
/// [`dispose_all`](Self::dispose_all) and [`dispose_where`](Self::dispose_where)
/// remove handles from the bucket first and then run their cancel
/// capabilities with the lock released, so a capability may call back into
/// the registry. A capability that returns an error or panics is logged at
/// `debug` and otherwise ignored; the remaining capabilities still run.
///
/// # Thread Safety
///
/// `SubscriptionRegistry` is `Send + Sync`.
#[derive(Default)]
pub struct SubscriptionRegistry {
    buckets: Mutex<HashMap<String, Vec<SubscriptionHandle>>>,
    next_id: AtomicU64,
}

// Verify SubscriptionRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SubscriptionRegistry>();
};

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an idle bucket for `key` if there is none yet.
    pub fn ensure_bucket(&self, key: &str) {
        let mut buckets = self.lock();
        if !buckets.contains_key(key) {
            buckets.insert(key.to_string(), Vec::new());
        }
    }

    /// Records a started subscription at the end of `key`'s bucket.
    pub fn insert(
        &self,
        key: &str,
        variables: Variables,
        cancel: SubscriptionCancel,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = SubscriptionHandle {
            id,
            variables,
            cancel,
        };
        self.lock().entry(key.to_string()).or_default().push(handle);
        id
    }

    /// Cancels and removes every handle in `key`'s bucket.
    ///
    /// Returns the number of handles removed. An idle or unknown bucket is a
    /// no-op returning `0`.
    pub fn dispose_all(&self, key: &str) -> usize {
        let handles = self
            .lock()
            .get_mut(key)
            .map(std::mem::take)
            .unwrap_or_default();
        cancel_each(key, handles)
    }

    /// Cancels and removes the handles whose variables match `predicate`.
    ///
    /// Handles that do not match stay in the bucket in their original
    /// relative order. Returns the number of handles removed.
    ///
    /// The predicate runs without the registry lock held. If it panics, every
    /// handle goes back into the bucket uncancelled before the panic resumes.
    pub fn dispose_where<P>(&self, key: &str, mut predicate: P) -> usize
    where
        P: FnMut(&Variables) -> bool,
    {
        let handles = match self.lock().get_mut(key) {
            Some(bucket) if !bucket.is_empty() => std::mem::take(bucket),
            _ => return 0,
        };

        let matches = panic::catch_unwind(AssertUnwindSafe(|| {
            handles
                .iter()
                .map(|handle| predicate(handle.variables()))
                .collect::<Vec<_>>()
        }));
        let matches = match matches {
            Ok(matches) => matches,
            Err(payload) => {
                self.restore(key, handles);
                panic::resume_unwind(payload);
            }
        };

        let (removed, retained): (Vec<_>, Vec<_>) = handles
            .into_iter()
            .zip(matches)
            .partition(|(_, matched)| *matched);

        self.restore(key, retained.into_iter().map(|(handle, _)| handle).collect());
        cancel_each(key, removed.into_iter().map(|(handle, _)| handle).collect())
    }

    /// Puts handles taken out of `key`'s bucket back in front of any inserted meanwhile.
    fn restore(&self, key: &str, handles: Vec<SubscriptionHandle>) {
        if handles.is_empty() {
            return;
        }
        let mut buckets = self.lock();
        let bucket = buckets.entry(key.to_string()).or_default();
        let inserted = std::mem::replace(bucket, handles);
        bucket.extend(inserted);
    }

    /// Returns the number of active handles in `key`'s bucket.
    #[must_use]
    pub fn active_count(&self, key: &str) -> usize {
        self.lock().get(key).map_or(0, Vec::len)
    }

    /// Returns the variables of every active handle in `key`'s bucket, in start order.
    #[must_use]
    pub fn active_variables(&self, key: &str) -> Vec<Variables> {
        self.lock().get(key).map_or_else(Vec::new, |bucket| {
            bucket.iter().map(|h| h.variables().clone()).collect()
        })
    }

    /// Returns the ids of every active handle in `key`'s bucket, in start order.
    #[must_use]
    pub fn active_ids(&self, key: &str) -> Vec<SubscriptionId> {
        self.lock()
            .get(key)
            .map_or_else(Vec::new, |bucket| bucket.iter().map(SubscriptionHandle::id).collect())
    }

    /// Returns `true` if a bucket exists for `key`, idle or not.
    #[must_use]
    pub fn has_bucket(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Returns every bucket key, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Returns the number of active handles across all buckets.
    #[must_use]
    pub fn total_active(&self) -> usize {
        self.lock().values().map(Vec::len).sum()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<SubscriptionHandle>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buckets: Vec<(String, usize)> = {
            let guard = self.lock();
            let mut counts: Vec<_> = guard.iter().map(|(k, v)| (k.clone(), v.len())).collect();
            counts.sort();
            counts
        };
        f.debug_struct("SubscriptionRegistry")
            .field("buckets", &buckets)
            .finish_non_exhaustive()
    }
}

fn cancel_each(key: &str, handles: Vec<SubscriptionHandle>) -> usize {
    let count = handles.len();
    for handle in handles {
        let SubscriptionHandle { id, cancel, .. } = handle;
        match run_cancel(cancel) {
            Ok(()) => tracing::debug!("Cancelled subscription {} of {}", id, key),
            Err(error) => tracing::debug!(
                "Ignoring failed cancel of subscription {} of {}: {}",
                id,
                key,
                error
            ),
        }
    }
    count
}

fn run_cancel(cancel: SubscriptionCancel) -> Result<(), CancelError> {
    panic::catch_unwind(AssertUnwindSafe(|| cancel.cancel())).unwrap_or_else(|payload| {
        Err(CancelError::Panicked {
            message: panic_message(payload.as_ref()),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    const KEY: &str = "subscription{message{id}}";

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn vars(id: i64) -> Variables {
        let mut variables = Variables::new();
        variables.insert("id".to_string(), json!(id));
        variables
    }

    fn recording(log: &Log, label: &'static str) -> SubscriptionCancel {
        let log = Arc::clone(log);
        SubscriptionCancel::from_fn(move || log.lock().unwrap().push(label))
    }

    // ==================== insert ====================

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let registry = SubscriptionRegistry::new();
        let first = registry.insert(KEY, vars(1), SubscriptionCancel::noop());
        let second = registry.insert(KEY, vars(1), SubscriptionCancel::noop());

        assert!(first < second);
        assert_eq!(registry.active_ids(KEY), vec![first, second]);
        assert_eq!(registry.active_count(KEY), 2);
    }

    #[test]
    fn test_ensure_bucket_creates_idle_bucket_once() {
        let registry = SubscriptionRegistry::new();
        registry.ensure_bucket(KEY);
        registry.insert(KEY, vars(1), SubscriptionCancel::noop());
        registry.ensure_bucket(KEY);

        assert!(registry.has_bucket(KEY));
        assert_eq!(registry.active_count(KEY), 1);
        assert_eq!(registry.keys(), vec![KEY.to_string()]);
    }

    // ==================== dispose_all ====================

    #[test]
    fn test_dispose_all_cancels_every_handle_in_order() {
        let registry = SubscriptionRegistry::new();
        let log = Log::default();
        registry.insert(KEY, vars(1), recording(&log, "first"));
        registry.insert(KEY, vars(2), recording(&log, "second"));

        assert_eq!(registry.dispose_all(KEY), 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(registry.active_count(KEY), 0);
        assert!(registry.has_bucket(KEY));
    }

    #[test]
    fn test_dispose_all_on_idle_or_unknown_bucket_is_noop() {
        let registry = SubscriptionRegistry::new();
        registry.ensure_bucket(KEY);

        assert_eq!(registry.dispose_all(KEY), 0);
        assert_eq!(registry.dispose_all("subscription{other}"), 0);
        assert!(!registry.has_bucket("subscription{other}"));
    }

    #[test]
    fn test_dispose_all_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let log = Log::default();
        registry.insert(KEY, vars(1), recording(&log, "only"));

        assert_eq!(registry.dispose_all(KEY), 1);
        assert_eq!(registry.dispose_all(KEY), 0);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_failing_and_panicking_cancels_do_not_stop_others() {
        let registry = SubscriptionRegistry::new();
        let log = Log::default();
        registry.insert(
            KEY,
            vars(1),
            SubscriptionCancel::new(|| Err(CancelError::NotActive)),
        );
        registry.insert(
            KEY,
            vars(2),
            SubscriptionCancel::from_fn(|| panic!("already unsubscribed")),
        );
        registry.insert(KEY, vars(3), recording(&log, "third"));

        assert_eq!(registry.dispose_all(KEY), 3);
        assert_eq!(*log.lock().unwrap(), vec!["third"]);
        assert_eq!(registry.active_count(KEY), 0);
    }

    // ==================== dispose_where ====================

    #[test]
    fn test_dispose_where_removes_only_matches() {
        let registry = SubscriptionRegistry::new();
        let log = Log::default();
        registry.insert(KEY, vars(1), recording(&log, "first"));
        registry.insert(KEY, vars(2), recording(&log, "second"));
        registry.insert(KEY, vars(1), recording(&log, "third"));

        let disposed = registry.dispose_where(KEY, |v| v["id"] == 1);

        assert_eq!(disposed, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "third"]);
        assert_eq!(registry.active_variables(KEY), vec![vars(2)]);

        assert_eq!(registry.dispose_all(KEY), 1);
        assert_eq!(*log.lock().unwrap(), vec!["first", "third", "second"]);
    }

    #[test]
    fn test_dispose_where_preserves_retained_order() {
        let registry = SubscriptionRegistry::new();
        for id in 1..=6 {
            registry.insert(KEY, vars(id), SubscriptionCancel::noop());
        }

        registry.dispose_where(KEY, |v| v["id"].as_i64().unwrap() % 2 == 0);

        assert_eq!(
            registry.active_variables(KEY),
            vec![vars(1), vars(3), vars(5)]
        );
    }

    #[test]
    fn test_dispose_where_with_no_match_keeps_everything() {
        let registry = SubscriptionRegistry::new();
        let first = registry.insert(KEY, vars(1), SubscriptionCancel::noop());
        let second = registry.insert(KEY, vars(2), SubscriptionCancel::noop());

        assert_eq!(registry.dispose_where(KEY, |_| false), 0);
        assert_eq!(registry.active_ids(KEY), vec![first, second]);
    }

    #[test]
    fn test_dispose_where_swallows_cancel_failures() {
        let registry = SubscriptionRegistry::new();
        registry.insert(
            KEY,
            vars(1),
            SubscriptionCancel::new(|| {
                Err(CancelError::Failed {
                    reason: "closed".to_string(),
                })
            }),
        );
        registry.insert(KEY, vars(2), SubscriptionCancel::noop());

        assert_eq!(registry.dispose_where(KEY, |v| v["id"] == 1), 1);
        assert_eq!(registry.active_variables(KEY), vec![vars(2)]);
    }

    #[test]
    fn test_dispose_where_panicking_predicate_keeps_every_handle() {
        let registry = SubscriptionRegistry::new();
        let log = Log::default();
        let ids: Vec<_> = [(1, "first"), (2, "second"), (3, "third")]
            .into_iter()
            .map(|(id, label)| registry.insert(KEY, vars(id), recording(&log, label)))
            .collect();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            registry.dispose_where(KEY, |v| {
                assert_ne!(v["id"], 2, "predicate failed");
                true
            })
        }));

        assert!(outcome.is_err());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(registry.active_ids(KEY), ids);

        assert_eq!(registry.dispose_all(KEY), 3);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
    }

    // ==================== re-entrancy ====================

    #[test]
    fn test_cancel_may_reenter_registry() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let inner = Arc::clone(&registry);
        registry.insert(
            KEY,
            vars(1),
            SubscriptionCancel::from_fn(move || {
                inner.insert(KEY, vars(9), SubscriptionCancel::noop());
            }),
        );

        assert_eq!(registry.dispose_all(KEY), 1);
        assert_eq!(registry.active_variables(KEY), vec![vars(9)]);
    }

    #[test]
    fn test_reentrant_insert_during_dispose_where_lands_after_retained() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let inner = Arc::clone(&registry);
        registry.insert(KEY, vars(2), SubscriptionCancel::noop());
        registry.insert(
            KEY,
            vars(1),
            SubscriptionCancel::from_fn(move || {
                inner.insert(KEY, vars(3), SubscriptionCancel::noop());
            }),
        );

        registry.dispose_where(KEY, |v| v["id"] == 1);

        assert_eq!(registry.active_variables(KEY), vec![vars(2), vars(3)]);
    }

    // ==================== introspection ====================

    #[test]
    fn test_buckets_are_independent() {
        let registry = SubscriptionRegistry::new();
        registry.insert("a", vars(1), SubscriptionCancel::noop());
        registry.insert("b", vars(1), SubscriptionCancel::noop());
        registry.insert("b", vars(2), SubscriptionCancel::noop());

        registry.dispose_all("b");

        assert_eq!(registry.active_count("a"), 1);
        assert_eq!(registry.total_active(), 1);
        assert_eq!(registry.keys(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&7_u8), "non-string panic payload");
    }

    #[test]
    fn test_subscription_id_display() {
        assert_eq!(SubscriptionId(4).to_string(), "#4");
        assert_eq!(SubscriptionId(4).get(), 4);
    }
}
