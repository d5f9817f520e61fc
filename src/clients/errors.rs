//! Client-boundary error types.
//!
//! [`CancelError`] is what a
//! [`SubscriptionCancel`](crate::clients::SubscriptionCancel) capability
//! reports when tearing a subscription down fails. The
//! [`SubscriptionRegistry`](crate::subscriptions::SubscriptionRegistry)
//! absorbs every `CancelError`; none ever reaches the caller of `dispose`.

use thiserror::Error;

/// Failure reported by a subscription's cancel capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CancelError {
    /// The subscription had already ended.
    #[error("Subscription was not active")]
    NotActive,

    /// The client could not tear the subscription down.
    #[error("Failed to cancel subscription: {reason}")]
    Failed {
        /// Client-provided reason.
        reason: String,
    },

    /// The cancel capability panicked.
    #[error("Subscription cancel capability panicked: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}
