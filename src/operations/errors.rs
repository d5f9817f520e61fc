//! Dispatch error types.
//!
//! This module contains [`DispatchError`], the error every named operation
//! callable can return.
//!
//! # Error Handling
//!
//! Only unwrapped callables report upstream failures as errors. Raw
//! callables hand back the full [`OperationResult`](crate::OperationResult)
//! and leave the `error` field for the caller to inspect.
//!
//! - [`DispatchError::ClientNotConfigured`]: `initialize` was never called
//! - [`DispatchError::Upstream`]: The client reported an error (unwrapped only)
//! - [`DispatchError::EmptyResult`]: Neither data nor error (unwrapped only)
//! - [`DispatchError::UnknownOperation`]: No operation by that name
//! - [`DispatchError::InvalidVariables`]: Variables are not a JSON object
//! - [`DispatchError::Decode`]: Data does not match the requested type
//!
//! # Example
//!
//! ```rust,ignore
//! use graphql_dispatch::DispatchError;
//!
//! match graphql.queries().get("me")?.call::<_, Me>(&(), None).await {
//!     Ok(me) => println!("Hello, {}", me.name),
//!     Err(DispatchError::Upstream(error)) => {
//!         for entry in &error.graphql_errors {
//!             println!("GraphQL error: {}", entry.message);
//!         }
//!     }
//!     Err(e) => println!("Dispatch failed: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::OperationError;
use crate::document::OperationKind;

/// Error type for operation dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No client is available because no configuration was supplied.
    #[error("You are running a {kind}, though there is no GraphQL client configured. Call `initialize` first.")]
    ClientNotConfigured {
        /// The category of the operation that was attempted.
        kind: OperationKind,
    },

    /// The client returned neither data nor an error.
    #[error("The {kind} returned no data and no error.")]
    EmptyResult {
        /// The category of the operation that was attempted.
        kind: OperationKind,
    },

    /// The client reported an error; the original value is preserved.
    #[error(transparent)]
    Upstream(#[from] OperationError),

    /// No operation is registered under the requested name.
    #[error("No {kind} named '{name}' is registered.")]
    UnknownOperation {
        /// The namespace that was searched.
        kind: OperationKind,
        /// The requested name.
        name: String,
    },

    /// The variables did not serialize to a JSON object.
    #[error("Invalid operation variables: {reason}")]
    InvalidVariables {
        /// What the variables serialized to, or why serialization failed.
        reason: String,
    },

    /// The data did not match the requested type.
    #[error("Failed to decode operation data: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DispatchError {
    /// Returns the upstream error, if this is [`DispatchError::Upstream`].
    #[must_use]
    pub const fn upstream(&self) -> Option<&OperationError> {
        match self {
            Self::Upstream(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_not_configured_names_each_kind() {
        for kind in [
            OperationKind::Query,
            OperationKind::Mutation,
            OperationKind::Subscription,
        ] {
            let message = DispatchError::ClientNotConfigured { kind }.to_string();
            assert!(message.starts_with(&format!("You are running a {kind},")));
            assert!(message.contains("initialize"));
        }
    }

    #[test]
    fn test_upstream_is_transparent() {
        let error = OperationError::graphql(["Forbidden"]);
        let dispatch: DispatchError = error.clone().into();
        assert_eq!(dispatch.to_string(), error.to_string());
        assert_eq!(dispatch.upstream(), Some(&error));
    }

    #[test]
    fn test_unknown_operation_message() {
        let error = DispatchError::UnknownOperation {
            kind: OperationKind::Mutation,
            name: "likePost".to_string(),
        };
        assert_eq!(error.to_string(), "No mutation named 'likePost' is registered.");
        assert!(error.upstream().is_none());
    }

    #[test]
    fn test_decode_wraps_serde_error() {
        let serde_error = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let error: DispatchError = serde_error.into();
        assert!(matches!(error, DispatchError::Decode(_)));
        assert!(error.to_string().starts_with("Failed to decode operation data"));
    }
}
