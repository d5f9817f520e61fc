//! Setup-time error types.
//!
//! This module contains the errors that can occur while building the pieces
//! of the dispatch layer: connection configuration and operation documents.
//! Both are raised before any operation is executed.
//!
//! # Error Handling
//!
//! All constructors return `Result<T, E>` to enable fail-fast validation.
//! Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use graphql_dispatch::{ConfigError, Endpoint};
//!
//! let result = Endpoint::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
//! ```

use thiserror::Error;

use crate::document::OperationKind;

/// Errors that can occur while building a [`ConnectionConfig`](crate::ConnectionConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Endpoint URL is invalid.
    #[error("Invalid endpoint '{url}'. Please provide a URL with an http, https, ws or wss scheme (e.g., 'https://api.example.com/graphql').")]
    InvalidEndpoint {
        /// The invalid URL that was provided.
        url: String,
    },

    /// Request policy name is not recognized.
    #[error("Invalid request policy '{policy}'. Expected one of: cache-first, cache-only, network-only, cache-and-network.")]
    InvalidRequestPolicy {
        /// The unrecognized policy name.
        policy: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}

/// Errors that can occur while parsing or registering an operation document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document contains no definitions.
    #[error("Operation document is empty. Please provide a query, mutation or subscription.")]
    Empty,

    /// The document has definitions, but none of them is an operation.
    #[error("Operation document contains no query, mutation or subscription definition.")]
    NoOperation,

    /// The document is not a valid executable GraphQL document.
    #[error("Invalid operation document: {reason}")]
    Syntax {
        /// The parser's description of the problem, including its position.
        reason: String,
    },

    /// The document was registered under the wrong category.
    #[error("Operation '{name}' is registered as a {expected}, but its document defines a {found}.")]
    KindMismatch {
        /// The operation name it was registered under.
        name: String,
        /// The category it was registered in.
        expected: OperationKind,
        /// The kind found in the document.
        found: OperationKind,
    },

    /// The same name was registered twice in one category.
    #[error("Duplicate {kind} name '{name}'. Operation names must be unique within their category.")]
    DuplicateName {
        /// The category.
        kind: OperationKind,
        /// The duplicated name.
        name: String,
    },
}
