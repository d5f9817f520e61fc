//! Operation result types.
//!
//! This module provides the [`OperationResult`] envelope every client
//! returns, and the [`OperationError`] it may carry.
//!
//! # Response Structure
//!
//! An [`OperationResult`] mirrors a GraphQL response:
//!
//! - `data`: The operation data, absent on failure
//! - `error`: Network and GraphQL errors combined into one [`OperationError`]
//! - `extensions`: Server-provided extension data
//! - `stale`: Set by caching clients when a refresh is in flight

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a GraphQL response's `errors` array.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    /// Human-readable description.
    pub message: String,
    /// Path to the field that failed, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    /// Server-specific error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphqlErrorEntry {
    /// Creates an entry with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }
}

/// The error carried inside an [`OperationResult`].
///
/// Combines a transport-level failure with any GraphQL errors the server
/// returned. Unwrapped callables hand this value back unchanged inside
/// [`DispatchError::Upstream`](crate::DispatchError::Upstream).
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::OperationError;
///
/// let error = OperationError::graphql(["Not authorized"]);
/// assert_eq!(error.to_string(), "[GraphQL] Not authorized");
///
/// let error = OperationError::network("connection reset");
/// assert!(error.is_network());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    /// Transport failure message, if the request never produced a response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_error: Option<String>,
    /// Errors reported by the server.
    #[serde(default)]
    pub graphql_errors: Vec<GraphqlErrorEntry>,
}

impl OperationError {
    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            network_error: Some(message.into()),
            graphql_errors: Vec::new(),
        }
    }

    /// Creates an error from GraphQL error messages.
    #[must_use]
    pub fn graphql<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            network_error: None,
            graphql_errors: messages.into_iter().map(GraphqlErrorEntry::new).collect(),
        }
    }

    /// Parses a response's `errors` array.
    ///
    /// Entries that are not objects with a `message` are kept with their
    /// JSON text as the message. Returns `None` when there is nothing to report.
    #[must_use]
    pub fn from_response_errors(errors: &Value) -> Option<Self> {
        let entries = errors.as_array()?;
        if entries.is_empty() {
            return None;
        }
        let graphql_errors = entries
            .iter()
            .map(|entry| {
                serde_json::from_value(entry.clone())
                    .unwrap_or_else(|_| GraphqlErrorEntry::new(entry.to_string()))
            })
            .collect();
        Some(Self {
            network_error: None,
            graphql_errors,
        })
    }

    /// Returns `true` if a transport failure is recorded.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        self.network_error.is_some()
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(network) = &self.network_error {
            write!(f, "[Network] {network}")?;
            first = false;
        }
        for entry in &self.graphql_errors {
            if !first {
                f.write_str("\n")?;
            }
            write!(f, "[GraphQL] {}", entry.message)?;
            first = false;
        }
        if first {
            f.write_str("Unknown operation error")?;
        }
        Ok(())
    }
}

impl std::error::Error for OperationError {}

/// The result envelope of a query, mutation or subscription event.
///
/// The type parameter is the data shape: clients produce
/// `OperationResult<Value>`, raw callables decode it into the caller's type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<T = Value> {
    /// The operation data.
    #[serde(default)]
    pub data: Option<T>,
    /// The combined error, if any.
    #[serde(default)]
    pub error: Option<OperationError>,
    /// Server extensions.
    #[serde(default)]
    pub extensions: Option<Value>,
    /// Whether a newer result is expected.
    #[serde(default)]
    pub stale: bool,
}

impl<T> OperationResult<T> {
    /// Creates a successful result.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            extensions: None,
            stale: false,
        }
    }

    /// Creates a failed result.
    #[must_use]
    pub const fn err(error: OperationError) -> Self {
        Self {
            data: None,
            error: Some(error),
            extensions: None,
            stale: false,
        }
    }

    /// Creates a result with neither data nor error.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            data: None,
            error: None,
            extensions: None,
            stale: false,
        }
    }

    /// Attaches extensions.
    #[must_use]
    pub fn with_extensions(mut self, extensions: Value) -> Self {
        self.extensions = Some(extensions);
        self
    }

    /// Returns `true` if an error is present.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

impl OperationResult<Value> {
    /// Builds a result from a GraphQL response body (`data`, `errors`, `extensions`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use graphql_dispatch::OperationResult;
    /// use serde_json::json;
    ///
    /// let result = OperationResult::from_response(json!({
    ///     "data": null,
    ///     "errors": [{ "message": "boom", "path": ["me"] }]
    /// }));
    /// assert!(result.data.is_none());
    /// assert_eq!(result.error.unwrap().graphql_errors[0].message, "boom");
    /// ```
    #[must_use]
    pub fn from_response(mut body: Value) -> Self {
        let data = body.get_mut("data").map(Value::take).filter(|d| !d.is_null());
        let error = body
            .get("errors")
            .and_then(OperationError::from_response_errors);
        let extensions = body
            .get_mut("extensions")
            .map(Value::take)
            .filter(|e| !e.is_null());
        Self {
            data,
            error,
            extensions,
            stale: false,
        }
    }

    /// Decodes the data into `D`, leaving everything else untouched.
    ///
    /// JSON `null` data is treated as absent.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the data does not match `D`.
    pub fn decode<D: DeserializeOwned>(self) -> Result<OperationResult<D>, serde_json::Error> {
        self.decode_inner(false)
    }

    /// Decodes like [`decode`](Self::decode), except that when the result
    /// carries an error, data that does not match `D` is dropped instead of
    /// failing, so the error always reaches the caller.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if there is no error and the data
    /// does not match `D`.
    pub fn decode_keeping_error<D: DeserializeOwned>(
        self,
    ) -> Result<OperationResult<D>, serde_json::Error> {
        let keep_error = self.error.is_some();
        self.decode_inner(keep_error)
    }

    fn decode_inner<D: DeserializeOwned>(
        self,
        drop_mismatch: bool,
    ) -> Result<OperationResult<D>, serde_json::Error> {
        let data = match self.data {
            Some(Value::Null) | None => None,
            Some(value) => match serde_json::from_value(value) {
                Ok(data) => Some(data),
                Err(error) if drop_mismatch => {
                    tracing::debug!("Dropping partial data that does not decode: {}", error);
                    None
                }
                Err(error) => return Err(error),
            },
        };
        Ok(OperationResult {
            data,
            error: self.error,
            extensions: self.extensions,
            stale: self.stale,
        })
    }
}
