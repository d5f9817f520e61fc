//! Named operations and their callables.
//!
//! This module turns a static [`OperationSet`] into callables looked up by
//! name. Queries and mutations each come in two flavors: unwrapped
//! ([`OperationFn`]) and raw ([`RawOperationFn`]).
//!
//! # Overview
//!
//! - [`OperationSet`] / [`OperationSetBuilder`]: The validated name-to-document table
//! - [`Category`]: The namespace an operation is registered in
//! - [`Operations`] / [`RawOperations`]: Name-keyed views handed out by the facade
//! - [`OperationFn`] / [`RawOperationFn`]: The callables themselves
//! - [`DispatchError`]: Everything a callable can fail with
//!
//! # Variables
//!
//! Callables accept any `Serialize` value as variables as long as it
//! serializes to a JSON object. `()` and `None` serialize to `null` and mean
//! "no variables".
//!
//! ```rust
//! use graphql_dispatch::operations::to_variables;
//! use serde_json::json;
//!
//! assert!(to_variables(&()).unwrap().is_empty());
//! assert_eq!(to_variables(&json!({ "id": 1 })).unwrap()["id"], 1);
//! assert!(to_variables(&42).is_err());
//! ```

mod dispatcher;
mod errors;
mod namespace;
mod set;

use serde::Serialize;
use serde_json::Value;

use crate::clients::Variables;

pub use dispatcher::{MutationFn, OperationFn, QueryFn, RawMutationFn, RawOperationFn, RawQueryFn};
pub use errors::DispatchError;
pub use namespace::{Operations, RawOperations};
pub(crate) use namespace::lookup;
pub use set::{Category, OperationSet, OperationSetBuilder};

/// Serializes `variables` into a JSON object.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidVariables`] if serialization fails or
/// produces anything other than an object or `null`.
pub fn to_variables<V>(variables: &V) -> Result<Variables, DispatchError>
where
    V: Serialize + ?Sized,
{
    match serde_json::to_value(variables) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Variables::new()),
        Ok(other) => Err(DispatchError::InvalidVariables {
            reason: format!("expected a JSON object, found {}", json_type(&other)),
        }),
        Err(e) => Err(DispatchError::InvalidVariables {
            reason: e.to_string(),
        }),
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
