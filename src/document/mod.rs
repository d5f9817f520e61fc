//! GraphQL operation documents.
//!
//! An [`OperationDocument`] is the immutable definition behind every named
//! operation: its source text, the kind of its first operation definition,
//! its optional operation name, and its canonical form.
//!
//! # Canonical Form
//!
//! The canonical form is the document parsed with `graphql_parser` and
//! printed back from its AST. Comments, commas and whitespace do not survive
//! parsing, and string values are printed from their decoded contents, so a
//! block string and a quoted string holding the same text print alike. Two
//! documents that differ only in formatting share a canonical form, which is
//! what the [`SubscriptionRegistry`](crate::subscriptions::SubscriptionRegistry)
//! keys its buckets on.
//!
//! ```rust
//! use graphql_dispatch::document::canonicalize;
//!
//! let a = canonicalize("subscription OnMessage($room: ID!) { message(room: $room) { id } }").unwrap();
//! let b = canonicalize("
//!     ## new messages
//!     subscription OnMessage( $room : ID!, ) {
//!         message(room: $room) {
//!             id
//!         }
//!     }
//! ").unwrap();
//! assert_eq!(a, b);
//! ```

use std::fmt;
use std::str::FromStr;

use graphql_parser::query::{Definition, Document, OperationDefinition};
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// The three operation categories of GraphQL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// A read-only fetch.
    Query,
    /// A write followed by a fetch.
    Mutation,
    /// A long-lived stream of results.
    Subscription,
}

impl OperationKind {
    /// Returns the keyword that introduces this kind of operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed, immutable GraphQL operation document.
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::document::{OperationDocument, OperationKind};
///
/// let doc = OperationDocument::parse("mutation Like($id: ID!) { like(id: $id) { count } }").unwrap();
/// assert_eq!(doc.kind(), OperationKind::Mutation);
/// assert_eq!(doc.operation_name(), Some("Like"));
///
/// let shorthand: OperationDocument = "{ viewer { id } }".parse().unwrap();
/// assert_eq!(shorthand.kind(), OperationKind::Query);
/// assert_eq!(shorthand.operation_name(), None);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationDocument {
    source: String,
    canonical: String,
    kind: OperationKind,
    operation_name: Option<String>,
}

impl OperationDocument {
    /// Parses a document, detecting the kind of its first operation.
    ///
    /// Fragment definitions may appear anywhere in the document; the first
    /// operation definition decides the kind.
    ///
    /// # Errors
    ///
    /// - [`DocumentError::Empty`] if the document has no definitions
    /// - [`DocumentError::Syntax`] if the document is not a valid executable
    ///   GraphQL document
    /// - [`DocumentError::NoOperation`] if no definition is an operation
    pub fn parse(source: impl Into<String>) -> Result<Self, DocumentError> {
        let source = source.into();
        let document = parse_document(&source)?;

        let (kind, operation_name) = first_operation(&document).ok_or(DocumentError::NoOperation)?;
        let canonical = document.to_string();

        Ok(Self {
            canonical,
            kind,
            operation_name,
            source,
        })
    }

    /// Returns the source text exactly as supplied.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the canonical form used as a registry key.
    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Returns the kind of the document's first operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Returns the name of the document's first operation, if it has one.
    #[must_use]
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }

    /// Returns `true` if both documents share a canonical form.
    #[must_use]
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl FromStr for OperationDocument {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OperationDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Returns the canonical form of `source` without requiring it to contain an operation.
///
/// # Errors
///
/// Returns [`DocumentError::Empty`] for a blank document and
/// [`DocumentError::Syntax`] if the source does not parse.
pub fn canonicalize(source: &str) -> Result<String, DocumentError> {
    Ok(parse_document(source)?.to_string())
}

fn parse_document(source: &str) -> Result<Document<'_, String>, DocumentError> {
    if is_blank(source) {
        return Err(DocumentError::Empty);
    }
    graphql_parser::parse_query::<String>(source).map_err(|error| DocumentError::Syntax {
        reason: error.to_string(),
    })
}

/// Returns `true` if `source` holds nothing but whitespace, commas and comments.
fn is_blank(source: &str) -> bool {
    source.lines().all(|line| {
        line.split('#').next().map_or(true, |code| {
            code.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '\u{feff}')
                .is_empty()
        })
    })
}

fn first_operation(document: &Document<'_, String>) -> Option<(OperationKind, Option<String>)> {
    document.definitions.iter().find_map(|definition| match definition {
        Definition::Operation(operation) => Some(match operation {
            OperationDefinition::SelectionSet(_) => (OperationKind::Query, None),
            OperationDefinition::Query(query) => (OperationKind::Query, query.name.clone()),
            OperationDefinition::Mutation(mutation) => {
                (OperationKind::Mutation, mutation.name.clone())
            }
            OperationDefinition::Subscription(subscription) => {
                (OperationKind::Subscription, subscription.name.clone())
            }
        }),
        Definition::Fragment(_) => None,
    })
}
