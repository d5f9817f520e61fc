//! The static table of named operations.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::document::{OperationDocument, OperationKind};
use crate::error::DocumentError;

/// The five namespaces an operation can be registered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Queries whose callables unwrap to data.
    Query,
    /// Queries whose callables return the full result.
    RawQuery,
    /// Mutations whose callables unwrap to data.
    Mutation,
    /// Mutations whose callables return the full result.
    RawMutation,
    /// Subscriptions.
    Subscription,
}

impl Category {
    /// All categories, in namespace order.
    pub const ALL: [Self; 5] = [
        Self::Query,
        Self::RawQuery,
        Self::Mutation,
        Self::RawMutation,
        Self::Subscription,
    ];

    /// Returns the operation kind documents in this category must define.
    #[must_use]
    pub const fn kind(self) -> OperationKind {
        match self {
            Self::Query | Self::RawQuery => OperationKind::Query,
            Self::Mutation | Self::RawMutation => OperationKind::Mutation,
            Self::Subscription => OperationKind::Subscription,
        }
    }

    /// Returns `true` for the raw namespaces.
    #[must_use]
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::RawQuery | Self::RawMutation)
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::RawQuery => "raw query",
            Self::Mutation => "mutation",
            Self::RawMutation => "raw mutation",
            Self::Subscription => "subscription",
        })
    }
}

type Table = BTreeMap<String, Arc<OperationDocument>>;

/// An immutable, validated table of named operations.
///
/// Built once with [`OperationSet::builder`] and handed to
/// [`Graphql::new`](crate::Graphql::new). Names are unique within a
/// category; the same name may appear in different categories.
///
/// # Example
///
/// ```rust
/// use graphql_dispatch::operations::{Category, OperationSet};
///
/// let operations = OperationSet::builder()
///     .query("me", "query Me { me { id name } }")
///     .raw_mutation("like", "mutation Like($id: ID!) { like(id: $id) { count } }")
///     .subscription("onMessage", "subscription OnMessage { message { id } }")
///     .build()
///     .unwrap();
///
/// assert_eq!(operations.len(), 3);
/// assert!(operations.get(Category::RawMutation, "like").is_some());
/// assert!(operations.get(Category::Mutation, "like").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct OperationSet {
    tables: [Table; 5],
}

impl OperationSet {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> OperationSetBuilder {
        OperationSetBuilder::new()
    }

    /// Returns the document registered under `name` in `category`.
    #[must_use]
    pub fn get(&self, category: Category, name: &str) -> Option<&Arc<OperationDocument>> {
        self.table(category).get(name)
    }

    /// Returns the names registered in `category`, sorted.
    pub fn names(&self, category: Category) -> impl Iterator<Item = &str> {
        self.table(category).keys().map(String::as_str)
    }

    /// Returns `(name, document)` pairs registered in `category`, sorted by name.
    pub fn iter(
        &self,
        category: Category,
    ) -> impl Iterator<Item = (&str, &Arc<OperationDocument>)> {
        self.table(category)
            .iter()
            .map(|(name, document)| (name.as_str(), document))
    }

    /// Returns the total number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.iter().map(BTreeMap::len).sum()
    }

    /// Returns `true` if no operations are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(BTreeMap::is_empty)
    }

    pub(crate) fn table(&self, category: Category) -> &Table {
        &self.tables[category.index()]
    }
}

/// Builder for [`OperationSet`].
///
/// Documents are parsed and validated in [`build`](Self::build), so the
/// chain itself never fails.
#[derive(Clone, Debug, Default)]
pub struct OperationSetBuilder {
    entries: Vec<(Category, String, String)>,
}

impl OperationSetBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a query whose callable unwraps to data.
    #[must_use]
    pub fn query(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.register(Category::Query, name, source)
    }

    /// Registers a query whose callable returns the full result.
    #[must_use]
    pub fn raw_query(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.register(Category::RawQuery, name, source)
    }

    /// Registers a mutation whose callable unwraps to data.
    #[must_use]
    pub fn mutation(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.register(Category::Mutation, name, source)
    }

    /// Registers a mutation whose callable returns the full result.
    #[must_use]
    pub fn raw_mutation(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.register(Category::RawMutation, name, source)
    }

    /// Registers a subscription.
    #[must_use]
    pub fn subscription(self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.register(Category::Subscription, name, source)
    }

    /// Registers a document in an explicit category.
    #[must_use]
    pub fn register(
        mut self,
        category: Category,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        self.entries.push((category, name.into(), source.into()));
        self
    }

    /// Parses every document and builds the set.
    ///
    /// # Errors
    ///
    /// Returns the first failure in registration order:
    /// - any [`DocumentError`] from [`OperationDocument::parse`]
    /// - [`DocumentError::KindMismatch`] if a document defines a different
    ///   kind of operation than its category requires
    /// - [`DocumentError::DuplicateName`] if a name repeats within a category
    pub fn build(self) -> Result<OperationSet, DocumentError> {
        let mut set = OperationSet::default();
        for (category, name, source) in self.entries {
            let document = OperationDocument::parse(source)?;
            if document.kind() != category.kind() {
                return Err(DocumentError::KindMismatch {
                    name,
                    expected: category.kind(),
                    found: document.kind(),
                });
            }
            let table = &mut set.tables[category.index()];
            if table.contains_key(&name) {
                return Err(DocumentError::DuplicateName {
                    kind: category.kind(),
                    name,
                });
            }
            table.insert(name, Arc::new(document));
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_places_each_document_in_its_category() {
        let set = OperationSet::builder()
            .query("me", "query Me { me { id } }")
            .raw_query("meRaw", "{ me { id } }")
            .mutation("like", "mutation { like }")
            .raw_mutation("likeRaw", "mutation LikeRaw { like }")
            .subscription("ticks", "subscription { tick }")
            .build()
            .unwrap();

        assert_eq!(set.len(), 5);
        for category in Category::ALL {
            assert_eq!(set.names(category).count(), 1, "{category}");
        }
        assert_eq!(set.names(Category::RawQuery).next(), Some("meRaw"));
    }

    #[test]
    fn test_build_rejects_kind_mismatch() {
        let result = OperationSet::builder()
            .query("ticks", "subscription { tick }")
            .build();
        assert_eq!(
            result.unwrap_err(),
            DocumentError::KindMismatch {
                name: "ticks".to_string(),
                expected: OperationKind::Query,
                found: OperationKind::Subscription,
            }
        );
    }

    #[test]
    fn test_build_rejects_shorthand_as_mutation() {
        let result = OperationSet::builder()
            .raw_mutation("oops", "{ me { id } }")
            .build();
        assert!(matches!(
            result,
            Err(DocumentError::KindMismatch {
                found: OperationKind::Query,
                ..
            })
        ));
    }

    #[test]
    fn test_build_rejects_duplicate_name_in_category() {
        let result = OperationSet::builder()
            .mutation("like", "mutation A { like }")
            .mutation("like", "mutation B { like }")
            .build();
        assert_eq!(
            result.unwrap_err(),
            DocumentError::DuplicateName {
                kind: OperationKind::Mutation,
                name: "like".to_string(),
            }
        );
    }

    #[test]
    fn test_same_name_allowed_across_categories() {
        let set = OperationSet::builder()
            .query("me", "query Me { me { id } }")
            .raw_query("me", "query Me { me { id } }")
            .build()
            .unwrap();
        assert!(set.get(Category::Query, "me").is_some());
        assert!(set.get(Category::RawQuery, "me").is_some());
    }

    #[test]
    fn test_build_propagates_parse_errors() {
        let result = OperationSet::builder().query("broken", "query {").build();
        assert!(matches!(result, Err(DocumentError::Syntax { .. })));
    }

    #[test]
    fn test_empty_set() {
        let set = OperationSet::builder().build().unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_category_kind_and_raw() {
        assert_eq!(Category::RawMutation.kind(), OperationKind::Mutation);
        assert!(Category::RawQuery.is_raw());
        assert!(!Category::Subscription.is_raw());
        assert_eq!(Category::RawQuery.to_string(), "raw query");
    }
}
