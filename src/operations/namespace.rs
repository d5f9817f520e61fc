//! Name-keyed views over one category of an [`OperationSet`].

use std::sync::Arc;

use crate::clients::ClientProvider;
use crate::document::OperationDocument;
use crate::operations::dispatcher::{OperationFn, RawOperationFn};
use crate::operations::errors::DispatchError;
use crate::operations::set::{Category, OperationSet};

/// Looks `name` up in `category`, returning the registered key and document.
pub(crate) fn lookup<'a>(
    operations: &'a OperationSet,
    category: Category,
    name: &str,
) -> Result<(&'a str, &'a Arc<OperationDocument>), DispatchError> {
    operations
        .table(category)
        .get_key_value(name)
        .map(|(key, document)| (key.as_str(), document))
        .ok_or_else(|| DispatchError::UnknownOperation {
            kind: category.kind(),
            name: name.to_string(),
        })
}

/// The unwrapped queries or mutations of a [`Graphql`](crate::Graphql) facade.
#[derive(Clone, Copy)]
pub struct Operations<'a> {
    category: Category,
    operations: &'a OperationSet,
    provider: &'a ClientProvider,
}

impl<'a> Operations<'a> {
    pub(crate) const fn new(
        category: Category,
        operations: &'a OperationSet,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            category,
            operations,
            provider,
        }
    }

    /// Returns the callable registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownOperation`] if no operation has that name.
    pub fn get(&self, name: &str) -> Result<OperationFn<'a>, DispatchError> {
        let (name, document) = lookup(self.operations, self.category, name)?;
        Ok(match self.category {
            Category::Mutation => OperationFn::mutation(name, document, self.provider),
            _ => OperationFn::query(name, document, self.provider),
        })
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.operations.names(self.category)
    }

    /// Returns `true` if an operation is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.get(self.category, name).is_some()
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.table(self.category).len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The raw queries or mutations of a [`Graphql`](crate::Graphql) facade.
#[derive(Clone, Copy)]
pub struct RawOperations<'a> {
    category: Category,
    operations: &'a OperationSet,
    provider: &'a ClientProvider,
}

impl<'a> RawOperations<'a> {
    pub(crate) const fn new(
        category: Category,
        operations: &'a OperationSet,
        provider: &'a ClientProvider,
    ) -> Self {
        Self {
            category,
            operations,
            provider,
        }
    }

    /// Returns the callable registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownOperation`] if no operation has that name.
    pub fn get(&self, name: &str) -> Result<RawOperationFn<'a>, DispatchError> {
        let (name, document) = lookup(self.operations, self.category, name)?;
        Ok(match self.category {
            Category::RawMutation => RawOperationFn::mutation(name, document, self.provider),
            _ => RawOperationFn::query(name, document, self.provider),
        })
    }

    /// Returns the registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'a str> {
        self.operations.names(self.category)
    }

    /// Returns `true` if an operation is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.get(self.category, name).is_some()
    }

    /// Returns the number of registered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.table(self.category).len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::document::OperationKind;

    fn set() -> OperationSet {
        OperationSet::builder()
            .query("me", "query Me { me { id } }")
            .query("feed", "query Feed { feed { id } }")
            .raw_mutation("like", "mutation Like { like }")
            .build()
            .unwrap()
    }

    fn provider() -> ClientProvider {
        ClientProvider::new(|_config: &ConnectionConfig| -> Arc<dyn crate::clients::GraphqlClient> {
            unreachable!("not constructed in these tests")
        })
    }

    #[test]
    fn test_get_returns_callable_for_known_name() {
        let (set, provider) = (set(), provider());
        let queries = Operations::new(Category::Query, &set, &provider);

        let me = queries.get("me").unwrap();
        assert_eq!(me.name(), "me");
        assert_eq!(me.kind(), OperationKind::Query);
        assert_eq!(me.document().operation_name(), Some("Me"));
    }

    #[test]
    fn test_get_unknown_name_reports_namespace_kind() {
        let (set, provider) = (set(), provider());
        let mutations = RawOperations::new(Category::RawMutation, &set, &provider);

        let error = mutations.get("unlike").err().unwrap();
        assert!(matches!(
            error,
            DispatchError::UnknownOperation { kind: OperationKind::Mutation, ref name } if name == "unlike"
        ));
    }

    #[test]
    fn test_raw_mutation_callable_has_mutation_kind() {
        let (set, provider) = (set(), provider());
        let mutations = RawOperations::new(Category::RawMutation, &set, &provider);
        assert_eq!(mutations.get("like").unwrap().kind(), OperationKind::Mutation);
    }

    #[test]
    fn test_names_and_contains() {
        let (set, provider) = (set(), provider());
        let queries = Operations::new(Category::Query, &set, &provider);

        assert_eq!(queries.names().collect::<Vec<_>>(), vec!["feed", "me"]);
        assert!(queries.contains("me"));
        assert!(!queries.contains("like"));
        assert_eq!(queries.len(), 2);

        let raw_queries = RawOperations::new(Category::RawQuery, &set, &provider);
        assert!(raw_queries.is_empty());
    }
}
