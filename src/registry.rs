//! Adapter registry
//!
//! A registry is an explicitly constructed context object, created once at
//! startup, populated before any fetcher runs, and injected where adapter
//! discovery is needed. There is no deletion API: entries live as long as
//! the registry. Registration is fail-fast: a name collision is a programmer
//! error surfaced at load time, not at request time.

use crate::adapter::{Adapter, ArweaveAdapter};
use crate::error::RegistryError;
use std::sync::Arc;

/// Base contract shared by registries: keyed items, unique keys,
/// registration-order enumeration.
pub trait Registry {
    /// The registered item type
    type Item;

    /// The unique key under which an item is registered
    fn key_of(item: &Self::Item) -> &str;

    /// Insert an item; callers must run `validate` first
    fn add(&mut self, item: Self::Item);

    /// All registered items, in registration order
    fn get_all(&self) -> &[Self::Item];

    /// Reject an item whose key is already taken; does not mutate state
    fn validate(&self, item: &Self::Item) -> Result<(), RegistryError> {
        let key = Self::key_of(item);
        if self.get_by_name(key).is_some() {
            return Err(RegistryError::duplicate_registration(key));
        }
        Ok(())
    }

    /// Validate, then add
    fn register(&mut self, item: Self::Item) -> Result<(), RegistryError> {
        self.validate(&item)?;
        self.add(item);
        Ok(())
    }

    /// Look up an item by key; a missing key is not an error
    fn get_by_name(&self, name: &str) -> Option<&Self::Item> {
        self.get_all().iter().find(|i| Self::key_of(i) == name)
    }
}

/// Registry of transport adapters, keyed by `Adapter::name`
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn Adapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in adapters pre-registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        // Fresh registry, builtin names cannot collide.
        registry.add(Arc::new(ArweaveAdapter::default()));
        registry
    }

    /// Look up an adapter by name, cloning the shared handle
    pub fn get(&self, name: &str) -> Option<Arc<dyn Adapter>> {
        self.get_by_name(name).cloned()
    }
}

impl Registry for AdapterRegistry {
    type Item = Arc<dyn Adapter>;

    fn key_of(item: &Self::Item) -> &str {
        item.name()
    }

    fn add(&mut self, item: Self::Item) {
        self.adapters.push(item);
    }

    fn get_all(&self) -> &[Self::Item] {
        &self.adapters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::time::Duration;

    struct StubAdapter;

    #[async_trait::async_trait]
    impl Adapter for StubAdapter {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn timeout(&self) -> Duration {
            Duration::from_secs(1)
        }

        fn rewrite_url(&self, url: &str) -> Result<String, FetchError> {
            Ok(url.to_string())
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = AdapterRegistry::new();
        assert!(registry.get_all().is_empty());
        assert!(registry.get("arweave").is_none());
    }

    #[test]
    fn test_with_builtins_registers_arweave() {
        let registry = AdapterRegistry::with_builtins();
        let adapter = registry.get("arweave").unwrap();
        assert_eq!(adapter.name(), "arweave");
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(StubAdapter)).unwrap();
        assert!(registry.get("stub").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = AdapterRegistry::with_builtins();
        let err = registry
            .register(Arc::new(ArweaveAdapter::default()))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateRegistration { .. }));
    }

    #[test]
    fn test_first_registration_survives_duplicate_attempt() {
        let mut registry = AdapterRegistry::new();
        let first: Arc<dyn Adapter> = Arc::new(ArweaveAdapter::default());
        registry.register(first.clone()).unwrap();
        assert!(registry
            .register(Arc::new(ArweaveAdapter::default()))
            .is_err());

        let retrieved = registry.get("arweave").unwrap();
        assert!(Arc::ptr_eq(&retrieved, &first));
        assert_eq!(registry.get_all().len(), 1);
    }

    #[test]
    fn test_validate_does_not_mutate() {
        let registry = AdapterRegistry::with_builtins();
        let dup: Arc<dyn Adapter> = Arc::new(ArweaveAdapter::default());
        assert!(registry.validate(&dup).is_err());
        assert_eq!(registry.get_all().len(), 1);
    }

    #[test]
    fn test_get_all_preserves_registration_order() {
        let mut registry = AdapterRegistry::new();
        registry.register(Arc::new(StubAdapter)).unwrap();
        registry
            .register(Arc::new(ArweaveAdapter::default()))
            .unwrap();

        let names: Vec<&str> = registry.get_all().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["stub", "arweave"]);
    }
}
