//! Engine registry.
//!
//! Built once at startup and never mutated afterward; shared read-only
//! across request handlers. Adding an engine means adding an adapter and a
//! `builtin` entry, never runtime discovery.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::EngineAdapter;
use crate::engines::{Ask, Brave, DuckDuckGo, Yahoo};
use crate::{Result, SearchError};

/// Static mapping from engine name to its adapter.
pub struct EngineRegistry {
    adapters: HashMap<String, Arc<dyn EngineAdapter>>,
    /// Registration order, the order `names` reports.
    order: Vec<String>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry of all built-in engines, in their canonical order.
    pub fn builtin(navigation_timeout: Duration) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DuckDuckGo::new(navigation_timeout)));
        registry.register(Arc::new(Brave::new(navigation_timeout)));
        registry.register(Arc::new(Yahoo::new(navigation_timeout)));
        registry.register(Arc::new(Ask::new(navigation_timeout)));
        registry
    }

    /// Registers an adapter under its own name. A re-registered name
    /// replaces the adapter but keeps its original position.
    pub fn register(&mut self, adapter: Arc<dyn EngineAdapter>) {
        let name = adapter.name().to_string();
        if self.adapters.insert(name.clone(), adapter).is_none() {
            self.order.push(name);
        }
    }

    /// All registered names in registration order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Looks up an adapter by exact, case-sensitive name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn EngineAdapter>> {
        self.adapters
            .get(name)
            .cloned()
            .ok_or_else(|| SearchError::UnknownEngine(name.to_string()))
    }

    /// Number of registered engines.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the registry has no engines.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> EngineRegistry {
        EngineRegistry::builtin(Duration::from_secs(10))
    }

    #[test]
    fn test_builtin_registers_all_engines_in_order() {
        let registry = registry();
        assert_eq!(registry.names(), &["duckduckgo", "brave", "yahoo", "ask"]);
        assert_eq!(registry.len(), 4);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_resolve_is_total_over_names() {
        let registry = registry();
        for name in registry.names() {
            let adapter = registry.resolve(name).unwrap();
            assert_eq!(adapter.name(), name);
        }
    }

    #[test]
    fn test_resolve_returns_same_instance() {
        let registry = registry();
        let first = registry.resolve("brave").unwrap();
        let second = registry.resolve("brave").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_resolve_unknown_engine() {
        let registry = registry();
        let result = registry.resolve("altavista");
        assert!(matches!(result, Err(SearchError::UnknownEngine(name)) if name == "altavista"));
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let registry = registry();
        assert!(registry.resolve("duckduckgo").is_ok());
        assert!(matches!(
            registry.resolve("DuckDuckGo"),
            Err(SearchError::UnknownEngine(_))
        ));
        assert!(matches!(
            registry.resolve("BRAVE"),
            Err(SearchError::UnknownEngine(_))
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = EngineRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.names().is_empty());
        assert!(matches!(
            registry.resolve("duckduckgo"),
            Err(SearchError::UnknownEngine(_))
        ));
    }
}
