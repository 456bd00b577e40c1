//! Tool registry: name → (config, instantiated tool), in registration order.
//!
//! Built once at startup and then shared read-only behind an `Arc`.

use adcopy_core::error::RegistryError;
use adcopy_core::types::{ToolCategory, ToolConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::tool::{Tool, ToolFactory};

#[derive(Clone)]
pub struct RegistryEntry {
    pub config: ToolConfig,
    pub tool: Arc<dyn Tool>,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instantiate a tool through `factory` and store it under `config.name`.
    ///
    /// A duplicate name fails unless `replace_existing` is set; a replacement
    /// keeps the original registration position. Construction errors are
    /// returned and leave the registry untouched.
    pub fn register(
        &mut self,
        factory: &dyn ToolFactory,
        config: ToolConfig,
        replace_existing: bool,
    ) -> Result<(), RegistryError> {
        let name = config.name.clone();
        let existing = self.index.get(&name).copied();
        if existing.is_some() && !replace_existing {
            return Err(RegistryError::Duplicate(name));
        }

        let tool = factory.build(config.clone())?;
        let entry = RegistryEntry { config, tool };

        match existing {
            Some(pos) => {
                self.entries[pos] = entry;
                info!(tool = %name, position = pos, "Replaced registered tool");
            }
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(entry);
                info!(
                    tool = %name,
                    position = self.entries.len() - 1,
                    "Registered tool"
                );
            }
        }
        Ok(())
    }

    /// Register using the factory's own default configuration.
    pub fn register_default(
        &mut self,
        factory: &dyn ToolFactory,
        replace_existing: bool,
    ) -> Result<(), RegistryError> {
        self.register(factory, factory.default_config(), replace_existing)
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.entry(name)
            .map(|e| e.tool.clone())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn entry(&self, name: &str) -> Option<&RegistryEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Entries in registration order, optionally restricted to one category.
    pub fn list(&self, category: Option<ToolCategory>) -> Vec<&RegistryEntry> {
        self.entries
            .iter()
            .filter(|e| category.map_or(true, |c| e.config.category == c))
            .collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.config.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::ToolReport;
    use adcopy_core::error::{DependencyError, ToolError, ValidationError};
    use adcopy_core::types::ToolInput;
    use async_trait::async_trait;

    struct Marker {
        config: ToolConfig,
        marker: f64,
    }

    #[async_trait]
    impl Tool for Marker {
        fn config(&self) -> &ToolConfig {
            &self.config
        }

        fn output_score_names(&self) -> &'static [&'static str] {
            &["marker"]
        }

        fn validate_input(&self, _input: &ToolInput) -> Result<(), ValidationError> {
            Ok(())
        }

        async fn analyze(&self, _input: &ToolInput) -> Result<ToolReport, ToolError> {
            Ok(ToolReport::new(90.0).score("marker", self.marker))
        }
    }

    struct MarkerFactory {
        marker: f64,
        category: ToolCategory,
        fail: bool,
    }

    impl MarkerFactory {
        fn new(marker: f64) -> Self {
            Self {
                marker,
                category: ToolCategory::Analyzer,
                fail: false,
            }
        }
    }

    impl ToolFactory for MarkerFactory {
        fn default_config(&self) -> ToolConfig {
            ToolConfig::new("marker", self.category, 100)
        }

        fn build(&self, config: ToolConfig) -> Result<Arc<dyn Tool>, DependencyError> {
            if self.fail {
                return Err(DependencyError::new(&config.name, "model", "not installed"));
            }
            Ok(Arc::new(Marker {
                config,
                marker: self.marker,
            }))
        }
    }

    fn named(name: &str) -> ToolConfig {
        ToolConfig::new(name, ToolCategory::Analyzer, 100)
    }

    #[test]
    fn test_duplicate_without_replace_fails() {
        let mut registry = ToolRegistry::new();
        registry
            .register(&MarkerFactory::new(1.0), named("a"), false)
            .unwrap();
        let err = registry
            .register(&MarkerFactory::new(2.0), named("a"), false)
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("a".into()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_returns_second_tool_in_original_position() {
        let mut registry = ToolRegistry::new();
        registry
            .register(&MarkerFactory::new(1.0), named("a"), false)
            .unwrap();
        registry
            .register(&MarkerFactory::new(5.0), named("b"), false)
            .unwrap();
        registry
            .register(&MarkerFactory::new(2.0), named("a"), true)
            .unwrap();

        assert_eq!(registry.names(), vec!["a", "b"]);
        let input = ToolInput::new(&adcopy_core::types::AdCopy::new("h", "b", "c", "google"));
        let out = registry.get("a").unwrap().run(&input).await;
        assert_eq!(out.score("marker"), Some(2.0));
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let registry = ToolRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(RegistryError::NotFound(name)) if name == "missing"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dependency_error_excludes_tool() {
        let mut registry = ToolRegistry::new();
        let factory = MarkerFactory {
            fail: true,
            ..MarkerFactory::new(1.0)
        };
        let err = registry.register_default(&factory, false).unwrap_err();
        assert!(matches!(err, RegistryError::Dependency(_)));
        assert!(!registry.contains("marker"));
    }

    #[test]
    fn test_list_filters_by_category_in_order() {
        let mut registry = ToolRegistry::new();
        registry
            .register(&MarkerFactory::new(1.0), named("first"), false)
            .unwrap();
        registry
            .register(
                &MarkerFactory::new(1.0),
                ToolConfig::new("optimizer", ToolCategory::Optimizer, 100),
                false,
            )
            .unwrap();
        registry
            .register(&MarkerFactory::new(1.0), named("second"), false)
            .unwrap();

        let analyzers: Vec<&str> = registry
            .list(Some(ToolCategory::Analyzer))
            .iter()
            .map(|e| e.config.name.as_str())
            .collect();
        assert_eq!(analyzers, vec!["first", "second"]);
        assert_eq!(registry.list(None).len(), 3);
        assert_eq!(registry.position("second"), Some(2));
    }
}
