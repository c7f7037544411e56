//! Generator registry.
//!
//! Maps generator ids to implementations. Iteration is in id order.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::GeneratorError;
use crate::generator::golang::GoGenerator;
use crate::generator::irjson::IrJsonGenerator;
use crate::generator::traits::CodeGenerator;
use crate::generator::typescript::TypeScriptGenerator;

/// Registry of code generators keyed by id.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: BTreeMap<&'static str, Arc<dyn CodeGenerator>>,
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("generators", &self.ids())
            .finish()
    }
}

impl GeneratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in generator.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TypeScriptGenerator::new());
        registry.register(GoGenerator::new());
        registry.register(IrJsonGenerator::new());
        registry
    }

    /// Register a generator, replacing any generator with the same id.
    pub fn register(&mut self, generator: impl CodeGenerator + 'static) {
        self.generators.insert(generator.id(), Arc::new(generator));
    }

    /// Get a generator by id.
    pub fn get(&self, id: &str) -> Result<Arc<dyn CodeGenerator>, GeneratorError> {
        self.generators
            .get(id)
            .cloned()
            .ok_or_else(|| GeneratorError::UnknownGenerator(id.to_string()))
    }

    /// Check if a generator is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.generators.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.generators.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = GeneratorRegistry::with_builtins();
        assert_eq!(registry.ids(), vec!["go", "ir", "typescript"]);
        assert_eq!(registry.get("typescript").unwrap().name(), "TypeScript");
    }

    #[test]
    fn test_unknown_generator() {
        let registry = GeneratorRegistry::new();
        assert!(!registry.contains("go"));
        assert!(matches!(
            registry.get("go"),
            Err(GeneratorError::UnknownGenerator(id)) if id == "go"
        ));
    }
}
