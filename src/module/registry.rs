use std::sync::Arc;

use indexmap::IndexMap;

use crate::foundation::error::{FxError, FxResult};
use crate::module::definition::ModuleDefinition;

/// `type_id → definition` table consulted when a graph config is parsed and instantiated.
///
/// Passed to the runtime explicitly; there is no process-wide registry.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    defs: IndexMap<String, Arc<ModuleDefinition>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, def: ModuleDefinition) -> FxResult<()> {
        if self.defs.contains_key(&def.type_id) {
            return Err(FxError::graph_definition(format!(
                "module type '{}' is already registered",
                def.type_id
            )));
        }
        tracing::debug!(type_id = %def.type_id, "module type registered");
        self.defs.insert(def.type_id.clone(), Arc::new(def));
        Ok(())
    }

    pub fn get(&self, type_id: &str) -> Option<&Arc<ModuleDefinition>> {
        self.defs.get(type_id)
    }

    /// Like [`ModuleRegistry::get`], failing with [`FxError::GraphDefinition`].
    pub fn resolve(&self, type_id: &str) -> FxResult<Arc<ModuleDefinition>> {
        self.defs
            .get(type_id)
            .cloned()
            .ok_or_else(|| FxError::graph_definition(format!("unknown module type '{type_id}'")))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.defs.contains_key(type_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.defs.values().map(|d| d.as_ref())
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/module/registry.rs"]
mod tests;
