use std::fmt;
use std::sync::Arc;

use crate::config::ConfigNode;
use crate::foundation::error::FxResult;
use crate::foundation::path::ConfigPath;
use crate::foundation::value::Value;
use crate::graph::NodeConfig;
use crate::module::context::{FactoryContext, UpdateContext};
use crate::types::TypeTree;

/// A live module. Owns its GPU resources and animation state.
pub trait ModuleInstance {
    /// Produce this tick's output from the evaluated input.
    fn update(&mut self, ctx: &UpdateContext<'_>, input: &Value) -> FxResult<Value>;

    /// Release resources early. Called once, before the instance is dropped.
    fn dispose(&mut self) {}
}

pub type ModuleFactory =
    Arc<dyn Fn(&FactoryContext) -> FxResult<Box<dyn ModuleInstance>> + Send + Sync>;

/// Label and types passed to [`define_module`].
#[derive(Debug, Clone)]
pub struct ModuleSpec {
    pub label: String,
    pub input: TypeTree,
    pub output: TypeTree,
}

/// Registered module type: `type_id → (input type, output type, factory)`.
#[derive(Clone)]
pub struct ModuleDefinition {
    pub type_id: String,
    pub label: String,
    pub input: TypeTree,
    pub output: TypeTree,
    factory: ModuleFactory,
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("type_id", &self.type_id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

pub fn define_module<F>(type_id: impl Into<String>, spec: ModuleSpec, factory: F) -> ModuleDefinition
where
    F: Fn(&FactoryContext) -> FxResult<Box<dyn ModuleInstance>> + Send + Sync + 'static,
{
    ModuleDefinition {
        type_id: type_id.into(),
        label: spec.label,
        input: spec.input,
        output: spec.output,
        factory: Arc::new(factory),
    }
}

impl ModuleDefinition {
    pub fn instantiate(&self, ctx: &FactoryContext) -> FxResult<Box<dyn ModuleInstance>> {
        (self.factory)(ctx)
    }

    pub fn factory(&self) -> &ModuleFactory {
        &self.factory
    }

    pub fn default_output(&self) -> Value {
        self.output.default_value()
    }

    /// Build a graph entry of this type, checking `input` against the input type.
    pub fn node_config(&self, input: ConfigNode) -> FxResult<NodeConfig> {
        self.input
            .check_config(&input, &ConfigPath::root().field("input"))?;
        Ok(NodeConfig {
            type_id: self.type_id.clone(),
            input,
        })
    }
}
