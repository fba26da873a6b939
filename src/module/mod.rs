//! Module types and the registry that maps type ids to them.

pub mod context;
pub mod definition;
pub mod registry;

pub use context::{FactoryContext, RuntimeOpts, UpdateContext};
pub use definition::{
    ModuleDefinition, ModuleFactory, ModuleInstance, ModuleSpec, define_module,
};
pub use registry::ModuleRegistry;
