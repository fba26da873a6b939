#![forbid(unsafe_code)]

pub mod config;
pub mod foundation;
pub mod gpu;
pub mod graph;
pub mod module;
pub mod modules;
pub mod types;

pub use config::{ConfigEvaluator, ConfigNode, EvalContext, Expression, ExpressionRegistry};
pub use foundation::color::Color;
pub use foundation::error::{FxError, FxResult};
pub use foundation::path::ConfigPath;
pub use foundation::time::{Clock, ManualClock, SystemClock};
pub use foundation::value::Value;
pub use graph::{GraphConfig, GraphRuntime, ManualScheduler, NodeConfig, NodeState, TickScheduler};
pub use module::{
    ModuleDefinition, ModuleInstance, ModuleRegistry, ModuleSpec, RuntimeOpts, define_module,
};
pub use modules::{ScreenCompositor, builtin_registry};
pub use types::TypeTree;
