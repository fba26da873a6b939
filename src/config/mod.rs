//! Config nodes and the expressions that resolve them.

pub mod builtins;
pub mod eval;
pub mod expr;
pub mod node;

pub use builtins::{ModuleOutput, StaticColor, Time};
pub use eval::ConfigEvaluator;
pub use expr::{EvalContext, Expression, ExpressionRegistry, OutputSnapshot};
pub use node::{ConfigNode, LeafConfig};
