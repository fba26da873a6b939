//! Graph configs and the runtime that ticks them.

pub mod config;
pub mod runtime;
pub mod scheduler;

pub use config::{GraphConfig, NodeConfig};
pub use runtime::{
    GraphRuntime, NodeFailure, NodeRecord, NodeState, RuntimeBuilder, TickHandler, TickHandlerId,
    TickReport,
};
pub use scheduler::{ManualScheduler, TickHandle, TickScheduler};
