use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::{ConfigEvaluator, ConfigNode, EvalContext, ExpressionRegistry, OutputSnapshot};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::path::ConfigPath;
use crate::foundation::time::{Clock, SystemClock};
use crate::foundation::value::Value;
use crate::gpu::SharedDevice;
use crate::graph::config::{GraphConfig, NodeConfig};
use crate::graph::scheduler::{ManualScheduler, TickHandle, TickScheduler};
use crate::module::{
    FactoryContext, ModuleDefinition, ModuleInstance, ModuleRegistry, RuntimeOpts, UpdateContext,
};

/// Lifecycle of one graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Uninitialized,
    Initialized,
    /// Input resolved this tick, `update` not yet done.
    Evaluated,
    Updated,
    Disposed,
}

/// A node that failed during a tick. Its previous output was kept.
#[derive(Debug, Clone)]
pub struct NodeFailure {
    pub node_id: String,
    pub error: Rc<FxError>,
}

/// Runtime bookkeeping for one node.
pub struct NodeRecord {
    id: String,
    definition: Arc<ModuleDefinition>,
    config: NodeConfig,
    instance: Option<Box<dyn ModuleInstance>>,
    last_input: Value,
    last_output: Value,
    state: NodeState,
    last_error: Option<Rc<FxError>>,
}

impl NodeRecord {
    fn create(
        id: &str,
        config: &NodeConfig,
        def: Arc<ModuleDefinition>,
        ctx: &FactoryContext,
    ) -> FxResult<Self> {
        let mut record = Self {
            id: id.to_owned(),
            last_input: def.input.default_value(),
            last_output: def.default_output(),
            definition: def,
            config: config.clone(),
            instance: None,
            state: NodeState::Uninitialized,
            last_error: None,
        };
        record.instance = Some(record.definition.instantiate(ctx)?);
        record.state = NodeState::Initialized;
        tracing::debug!(node = %record.id, type_id = %record.config.type_id, "node created");
        Ok(record)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition(&self) -> &ModuleDefinition {
        &self.definition
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn last_input(&self) -> &Value {
        &self.last_input
    }

    pub fn last_output(&self) -> &Value {
        &self.last_output
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Error of the most recent tick, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&FxError> {
        self.last_error.as_deref()
    }

    fn dispose(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.dispose();
            drop(instance);
            self.state = NodeState::Disposed;
            tracing::debug!(node = %self.id, "node disposed");
        }
    }
}

impl Drop for NodeRecord {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Unique id of a registered tick handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandlerId(u64);

/// What a tick handler sees once every node has run.
pub struct TickReport<'a> {
    pub tick: u64,
    /// Outputs as of the end of this tick.
    pub outputs: &'a OutputSnapshot,
    pub failures: &'a [NodeFailure],
    stop_requested: bool,
}

impl TickReport<'_> {
    pub fn output(&self, id: &str) -> Option<&Value> {
        self.outputs.get(id)
    }

    /// Stop the loop after this tick. Handlers registered later still run.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }
}

pub type TickHandler = Box<dyn FnMut(&mut TickReport<'_>) -> FxResult<()>>;

/// Owns the module instances of one graph and runs them once per tick.
///
/// Every node reads the outputs recorded at the end of the previous tick, never partial results
/// of the current one. Nodes run in config order; a cycle costs one tick of latency per edge and
/// nothing else.
pub struct GraphRuntime {
    registry: ModuleRegistry,
    expressions: ExpressionRegistry,
    factory_ctx: FactoryContext,
    clock: Rc<dyn Clock>,
    scheduler: Rc<dyn TickScheduler>,
    nodes: IndexMap<String, NodeRecord>,
    handlers: Vec<(TickHandlerId, TickHandler)>,
    next_handler: u64,
    running: bool,
    pending: Option<TickHandle>,
    tick_count: u64,
}

/// Collaborators for [`GraphRuntime`]; everything but the module registry has a default.
pub struct RuntimeBuilder {
    registry: ModuleRegistry,
    expressions: Option<ExpressionRegistry>,
    device: Option<SharedDevice>,
    clock: Option<Rc<dyn Clock>>,
    scheduler: Option<Rc<dyn TickScheduler>>,
    opts: RuntimeOpts,
}

impl RuntimeBuilder {
    /// Defaults to [`ExpressionRegistry::with_builtins`].
    pub fn expressions(mut self, expressions: ExpressionRegistry) -> Self {
        self.expressions = Some(expressions);
        self
    }

    pub fn device(mut self, device: SharedDevice) -> Self {
        self.device = Some(device);
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to a private [`ManualScheduler`].
    pub fn scheduler(mut self, scheduler: Rc<dyn TickScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn opts(mut self, opts: RuntimeOpts) -> Self {
        self.opts = opts;
        self
    }

    /// Instantiate every node of `config`. An unknown type or a failing factory aborts the whole
    /// graph; nodes created so far are disposed.
    #[tracing::instrument(skip(self, config), fields(nodes = config.nodes.len()))]
    pub fn build(self, config: &GraphConfig) -> FxResult<GraphRuntime> {
        let mut rt = GraphRuntime {
            registry: self.registry,
            expressions: self
                .expressions
                .unwrap_or_else(ExpressionRegistry::with_builtins),
            factory_ctx: FactoryContext {
                device: self.device,
                opts: self.opts,
            },
            clock: self.clock.unwrap_or_else(|| Rc::new(SystemClock)),
            scheduler: self
                .scheduler
                .unwrap_or_else(|| Rc::new(ManualScheduler::new())),
            nodes: IndexMap::with_capacity(config.nodes.len()),
            handlers: Vec::new(),
            next_handler: 0,
            running: false,
            pending: None,
            tick_count: 0,
        };
        for (id, node) in &config.nodes {
            let record = rt.create_record(id, node)?;
            rt.nodes.insert(id.clone(), record);
        }
        tracing::info!(nodes = rt.nodes.len(), "graph initialized");
        Ok(rt)
    }
}

impl GraphRuntime {
    pub fn builder(registry: ModuleRegistry) -> RuntimeBuilder {
        RuntimeBuilder {
            registry,
            expressions: None,
            device: None,
            clock: None,
            scheduler: None,
            opts: RuntimeOpts::default(),
        }
    }

    /// [`GraphRuntime::builder`] with every default.
    pub fn new(config: &GraphConfig, registry: ModuleRegistry) -> FxResult<Self> {
        Self::builder(registry).build(config)
    }

    fn create_record(&self, id: &str, node: &NodeConfig) -> FxResult<NodeRecord> {
        let def = self.registry.resolve(&node.type_id)?;
        NodeRecord::create(id, node, def, &self.factory_ctx)
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn expressions(&self) -> &ExpressionRegistry {
        &self.expressions
    }

    pub fn opts(&self) -> RuntimeOpts {
        self.factory_ctx.opts
    }

    pub fn device(&self) -> Option<&SharedDevice> {
        self.factory_ctx.device.as_ref()
    }

    /// Nodes in tick order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.values()
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn output(&self, id: &str) -> Option<&Value> {
        self.nodes.get(id).map(NodeRecord::last_output)
    }

    /// `id → last output` for every node.
    pub fn outputs(&self) -> OutputSnapshot {
        self.nodes
            .iter()
            .map(|(id, r)| (id.clone(), r.last_output.clone()))
            .collect()
    }

    /// Current graph as a config, in tick order.
    pub fn config(&self) -> GraphConfig {
        GraphConfig {
            nodes: self
                .nodes
                .iter()
                .map(|(id, r)| (id.clone(), r.config.clone()))
                .collect(),
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    /// Ask the scheduler for the first tick. No-op when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        if self.pending.is_none() {
            self.pending = Some(self.scheduler.request_tick());
        }
        tracing::info!(tick = self.tick_count, "graph started");
    }

    /// Cancel the pending tick, if any. Never interrupts a tick; a tick already running completes.
    pub fn stop(&mut self) {
        let was_running = std::mem::replace(&mut self.running, false);
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_tick(handle);
        }
        if was_running {
            tracing::info!(tick = self.tick_count, "graph stopped");
        }
    }

    /// Run the pending tick, if there is one. Returns whether a tick ran.
    pub fn step(&mut self) -> bool {
        if self.pending.is_none() {
            return false;
        }
        self.tick();
        true
    }

    /// Run one tick now and return the nodes that failed.
    ///
    /// Inputs are evaluated against the outputs recorded at the end of the previous tick. A node
    /// whose evaluation or update fails keeps its previous output; the others are unaffected.
    /// Tick handlers run afterwards, in registration order, and the next tick is requested if the
    /// runtime is still running.
    #[tracing::instrument(level = "debug", skip(self), fields(tick = self.tick_count))]
    pub fn tick(&mut self) -> Vec<NodeFailure> {
        self.pending = None;
        let tick = self.tick_count;
        let snapshot = self.outputs();

        let evaluator = ConfigEvaluator::new(&self.expressions);
        let clock: &dyn Clock = &*self.clock;
        let eval_ctx = EvalContext {
            outputs: &snapshot,
            clock,
        };
        let update_ctx = UpdateContext { clock, tick };

        let mut failures = Vec::new();
        for (id, record) in self.nodes.iter_mut() {
            let Some(instance) = record.instance.as_mut() else {
                continue;
            };
            let path = ConfigPath::root().field(id.as_str()).field("input");
            let result = match evaluator.evaluate(
                &record.config.input,
                &record.definition.input,
                &eval_ctx,
                &path,
            ) {
                Ok(input) => {
                    record.state = NodeState::Evaluated;
                    instance
                        .update(&update_ctx, &input)
                        .map(|output| (input, output))
                }
                Err(e) => Err(e),
            };
            match result {
                Ok((input, output)) => {
                    record.last_input = input;
                    record.last_output = output;
                    record.state = NodeState::Updated;
                    record.last_error = None;
                }
                Err(e) => {
                    tracing::warn!(node = %id, tick, error = %e, "node tick failed");
                    let error = Rc::new(e);
                    record.last_error = Some(error.clone());
                    failures.push(NodeFailure {
                        node_id: id.clone(),
                        error,
                    });
                }
            }
        }
        self.tick_count += 1;

        let outputs = self.outputs();
        let mut report = TickReport {
            tick,
            outputs: &outputs,
            failures: &failures,
            stop_requested: false,
        };
        for (handler_id, handler) in self.handlers.iter_mut() {
            if let Err(e) = handler(&mut report) {
                tracing::warn!(handler = handler_id.0, tick, error = %e, "tick handler failed");
            }
        }
        if report.stop_requested {
            self.stop();
        }

        if self.running {
            self.pending = Some(self.scheduler.request_tick());
        }
        failures
    }

    /// Register a callback run after every tick. Returns the id to remove it with.
    pub fn add_tick_handler<F>(&mut self, handler: F) -> TickHandlerId
    where
        F: FnMut(&mut TickReport<'_>) -> FxResult<()> + 'static,
    {
        let id = TickHandlerId(self.next_handler);
        self.next_handler += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    pub fn remove_tick_handler(&mut self, id: TickHandlerId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(h, _)| *h != id);
        self.handlers.len() != before
    }

    /// Append a node. If its type is unknown or its factory fails the graph is left as it was.
    pub fn add_node(&mut self, id: impl Into<String>, node: NodeConfig) -> FxResult<()> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(FxError::graph_definition(format!("node '{id}' already exists")));
        }
        let record = self.create_record(&id, &node)?;
        self.nodes.insert(id, record);
        Ok(())
    }

    /// Dispose and remove a node. References to it start evaluating to `Null` next tick.
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.nodes.shift_remove(id).is_some()
    }

    /// Replace a node's input config after checking it against the node's input type.
    pub fn set_node_input(&mut self, id: &str, input: ConfigNode) -> FxResult<()> {
        let record = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| FxError::graph_definition(format!("unknown node '{id}'")))?;
        record
            .definition
            .input
            .check_config(&input, &ConfigPath::root().field(id).field("input"))?;
        record.config.input = input;
        Ok(())
    }

    /// Reconcile the running graph with `config`.
    ///
    /// Nodes whose id and type survive keep their instance and output and take the new input;
    /// new or retyped nodes are created; the rest are disposed. Tick order becomes the order of
    /// `config`. If a kept node's input does not fit its type or a new node fails to build, nothing
    /// changes.
    #[tracing::instrument(skip(self, config), fields(nodes = config.nodes.len()))]
    pub fn apply_config(&mut self, config: &GraphConfig) -> FxResult<()> {
        let mut fresh = IndexMap::new();
        for (id, node) in &config.nodes {
            match self.nodes.get(id) {
                Some(record) if record.config.type_id == node.type_id => {
                    let path = ConfigPath::root().field(id.as_str()).field("input");
                    record.definition.input.check_config(&node.input, &path)?;
                }
                _ => {
                    fresh.insert(id.clone(), self.create_record(id, node)?);
                }
            }
        }

        let mut previous = std::mem::take(&mut self.nodes);
        for (id, node) in &config.nodes {
            let record = match fresh.shift_remove(id) {
                Some(record) => record,
                None => match previous.shift_remove(id) {
                    Some(mut record) => {
                        record.config.input = node.input.clone();
                        record
                    }
                    None => continue,
                },
            };
            self.nodes.insert(id.clone(), record);
        }
        let disposed = previous.len();
        drop(previous);
        tracing::debug!(nodes = self.nodes.len(), disposed, "config applied");
        Ok(())
    }
}

impl Drop for GraphRuntime {
    fn drop(&mut self) {
        self.stop();
        for record in self.nodes.values_mut() {
            record.dispose();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/runtime.rs"]
mod tests;
