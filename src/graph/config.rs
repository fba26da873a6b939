use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ConfigNode;
use crate::foundation::error::FxResult;
use crate::foundation::path::ConfigPath;
use crate::module::ModuleRegistry;

/// One graph entry: a module type and the config of its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeConfig {
    #[serde(rename = "type")]
    pub type_id: String,
    pub input: ConfigNode,
}

/// `{ "nodes": { id: { "type": ..., "input": ... } } }`.
///
/// Node order is tick order and survives parsing from a string or a `serde_json::Value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphConfig {
    pub nodes: IndexMap<String, NodeConfig>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGraph {
    #[serde(default)]
    nodes: IndexMap<String, RawNode>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawNode {
    #[serde(rename = "type")]
    type_id: String,
    #[serde(default)]
    input: serde_json::Value,
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node (or replace one, keeping its position).
    pub fn with_node(mut self, id: impl Into<String>, node: NodeConfig) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn from_json_str(s: &str, registry: &ModuleRegistry) -> FxResult<Self> {
        let raw: RawGraph = serde_json::from_str(s)?;
        Self::from_raw(raw, registry)
    }

    pub fn from_json_value(json: &serde_json::Value, registry: &ModuleRegistry) -> FxResult<Self> {
        let raw = RawGraph::deserialize(json)?;
        Self::from_raw(raw, registry)
    }

    /// Entries are parsed against the input type registered for their `type`.
    fn from_raw(raw: RawGraph, registry: &ModuleRegistry) -> FxResult<Self> {
        let mut nodes = IndexMap::with_capacity(raw.nodes.len());
        for (id, entry) in raw.nodes {
            let def = registry.resolve(&entry.type_id)?;
            let path = ConfigPath::root()
                .field("nodes")
                .field(id.as_str())
                .field("input");
            let input = ConfigNode::from_json(&def.input, &entry.input, &path)?;
            def.input.check_config(&input, &path)?;
            nodes.insert(
                id,
                NodeConfig {
                    type_id: entry.type_id,
                    input,
                },
            );
        }
        Ok(Self { nodes })
    }

    pub fn to_json_value(&self) -> FxResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string_pretty(&self) -> FxResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/config.rs"]
mod tests;
