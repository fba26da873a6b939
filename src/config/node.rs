use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::foundation::error::{FxError, FxResult};
use crate::foundation::path::ConfigPath;
use crate::foundation::value::Value;
use crate::types::TypeTree;

/// How to obtain one value: a literal, an expression, or nothing (the type default).
///
/// Every expression payload the editor ever entered is kept in `exprs`; switching `active_expr`
/// never drops them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeafConfig {
    pub value: Option<Value>,
    pub active_expr: Option<String>,
    pub exprs: BTreeMap<String, Value>,
}

impl LeafConfig {
    /// No literal and no active expression.
    pub fn is_unset(&self) -> bool {
        self.value.is_none() && self.active_expr.is_none()
    }
}

/// Editable tree mirroring a [`TypeTree`].
///
/// Persisted as `{"value": ..., "activeExpr": "...", "exprs": {...}}` at leaves and
/// `{"value": {field: node}}` / `{"value": [node, ...]}` at records and lists. The runtime only
/// reads it.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Leaf(LeafConfig),
    Record(IndexMap<String, ConfigNode>),
    List(Vec<ConfigNode>),
}

impl Default for ConfigNode {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigNode {
    /// Evaluates to the type default.
    pub fn empty() -> Self {
        Self::Leaf(LeafConfig::default())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Leaf(LeafConfig {
            value: Some(value.into()),
            ..LeafConfig::default()
        })
    }

    /// Leaf with `key` active and its payload set.
    pub fn expr(key: impl Into<String>, payload: Value) -> Self {
        let key = key.into();
        let mut leaf = LeafConfig {
            active_expr: Some(key.clone()),
            ..LeafConfig::default()
        };
        leaf.exprs.insert(key, payload);
        Self::Leaf(leaf)
    }

    /// Shorthand for a `moduleOutput` reference.
    pub fn module_output(module_id: &str) -> Self {
        Self::expr("moduleOutput", Value::record([("moduleId", Value::from(module_id))]))
    }

    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigNode)>,
    {
        Self::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list(items: impl IntoIterator<Item = ConfigNode>) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn as_leaf(&self) -> Option<&LeafConfig> {
        match self {
            Self::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut LeafConfig> {
        match self {
            Self::Leaf(l) => Some(l),
            _ => None,
        }
    }

    /// Child of a record node.
    pub fn field(&self, name: &str) -> Option<&ConfigNode> {
        match self {
            Self::Record(m) => m.get(name),
            _ => None,
        }
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut ConfigNode> {
        match self {
            Self::Record(m) => m.get_mut(name),
            _ => None,
        }
    }

    /// Insert or replace a record child. Turns an unset leaf into an empty record first.
    pub fn set_field(&mut self, name: impl Into<String>, node: ConfigNode) -> FxResult<()> {
        if matches!(self, Self::Leaf(l) if l.is_unset()) {
            *self = Self::Record(IndexMap::new());
        }
        match self {
            Self::Record(m) => {
                m.insert(name.into(), node);
                Ok(())
            }
            _ => Err(FxError::configuration(
                &ConfigPath::root(),
                "cannot set a field on a non-record config node",
            )),
        }
    }

    /// Select the active expression, or `None` for the literal. Payloads are untouched.
    pub fn set_active_expr(&mut self, key: Option<&str>) -> FxResult<()> {
        let leaf = self.leaf_or_err()?;
        leaf.active_expr = key.map(str::to_owned);
        Ok(())
    }

    /// Store the payload for `key` without activating it.
    pub fn set_expr_payload(&mut self, key: impl Into<String>, payload: Value) -> FxResult<()> {
        let leaf = self.leaf_or_err()?;
        leaf.exprs.insert(key.into(), payload);
        Ok(())
    }

    pub fn set_literal(&mut self, value: Option<Value>) -> FxResult<()> {
        let leaf = self.leaf_or_err()?;
        leaf.value = value;
        Ok(())
    }

    fn leaf_or_err(&mut self) -> FxResult<&mut LeafConfig> {
        self.as_leaf_mut().ok_or_else(|| {
            FxError::configuration(&ConfigPath::root(), "expected a leaf config node")
        })
    }

    /// Parse the persisted form against `tree`. Record children are matched to the tree's fields,
    /// so unknown fields and over-long tuples are rejected here; missing children stay missing and
    /// evaluate to their default.
    pub fn from_json(tree: &TypeTree, json: &serde_json::Value, path: &ConfigPath) -> FxResult<Self> {
        let obj = match json {
            serde_json::Value::Null => return Ok(Self::empty()),
            serde_json::Value::Object(obj) => obj,
            other => {
                return Err(FxError::configuration(
                    path,
                    format!("expected a config node object, found {}", json_kind(other)),
                ));
            }
        };
        if let Some(key) = obj
            .keys()
            .find(|k| !matches!(k.as_str(), "value" | "activeExpr" | "exprs"))
        {
            return Err(FxError::configuration(
                path,
                format!("unexpected key '{key}' in config node"),
            ));
        }

        let value = obj.get("value").filter(|v| !v.is_null());
        match (tree, value) {
            (TypeTree::Record { fields, .. }, Some(serde_json::Value::Object(children))) => {
                let mut out = IndexMap::new();
                for (name, child) in children {
                    let child_path = path.field(name.as_str());
                    let Some(field_tree) = fields.iter().find(|(k, _)| k == name).map(|(_, t)| t)
                    else {
                        return Err(FxError::configuration(&child_path, "unknown field"));
                    };
                    out.insert(name.clone(), Self::from_json(field_tree, child, &child_path)?);
                }
                Ok(Self::Record(out))
            }
            (TypeTree::Tuple { items, .. }, Some(serde_json::Value::Array(children))) => {
                if children.len() > items.len() {
                    return Err(FxError::configuration(
                        path,
                        format!("tuple has {} items, found {}", items.len(), children.len()),
                    ));
                }
                children
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (child, t))| Self::from_json(t, child, &path.index(i)))
                    .collect::<FxResult<Vec<_>>>()
                    .map(Self::List)
            }
            (TypeTree::Array { item, .. }, Some(serde_json::Value::Array(children))) => children
                .iter()
                .enumerate()
                .map(|(i, child)| Self::from_json(item, child, &path.index(i)))
                .collect::<FxResult<Vec<_>>>()
                .map(Self::List),
            (TypeTree::Record { .. } | TypeTree::Tuple { .. } | TypeTree::Array { .. }, Some(v)) => {
                Err(FxError::configuration(
                    path,
                    format!(
                        "{} config expects child nodes, found {}",
                        tree.kind_name(),
                        json_kind(v)
                    ),
                ))
            }
            _ => Ok(Self::Leaf(parse_leaf(obj, value, path)?)),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Leaf(leaf) => {
                let mut obj = serde_json::Map::new();
                if let Some(v) = &leaf.value {
                    obj.insert("value".into(), v.to_json());
                }
                if let Some(key) = &leaf.active_expr {
                    obj.insert("activeExpr".into(), serde_json::Value::String(key.clone()));
                }
                if !leaf.exprs.is_empty() {
                    let exprs = leaf
                        .exprs
                        .iter()
                        .map(|(k, v)| (k.clone(), v.to_json()))
                        .collect();
                    obj.insert("exprs".into(), serde_json::Value::Object(exprs));
                }
                serde_json::Value::Object(obj)
            }
            Self::Record(children) => serde_json::json!({
                "value": children
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<serde_json::Map<_, _>>(),
            }),
            Self::List(items) => serde_json::json!({
                "value": items.iter().map(Self::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

fn parse_leaf(
    obj: &serde_json::Map<String, serde_json::Value>,
    value: Option<&serde_json::Value>,
    path: &ConfigPath,
) -> FxResult<LeafConfig> {
    let active_expr = match obj.get("activeExpr") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(FxError::configuration(
                path,
                format!("activeExpr must be a string, found {}", json_kind(other)),
            ));
        }
    };
    let exprs = match obj.get("exprs") {
        None | Some(serde_json::Value::Null) => BTreeMap::new(),
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect(),
        Some(other) => {
            return Err(FxError::configuration(
                path,
                format!("exprs must be an object, found {}", json_kind(other)),
            ));
        }
    };
    Ok(LeafConfig {
        value: value.map(Value::from_json),
        active_expr,
        exprs,
    })
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

impl Serialize for ConfigNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl TypeTree {
    /// Structural check of a config node against this type: shapes must line up and literals
    /// must pass their validator. Expressions are not evaluated.
    pub fn check_config(&self, node: &ConfigNode, path: &ConfigPath) -> FxResult<()> {
        match (self, node) {
            (_, ConfigNode::Leaf(leaf)) => match &leaf.value {
                Some(v) => self.validate(v, path).map(drop),
                None => Ok(()),
            },
            (Self::Record { fields, .. }, ConfigNode::Record(children)) => {
                for (name, child) in children {
                    let child_path = path.field(name.as_str());
                    let field = fields
                        .iter()
                        .find(|(k, _)| k == name)
                        .map(|(_, t)| t)
                        .ok_or_else(|| FxError::configuration(&child_path, "unknown field"))?;
                    field.check_config(child, &child_path)?;
                }
                Ok(())
            }
            (Self::Tuple { items, .. }, ConfigNode::List(children)) => {
                if children.len() > items.len() {
                    return Err(FxError::configuration(
                        path,
                        format!("tuple has {} items, found {}", items.len(), children.len()),
                    ));
                }
                for (i, (t, child)) in items.iter().zip(children).enumerate() {
                    t.check_config(child, &path.index(i))?;
                }
                Ok(())
            }
            (Self::Array { item, .. }, ConfigNode::List(children)) => {
                for (i, child) in children.iter().enumerate() {
                    item.check_config(child, &path.index(i))?;
                }
                Ok(())
            }
            (_, ConfigNode::Record(_) | ConfigNode::List(_)) => Err(FxError::configuration(
                path,
                format!("config shape does not match {} type", self.kind_name()),
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/node.rs"]
mod tests;
