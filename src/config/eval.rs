use crate::config::expr::{EvalContext, ExpressionRegistry};
use crate::config::node::{ConfigNode, LeafConfig};
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::path::ConfigPath;
use crate::foundation::value::Value;
use crate::types::TypeTree;

/// Resolves config nodes into concrete values for one tick.
///
/// Missing literals, missing children and `Null` expression results all fall back to the type
/// default; only unknown expression keys, failing expressions and values rejected by a validator
/// are errors.
#[derive(Debug, Clone, Copy)]
pub struct ConfigEvaluator<'r> {
    expressions: &'r ExpressionRegistry,
}

impl<'r> ConfigEvaluator<'r> {
    pub fn new(expressions: &'r ExpressionRegistry) -> Self {
        Self { expressions }
    }

    pub fn evaluate(
        &self,
        node: &ConfigNode,
        tree: &TypeTree,
        ctx: &EvalContext<'_>,
        path: &ConfigPath,
    ) -> FxResult<Value> {
        match (tree, node) {
            (_, ConfigNode::Leaf(leaf)) => self.evaluate_leaf(leaf, tree, ctx, path),

            (TypeTree::Record { fields, .. }, ConfigNode::Record(children)) => {
                if let Some(unknown) = children
                    .keys()
                    .find(|k| !fields.iter().any(|(name, _)| name == *k))
                {
                    return Err(FxError::configuration(
                        &path.field(unknown.as_str()),
                        "unknown field",
                    ));
                }
                let mut out = indexmap::IndexMap::with_capacity(fields.len());
                for (name, field_tree) in fields {
                    let v = match children.get(name) {
                        Some(child) => {
                            self.evaluate(child, field_tree, ctx, &path.field(name.as_str()))?
                        }
                        None => field_tree.default_value(),
                    };
                    out.insert(name.clone(), v);
                }
                Ok(Value::Record(out))
            }

            (TypeTree::Tuple { items, .. }, ConfigNode::List(children)) => {
                if children.len() > items.len() {
                    return Err(FxError::configuration(
                        path,
                        format!("tuple has {} items, found {}", items.len(), children.len()),
                    ));
                }
                items
                    .iter()
                    .enumerate()
                    .map(|(i, t)| match children.get(i) {
                        Some(child) => self.evaluate(child, t, ctx, &path.index(i)),
                        None => Ok(t.default_value()),
                    })
                    .collect::<FxResult<Vec<_>>>()
                    .map(Value::List)
            }

            (TypeTree::Array { item, .. }, ConfigNode::List(children)) => children
                .iter()
                .enumerate()
                .map(|(i, child)| self.evaluate(child, item, ctx, &path.index(i)))
                .collect::<FxResult<Vec<_>>>()
                .map(Value::List),

            (_, ConfigNode::Record(_) | ConfigNode::List(_)) => Err(FxError::configuration(
                path,
                format!("config shape does not match {} type", tree.kind_name()),
            )),
        }
    }

    fn evaluate_leaf(
        &self,
        leaf: &LeafConfig,
        tree: &TypeTree,
        ctx: &EvalContext<'_>,
        path: &ConfigPath,
    ) -> FxResult<Value> {
        let Some(key) = leaf.active_expr.as_deref() else {
            return match &leaf.value {
                Some(v) => tree.validate(v, path),
                None => Ok(tree.default_value()),
            };
        };

        let expr = self.expressions.get(key).ok_or_else(|| {
            FxError::configuration(path, format!("unknown expression '{key}'"))
        })?;
        let payload = match leaf.exprs.get(key) {
            Some(p) if !p.is_null() => expr.schema().validate(p, path)?,
            _ => expr.schema().default_value(),
        };
        let result = expr
            .eval(ctx, &payload)
            .map_err(|e| FxError::configuration(path, format!("{key}: {e:#}")))?;

        if result.is_null() {
            Ok(tree.default_value())
        } else {
            tree.validate(&result, path)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/eval.rs"]
mod tests;
