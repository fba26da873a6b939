use crate::config::expr::{EvalContext, Expression};
use crate::foundation::color::Color;
use crate::foundation::value::Value;
use crate::types::TypeTree;

pub(crate) fn all() -> Vec<Box<dyn Expression>> {
    vec![
        Box::new(ModuleOutput::new()),
        Box::new(StaticColor::new()),
        Box::new(Time::new()),
    ]
}

/// `moduleOutput {moduleId}`: another node's output from the previous tick.
///
/// Unknown ids evaluate to `Null`; wiring may dangle while the graph is being edited.
pub struct ModuleOutput {
    schema: TypeTree,
}

impl ModuleOutput {
    pub const KEY: &'static str = "moduleOutput";

    pub fn new() -> Self {
        Self {
            schema: TypeTree::record([("moduleId", TypeTree::text("").labeled("Module"))]),
        }
    }
}

impl Default for ModuleOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Expression for ModuleOutput {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn label(&self) -> &str {
        "Module output"
    }

    fn schema(&self) -> &TypeTree {
        &self.schema
    }

    fn eval(&self, ctx: &EvalContext<'_>, payload: &Value) -> anyhow::Result<Value> {
        let id = payload.get("moduleId").and_then(Value::as_str).unwrap_or_default();
        Ok(ctx.outputs.get(id).cloned().unwrap_or(Value::Null))
    }
}

/// `staticColor {hex}`. A malformed hex string is an error, not a silent default.
pub struct StaticColor {
    schema: TypeTree,
}

impl StaticColor {
    pub const KEY: &'static str = "staticColor";

    pub fn new() -> Self {
        Self {
            schema: TypeTree::record([("hex", TypeTree::text("#000000").labeled("Hex"))]),
        }
    }
}

impl Default for StaticColor {
    fn default() -> Self {
        Self::new()
    }
}

impl Expression for StaticColor {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn label(&self) -> &str {
        "Color"
    }

    fn schema(&self) -> &TypeTree {
        &self.schema
    }

    fn eval(&self, _ctx: &EvalContext<'_>, payload: &Value) -> anyhow::Result<Value> {
        let hex = payload.get("hex").and_then(Value::as_str).unwrap_or_default();
        let color =
            Color::from_hex(hex).map_err(|e| anyhow::anyhow!("malformed hex color: {e}"))?;
        Ok(Value::Color(color))
    }
}

/// `time {scaleSeconds}`: wall-clock seconds times a scale.
///
/// The clock is read on every evaluation, so two leaves in the same tick can see slightly
/// different times.
pub struct Time {
    schema: TypeTree,
}

impl Time {
    pub const KEY: &'static str = "time";

    pub fn new() -> Self {
        Self {
            schema: TypeTree::record([(
                "scaleSeconds",
                TypeTree::number(1.0).labeled("Scale"),
            )]),
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Expression for Time {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn label(&self) -> &str {
        "Time"
    }

    fn schema(&self) -> &TypeTree {
        &self.schema
    }

    fn eval(&self, ctx: &EvalContext<'_>, payload: &Value) -> anyhow::Result<Value> {
        let scale = payload.get("scaleSeconds").and_then(Value::as_f64).unwrap_or(1.0);
        Ok(Value::Number(ctx.clock.now_seconds() * scale))
    }
}
