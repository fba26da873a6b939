use indexmap::IndexMap;

use crate::foundation::error::{FxError, FxResult};
use crate::foundation::path::ConfigPath;
use crate::foundation::time::Clock;
use crate::foundation::value::Value;
use crate::types::TypeTree;

/// `node id → last recorded output`, as of the end of the previous tick.
pub type OutputSnapshot = IndexMap<String, Value>;

/// What an expression may look at while evaluating.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub outputs: &'a OutputSnapshot,
    pub clock: &'a dyn Clock,
}

/// A named way of computing a leaf value.
///
/// The payload handed to [`Expression::eval`] has already been validated against
/// [`Expression::schema`] (or is that schema's default when the config stored none).
pub trait Expression {
    fn key(&self) -> &str;

    fn label(&self) -> &str {
        self.key()
    }

    fn schema(&self) -> &TypeTree;

    fn eval(&self, ctx: &EvalContext<'_>, payload: &Value) -> anyhow::Result<Value>;
}

/// Expressions by key, in registration order.
#[derive(Default)]
pub struct ExpressionRegistry {
    entries: IndexMap<String, Box<dyn Expression>>,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `moduleOutput`, `staticColor` and `time`.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        for expr in crate::config::builtins::all() {
            reg.insert(expr);
        }
        reg
    }

    /// Add an expression. Keys are unique.
    pub fn register(&mut self, expr: impl Expression + 'static) -> FxResult<()> {
        if self.entries.contains_key(expr.key()) {
            return Err(FxError::configuration(
                &ConfigPath::root(),
                format!("expression '{}' is already registered", expr.key()),
            ));
        }
        self.insert(Box::new(expr));
        Ok(())
    }

    fn insert(&mut self, expr: Box<dyn Expression>) {
        self.entries.insert(expr.key().to_owned(), expr);
    }

    pub fn get(&self, key: &str) -> Option<&dyn Expression> {
        self.entries.get(key).map(|e| e.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Expression> {
        self.entries.values().map(|e| e.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ExpressionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
