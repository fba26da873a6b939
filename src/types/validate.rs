use std::sync::Arc;

use indexmap::IndexMap;

use crate::foundation::color::Color;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::path::ConfigPath;
use crate::foundation::value::Value;
use crate::types::tree::TypeTree;

/// Leaf validator: returns the (possibly coerced) value or a message.
pub type Validator = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

impl TypeTree {
    /// Check `value` against this tree, returning the coerced value.
    ///
    /// Records fill missing fields with their defaults but reject unknown ones. Failures name the
    /// offending location relative to `path`.
    pub fn validate(&self, value: &Value, path: &ConfigPath) -> FxResult<Value> {
        match self {
            Self::Scalar { leaf, .. } | Self::Enum { leaf, .. } | Self::Texture { leaf } => {
                (leaf.validator)(value).map_err(|msg| FxError::configuration(path, msg))
            }
            Self::Record { fields, .. } => {
                let Value::Record(map) = value else {
                    return Err(FxError::configuration(
                        path,
                        format!("expected record, found {}", value.kind_name()),
                    ));
                };
                if let Some(unknown) = map.keys().find(|k| !fields.iter().any(|(f, _)| f == *k)) {
                    return Err(FxError::configuration(
                        path,
                        format!("unknown field '{unknown}'"),
                    ));
                }
                let mut out = IndexMap::with_capacity(fields.len());
                for (name, ty) in fields {
                    let field_path = path.field(name.as_str());
                    let v = match map.get(name) {
                        Some(v) => ty.validate(v, &field_path)?,
                        None => ty.default_value(),
                    };
                    out.insert(name.clone(), v);
                }
                Ok(Value::Record(out))
            }
            Self::Tuple { items, .. } => {
                let Value::List(list) = value else {
                    return Err(FxError::configuration(
                        path,
                        format!("expected tuple, found {}", value.kind_name()),
                    ));
                };
                if list.len() != items.len() {
                    return Err(FxError::configuration(
                        path,
                        format!(
                            "expected tuple of {} items, found {}",
                            items.len(),
                            list.len()
                        ),
                    ));
                }
                items
                    .iter()
                    .zip(list)
                    .enumerate()
                    .map(|(i, (ty, v))| ty.validate(v, &path.index(i)))
                    .collect::<FxResult<Vec<_>>>()
                    .map(Value::List)
            }
            Self::Array { item, .. } => {
                let Value::List(list) = value else {
                    return Err(FxError::configuration(
                        path,
                        format!("expected array, found {}", value.kind_name()),
                    ));
                };
                list.iter()
                    .enumerate()
                    .map(|(i, v)| item.validate(v, &path.index(i)))
                    .collect::<FxResult<Vec<_>>>()
                    .map(Value::List)
            }
        }
    }
}

fn expected(what: &str, got: &Value) -> String {
    format!("expected {what}, found {}", got.kind_name())
}

pub fn number(min: Option<f64>, max: Option<f64>) -> Validator {
    Arc::new(move |v: &Value| {
        let Some(n) = v.as_f64() else {
            return Err(expected("number", v));
        };
        if !n.is_finite() {
            return Err("number must be finite".to_owned());
        }
        let n = min.map_or(n, |lo| n.max(lo));
        let n = max.map_or(n, |hi| n.min(hi));
        Ok(Value::Number(n))
    })
}

pub fn integer(min: Option<i64>, max: Option<i64>) -> Validator {
    Arc::new(move |v: &Value| {
        let Some(n) = v.as_f64() else {
            return Err(expected("integer", v));
        };
        if !n.is_finite() || n.fract() != 0.0 {
            return Err(format!("expected integer, found {n}"));
        }
        let n = min.map_or(n, |lo| n.max(lo as f64));
        let n = max.map_or(n, |hi| n.min(hi as f64));
        Ok(Value::Number(n))
    })
}

pub fn boolean() -> Validator {
    Arc::new(|v: &Value| match v {
        Value::Bool(_) => Ok(v.clone()),
        _ => Err(expected("boolean", v)),
    })
}

pub fn text() -> Validator {
    Arc::new(|v: &Value| match v {
        Value::String(_) => Ok(v.clone()),
        _ => Err(expected("string", v)),
    })
}

pub fn color() -> Validator {
    Arc::new(|v: &Value| match v {
        Value::Color(c) => Ok(Value::Color(c.clamped())),
        Value::String(s) => Color::from_hex(s).map(Value::Color),
        Value::List(items) => {
            let channels = items
                .iter()
                .map(|c| c.as_f64().ok_or_else(|| expected("number channel", c)))
                .collect::<Result<Vec<_>, _>>()?;
            Color::from_channels(&channels).map(|c| Value::Color(c.clamped()))
        }
        _ => Err(expected("color", v)),
    })
}

pub fn one_of(options: Vec<String>) -> Validator {
    Arc::new(move |v: &Value| {
        let Some(s) = v.as_str() else {
            return Err(expected("string option", v));
        };
        if options.iter().any(|o| o == s) {
            Ok(v.clone())
        } else {
            Err(format!("'{s}' is not one of [{}]", options.join(", ")))
        }
    })
}

/// Accepts a texture handle or `Null` (no texture bound).
pub fn texture() -> Validator {
    Arc::new(|v: &Value| match v {
        Value::Texture(_) | Value::Null => Ok(v.clone()),
        _ => Err(expected("texture", v)),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/types/validate.rs"]
mod tests;
