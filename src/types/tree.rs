use std::fmt;
use std::sync::Arc;

use crate::foundation::value::Value;
use crate::types::validate::{self, Validator};

/// Editor-facing metadata. The runtime never reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub label: Option<String>,
    pub description: Option<String>,
}

/// Scalar flavours with a built-in validator.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    /// Finite float, clamped into `[min, max]` when bounds are set.
    Number { min: Option<f64>, max: Option<f64> },
    /// Whole number, clamped into `[min, max]` when bounds are set.
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Text,
    /// Normalized RGBA; accepts colors, `[r,g,b(,a)]` lists and hex strings.
    Color,
    /// Arbitrary value checked only by a caller-supplied validator.
    Custom(String),
}

/// Leaf tags accepted by [`TypeTree::leaf`].
#[derive(Debug, Clone, PartialEq)]
pub enum LeafKind {
    Scalar(ScalarKind),
    Enum(Vec<String>),
    Texture,
}

/// Composite tags accepted by [`TypeTree::composite`].
#[derive(Debug, Clone)]
pub enum CompositeKind {
    Record(Vec<(String, TypeTree)>),
    Tuple(Vec<TypeTree>),
    Array { item: Box<TypeTree>, default_len: usize },
}

/// Payload shared by every leaf node.
#[derive(Clone)]
pub struct Leaf {
    pub default: Value,
    pub validator: Validator,
    pub meta: Meta,
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("default", &self.default)
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}

/// Recursive description of a value's shape, default and validation rules.
///
/// Trees are built once when a module or expression is registered and never mutated afterwards.
/// Composite defaults are derived from their children, so only leaves carry explicit defaults.
#[derive(Debug, Clone)]
pub enum TypeTree {
    Scalar {
        kind: ScalarKind,
        leaf: Leaf,
    },
    Enum {
        options: Vec<String>,
        leaf: Leaf,
    },
    Record {
        fields: Vec<(String, TypeTree)>,
        meta: Meta,
    },
    Tuple {
        items: Vec<TypeTree>,
        meta: Meta,
    },
    Array {
        item: Box<TypeTree>,
        default_len: usize,
        meta: Meta,
    },
    Texture {
        leaf: Leaf,
    },
}

impl TypeTree {
    /// Generic leaf constructor with an explicit default and validator.
    pub fn leaf(kind: LeafKind, default: Value, validate: Validator) -> Self {
        let leaf = Leaf {
            default,
            validator: validate,
            meta: Meta::default(),
        };
        match kind {
            LeafKind::Scalar(kind) => Self::Scalar { kind, leaf },
            LeafKind::Enum(options) => Self::Enum { options, leaf },
            LeafKind::Texture => Self::Texture { leaf },
        }
    }

    /// Generic composite constructor; children carry their own defaults.
    pub fn composite(kind: CompositeKind) -> Self {
        let meta = Meta::default();
        match kind {
            CompositeKind::Record(fields) => Self::Record { fields, meta },
            CompositeKind::Tuple(items) => Self::Tuple { items, meta },
            CompositeKind::Array { item, default_len } => Self::Array {
                item,
                default_len,
                meta,
            },
        }
    }

    pub fn number(default: f64) -> Self {
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Number {
                min: None,
                max: None,
            }),
            Value::Number(default),
            validate::number(None, None),
        )
    }

    /// Number clamped into `[min, max]`. The default is clamped too; swapped bounds are reordered.
    pub fn number_in(default: f64, min: f64, max: f64) -> Self {
        let (min, max) = (min.min(max), min.max(max));
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Number {
                min: Some(min),
                max: Some(max),
            }),
            Value::Number(default.max(min).min(max)),
            validate::number(Some(min), Some(max)),
        )
    }

    pub fn integer(default: i64) -> Self {
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Integer {
                min: None,
                max: None,
            }),
            Value::Number(default as f64),
            validate::integer(None, None),
        )
    }

    /// Integer clamped into `[min, max]`; swapped bounds are reordered.
    pub fn integer_in(default: i64, min: i64, max: i64) -> Self {
        let (min, max) = (min.min(max), min.max(max));
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Integer {
                min: Some(min),
                max: Some(max),
            }),
            Value::Number(default.clamp(min, max) as f64),
            validate::integer(Some(min), Some(max)),
        )
    }

    pub fn boolean(default: bool) -> Self {
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Boolean),
            Value::Bool(default),
            validate::boolean(),
        )
    }

    pub fn text(default: impl Into<String>) -> Self {
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Text),
            Value::String(default.into()),
            validate::text(),
        )
    }

    pub fn color(default: crate::foundation::color::Color) -> Self {
        Self::leaf(
            LeafKind::Scalar(ScalarKind::Color),
            Value::Color(default),
            validate::color(),
        )
    }

    /// Enumeration over string options. A `default` outside `options` selects the first option.
    pub fn enumeration<I, S>(options: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let default = if options.iter().any(|o| o == default) {
            default.to_owned()
        } else {
            options.first().cloned().unwrap_or_default()
        };
        let validator = validate::one_of(options.clone());
        Self::leaf(LeafKind::Enum(options), Value::String(default), validator)
    }

    /// Texture slot; defaults to "no texture".
    pub fn texture() -> Self {
        Self::leaf(LeafKind::Texture, Value::Null, validate::texture())
    }

    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypeTree)>,
    {
        Self::composite(CompositeKind::Record(
            fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        ))
    }

    pub fn tuple(items: impl IntoIterator<Item = TypeTree>) -> Self {
        Self::composite(CompositeKind::Tuple(items.into_iter().collect()))
    }

    pub fn array(item: TypeTree, default_len: usize) -> Self {
        Self::composite(CompositeKind::Array {
            item: Box::new(item),
            default_len,
        })
    }

    /// Replace this leaf's validator. Composites are returned unchanged.
    pub fn with_validator(
        mut self,
        f: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        if let Some(leaf) = self.leaf_mut() {
            leaf.validator = Arc::new(f);
        }
        self
    }

    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.meta_mut().label = Some(label.into());
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.meta_mut().description = Some(description.into());
        self
    }

    pub fn meta(&self) -> &Meta {
        match self {
            Self::Scalar { leaf, .. } | Self::Enum { leaf, .. } | Self::Texture { leaf } => {
                &leaf.meta
            }
            Self::Record { meta, .. } | Self::Tuple { meta, .. } | Self::Array { meta, .. } => {
                meta
            }
        }
    }

    fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Self::Scalar { leaf, .. } | Self::Enum { leaf, .. } | Self::Texture { leaf } => {
                &mut leaf.meta
            }
            Self::Record { meta, .. } | Self::Tuple { meta, .. } | Self::Array { meta, .. } => {
                meta
            }
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Scalar { leaf, .. } | Self::Enum { leaf, .. } | Self::Texture { leaf } => {
                Some(leaf)
            }
            Self::Record { .. } | Self::Tuple { .. } | Self::Array { .. } => None,
        }
    }

    fn leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Self::Scalar { leaf, .. } | Self::Enum { leaf, .. } | Self::Texture { leaf } => {
                Some(leaf)
            }
            Self::Record { .. } | Self::Tuple { .. } | Self::Array { .. } => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.as_leaf().is_some()
    }

    /// Field type of a record node.
    pub fn field(&self, name: &str) -> Option<&TypeTree> {
        match self {
            Self::Record { fields, .. } => fields.iter().find(|(k, _)| k == name).map(|(_, t)| t),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar { .. } => "scalar",
            Self::Enum { .. } => "enum",
            Self::Record { .. } => "record",
            Self::Tuple { .. } => "tuple",
            Self::Array { .. } => "array",
            Self::Texture { .. } => "texture",
        }
    }

    /// Default value, derived recursively for composites.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Scalar { leaf, .. } | Self::Enum { leaf, .. } | Self::Texture { leaf } => {
                leaf.default.clone()
            }
            Self::Record { fields, .. } => Value::Record(
                fields
                    .iter()
                    .map(|(k, t)| (k.clone(), t.default_value()))
                    .collect(),
            ),
            Self::Tuple { items, .. } => {
                Value::List(items.iter().map(TypeTree::default_value).collect())
            }
            Self::Array {
                item, default_len, ..
            } => {
                let slot = item.default_value();
                Value::List(vec![slot; *default_len])
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/types/tree.rs"]
mod tests;
