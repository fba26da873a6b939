//! Self-describing value shapes: defaults, validation and the schema editors render from.

pub mod tree;
pub mod validate;

pub use tree::{CompositeKind, Leaf, LeafKind, Meta, ScalarKind, TypeTree};
pub use validate::Validator;
