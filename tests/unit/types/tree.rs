use super::*;
use crate::foundation::color::Color;
use crate::foundation::path::ConfigPath;

fn oscillator_input() -> TypeTree {
    TypeTree::record([
        ("period", TypeTree::number_in(1.0, 0.001, 3600.0)),
        ("min", TypeTree::number(0.0)),
        ("max", TypeTree::number(1.0)),
        ("easing", TypeTree::enumeration(["linear", "sine"], "linear")),
    ])
}

#[test]
fn record_default_is_derived_from_fields() {
    let d = oscillator_input().default_value();
    assert_eq!(d.get("period"), Some(&Value::Number(1.0)));
    assert_eq!(d.get("max"), Some(&Value::Number(1.0)));
    assert_eq!(d.get("easing"), Some(&Value::from("linear")));
    let keys: Vec<_> = d.as_record().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["period", "min", "max", "easing"]);
}

#[test]
fn array_default_clones_item_default_per_slot() {
    let stops = TypeTree::array(
        TypeTree::tuple([TypeTree::number(0.5), TypeTree::color(Color::WHITE)]),
        3,
    );
    let d = stops.default_value();
    let list = d.as_list().unwrap();
    assert_eq!(list.len(), 3);
    for slot in list {
        assert_eq!(
            slot,
            &Value::List(vec![Value::Number(0.5), Value::Color(Color::WHITE)])
        );
    }
}

#[test]
fn enum_default_outside_options_falls_back_to_first() {
    let t = TypeTree::enumeration(["a", "b"], "zzz");
    assert_eq!(t.default_value(), Value::from("a"));
}

#[test]
fn range_clamps_the_declared_default() {
    assert_eq!(TypeTree::number_in(10.0, 0.0, 1.0).default_value(), Value::Number(1.0));
    assert_eq!(TypeTree::integer_in(-4, 1, 8).default_value(), Value::Number(1.0));
}

#[test]
fn texture_defaults_to_null() {
    assert!(TypeTree::texture().default_value().is_null());
    assert_eq!(TypeTree::texture().kind_name(), "texture");
}

#[test]
fn metadata_is_attached_to_leaves_and_composites() {
    let t = TypeTree::number(1.0).labeled("Period").described("seconds per cycle");
    assert_eq!(t.meta().label.as_deref(), Some("Period"));
    assert_eq!(t.meta().description.as_deref(), Some("seconds per cycle"));

    let r = oscillator_input().labeled("Oscillator");
    assert_eq!(r.meta().label.as_deref(), Some("Oscillator"));
    assert!(r.field("min").is_some());
    assert!(r.field("nope").is_none());
}

#[test]
fn custom_leaf_uses_supplied_validator() {
    let even = TypeTree::leaf(
        LeafKind::Scalar(ScalarKind::Custom("even".into())),
        Value::Number(2.0),
        std::sync::Arc::new(|v: &Value| match v.as_f64() {
            Some(n) if n % 2.0 == 0.0 => Ok(v.clone()),
            _ => Err("must be even".to_owned()),
        }),
    );
    let path = ConfigPath::root();
    assert!(even.validate(&Value::Number(4.0), &path).is_ok());
    assert!(even.validate(&Value::Number(3.0), &path).is_err());

    let replaced = TypeTree::number(0.0).with_validator(|_| Err("never".into()));
    assert!(replaced.validate(&Value::Number(0.0), &path).is_err());
}

#[test]
fn swapped_bounds_are_reordered_instead_of_panicking() {
    let n = TypeTree::number_in(5.0, 1.0, 0.0);
    assert_eq!(n.default_value(), Value::Number(1.0));
    let clamped = n.validate(&Value::Number(-3.0), &ConfigPath::root()).unwrap();
    assert_eq!(clamped, Value::Number(0.0));

    let i = TypeTree::integer_in(-4, 10, 2);
    assert_eq!(i.default_value(), Value::Number(2.0));
    let clamped = i.validate(&Value::Number(40.0), &ConfigPath::root()).unwrap();
    assert_eq!(clamped, Value::Number(10.0));
}
