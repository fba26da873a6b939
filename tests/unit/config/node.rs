use serde_json::json;

use super::*;
use crate::foundation::color::Color;

fn panel_input() -> TypeTree {
    TypeTree::record([
        ("intensity", TypeTree::number_in(1.0, 0.0, 1.0)),
        ("rows", TypeTree::integer_in(8, 1, 256)),
        ("color", TypeTree::color(Color::WHITE)),
    ])
}

#[test]
fn parses_persisted_form_against_the_type() {
    let json = json!({
        "value": {
            "intensity": {
                "activeExpr": "moduleOutput",
                "exprs": {
                    "moduleOutput": {"moduleId": "lfo"},
                    "time": {"scaleSeconds": 0.5}
                }
            },
            "rows": {"value": 4}
        }
    });
    let node = ConfigNode::from_json(&panel_input(), &json, &ConfigPath::root()).unwrap();

    let intensity = node.field("intensity").and_then(ConfigNode::as_leaf).unwrap();
    assert_eq!(intensity.active_expr.as_deref(), Some("moduleOutput"));
    assert_eq!(intensity.exprs.len(), 2);
    assert_eq!(
        node.field("rows").and_then(ConfigNode::as_leaf).unwrap().value,
        Some(Value::Number(4.0))
    );
    assert!(node.field("color").is_none());
}

#[test]
fn unknown_field_is_reported_with_its_path() {
    let json = json!({"value": {"rowz": {"value": 4}}});
    let err = ConfigNode::from_json(&panel_input(), &json, &ConfigPath::root().field("input"))
        .unwrap_err();
    assert_eq!(err.to_string(), "configuration error at $.input.rowz: unknown field");
}

#[test]
fn composite_with_scalar_value_is_rejected() {
    let err = ConfigNode::from_json(&panel_input(), &json!({"value": 3}), &ConfigPath::root())
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("record config expects child nodes"), "{err}");
}

#[test]
fn null_and_empty_objects_are_unset_leaves() {
    let root = ConfigPath::root();
    let t = TypeTree::number(1.0);
    assert_eq!(ConfigNode::from_json(&t, &json!(null), &root).unwrap(), ConfigNode::empty());
    assert_eq!(ConfigNode::from_json(&t, &json!({}), &root).unwrap(), ConfigNode::empty());
    assert!(ConfigNode::from_json(&t, &json!({"valu": 1}), &root).is_err());
}

#[test]
fn json_round_trip_keeps_inactive_payloads() {
    let mut node = ConfigNode::literal(0.25);
    node.set_expr_payload("time", Value::record([("scaleSeconds", Value::Number(2.0))]))
        .unwrap();
    let json = node.to_json();
    assert_eq!(json, json!({"value": 0.25, "exprs": {"time": {"scaleSeconds": 2.0}}}));

    let back = ConfigNode::from_json(&TypeTree::number(0.0), &json, &ConfigPath::root()).unwrap();
    assert_eq!(back, node);
}

#[test]
fn check_config_validates_literals_and_shape() {
    let t = panel_input();
    let root = ConfigPath::root().field("input");
    let ok = ConfigNode::record([("rows", ConfigNode::literal(4.0))]);
    assert!(t.check_config(&ok, &root).is_ok());

    let bad = ConfigNode::record([("rows", ConfigNode::literal("four"))]);
    let err = t.check_config(&bad, &root).unwrap_err();
    assert!(err.to_string().starts_with("configuration error at $.input.rows:"), "{err}");

    let wrong_shape = ConfigNode::list([ConfigNode::empty()]);
    assert!(t.check_config(&wrong_shape, &root).is_err());
    assert!(t.check_config(&ConfigNode::empty(), &root).is_ok());
}

#[test]
fn set_field_promotes_an_unset_leaf() {
    let mut node = ConfigNode::empty();
    node.set_field("rows", ConfigNode::literal(2.0)).unwrap();
    assert!(node.field("rows").is_some());
    assert!(ConfigNode::literal(1.0).set_field("x", ConfigNode::empty()).is_err());
}
