use serde_json::json;

use super::*;
use crate::foundation::error::FxError;
use crate::foundation::value::Value;
use crate::module::{ModuleInstance, ModuleSpec, UpdateContext, define_module};
use crate::types::TypeTree;

struct Noop;

impl ModuleInstance for Noop {
    fn update(&mut self, _ctx: &UpdateContext<'_>, _input: &Value) -> FxResult<Value> {
        Ok(Value::Null)
    }
}

fn registry() -> ModuleRegistry {
    let mut reg = ModuleRegistry::new();
    for type_id in ["a", "b"] {
        reg.register(define_module(
            type_id,
            ModuleSpec {
                label: type_id.to_uppercase(),
                input: TypeTree::record([("x", TypeTree::number(0.0))]),
                output: TypeTree::number(0.0),
            },
            |_ctx| Ok(Box::new(Noop) as Box<dyn ModuleInstance>),
        ))
        .unwrap();
    }
    reg
}

#[test]
fn string_parsing_keeps_node_order() {
    let src = r#"{"nodes": {
        "zeta": {"type": "a", "input": {"value": {"x": {"value": 1}}}},
        "alpha": {"type": "b"},
        "mid": {"type": "a", "input": null}
    }}"#;
    let cfg = GraphConfig::from_json_str(src, &registry()).unwrap();
    assert_eq!(cfg.nodes.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    assert_eq!(cfg.nodes["alpha"].type_id, "b");
}

#[test]
fn value_parsing_keeps_node_order() {
    let json = json!({"nodes": {
        "zeta": {"type": "a"},
        "alpha": {"type": "b"},
        "mid": {"type": "a"}
    }});
    let cfg = GraphConfig::from_json_value(&json, &registry()).unwrap();
    assert_eq!(cfg.nodes.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
    let saved = cfg.to_json_value().unwrap();
    let saved_ids: Vec<_> = saved["nodes"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(saved_ids, ["zeta", "alpha", "mid"]);
}

#[test]
fn unknown_type_is_a_graph_definition_error() {
    let err = GraphConfig::from_json_value(
        &json!({"nodes": {"n": {"type": "missing", "input": {}}}}),
        &registry(),
    )
    .unwrap_err();
    assert!(matches!(err, FxError::GraphDefinition(_)), "{err}");
}

#[test]
fn input_errors_name_the_node() {
    let err = GraphConfig::from_json_value(
        &json!({"nodes": {"n": {"type": "a", "input": {"value": {"x": {"value": "no"}}}}}}),
        &registry(),
    )
    .unwrap_err();
    assert!(
        err.to_string().starts_with("configuration error at $.nodes.n.input.x:"),
        "{err}"
    );
}

#[test]
fn malformed_documents_are_serde_errors() {
    let err = GraphConfig::from_json_str("{\"nodes\": [", &registry()).unwrap_err();
    assert!(matches!(err, FxError::Serde(_)));
    let err = GraphConfig::from_json_value(&json!({"nodes": {}, "edges": []}), &registry())
        .unwrap_err();
    assert!(matches!(err, FxError::Serde(_)));
}

#[test]
fn json_round_trip() {
    let reg = registry();
    let cfg = GraphConfig::new().with_node(
        "n",
        reg.resolve("a")
            .unwrap()
            .node_config(ConfigNode::record([("x", ConfigNode::literal(2.0))]))
            .unwrap(),
    );
    let json = cfg.to_json_value().unwrap();
    assert_eq!(
        json,
        json!({"nodes": {"n": {"type": "a", "input": {"value": {"x": {"value": 2.0}}}}}})
    );
    assert_eq!(GraphConfig::from_json_value(&json, &reg).unwrap(), cfg);

    let pretty = cfg.to_json_string_pretty().unwrap();
    assert_eq!(GraphConfig::from_json_str(&pretty, &reg).unwrap(), cfg);
}
