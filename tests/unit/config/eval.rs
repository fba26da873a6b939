use indexmap::IndexMap;

use super::*;
use crate::config::expr::OutputSnapshot;
use crate::foundation::color::Color;
use crate::foundation::time::ManualClock;

struct Fixture {
    expressions: ExpressionRegistry,
    outputs: OutputSnapshot,
    clock: ManualClock,
}

impl Fixture {
    fn new() -> Self {
        let mut outputs = IndexMap::new();
        outputs.insert("lfo".to_owned(), Value::Number(0.5));
        Self {
            expressions: ExpressionRegistry::with_builtins(),
            outputs,
            clock: ManualClock::new(10.0),
        }
    }

    fn eval(&self, node: &ConfigNode, tree: &TypeTree) -> FxResult<Value> {
        let ctx = EvalContext {
            outputs: &self.outputs,
            clock: &self.clock,
        };
        ConfigEvaluator::new(&self.expressions).evaluate(node, tree, &ctx, &ConfigPath::root())
    }
}

fn nested() -> TypeTree {
    TypeTree::record([
        ("gain", TypeTree::number(0.75)),
        (
            "stops",
            TypeTree::array(
                TypeTree::tuple([TypeTree::number(0.0), TypeTree::color(Color::WHITE)]),
                2,
            ),
        ),
        ("mode", TypeTree::enumeration(["add", "mul"], "mul")),
        ("source", TypeTree::texture()),
    ])
}

#[test]
fn unset_node_yields_the_type_default_recursively() {
    let f = Fixture::new();
    for tree in [
        nested(),
        TypeTree::number(3.0),
        TypeTree::tuple([TypeTree::boolean(true), TypeTree::text("x")]),
    ] {
        assert_eq!(f.eval(&ConfigNode::empty(), &tree).unwrap(), tree.default_value());
    }

    let partial = ConfigNode::record([("gain", ConfigNode::empty())]);
    assert_eq!(f.eval(&partial, &nested()).unwrap(), nested().default_value());
}

#[test]
fn toggling_active_expression_keeps_other_payloads() {
    let f = Fixture::new();
    let tree = TypeTree::number(0.0);
    let mut node = ConfigNode::literal(0.1);
    node.set_expr_payload("time", Value::record([("scaleSeconds", Value::Number(2.0))]))
        .unwrap();
    node.set_expr_payload("moduleOutput", Value::record([("moduleId", Value::from("lfo"))]))
        .unwrap();
    let before = node.as_leaf().unwrap().exprs.clone();

    node.set_active_expr(Some("time")).unwrap();
    assert_eq!(f.eval(&node, &tree).unwrap(), Value::Number(20.0));
    node.set_active_expr(None).unwrap();
    assert_eq!(f.eval(&node, &tree).unwrap(), Value::Number(0.1));

    assert_eq!(node.as_leaf().unwrap().exprs, before);
}

#[test]
fn unknown_expression_key_is_a_configuration_error_at_the_path() {
    let f = Fixture::new();
    let tree = TypeTree::record([("gain", TypeTree::number(0.0))]);
    let node = ConfigNode::record([("gain", ConfigNode::expr("nope", Value::Null))]);
    let err = f.eval(&node, &tree).unwrap_err();
    assert_eq!(
        err.to_string(),
        "configuration error at $.gain: unknown expression 'nope'"
    );
}

#[test]
fn module_output_reads_the_snapshot_and_tolerates_dangling_ids() {
    let f = Fixture::new();
    let tree = TypeTree::number_in(1.0, 0.0, 1.0);
    assert_eq!(
        f.eval(&ConfigNode::module_output("lfo"), &tree).unwrap(),
        Value::Number(0.5)
    );
    assert_eq!(
        f.eval(&ConfigNode::module_output("deleted"), &tree).unwrap(),
        Value::Number(1.0)
    );
}

#[test]
fn static_color_parses_and_fails_fast_on_bad_hex() {
    let f = Fixture::new();
    let tree = TypeTree::color(Color::BLACK);
    let red = ConfigNode::expr("staticColor", Value::record([("hex", Value::from("#ff0000"))]));
    assert_eq!(
        f.eval(&red, &tree).unwrap(),
        Value::Color(Color::rgba(1.0, 0.0, 0.0, 1.0))
    );

    let bad = ConfigNode::expr("staticColor", Value::record([("hex", Value::from("#zz"))]));
    let err = f.eval(&bad, &tree).unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("staticColor: malformed hex color"), "{err}");

    for hex in ["#+f+f+f", "+f0"] {
        let signed = ConfigNode::expr("staticColor", Value::record([("hex", Value::from(hex))]));
        assert!(f.eval(&signed, &tree).is_err(), "{hex} should not parse");
    }
}

#[test]
fn time_scales_the_clock_and_uses_default_payload() {
    let f = Fixture::new();
    let tree = TypeTree::number(0.0);
    let node = ConfigNode::expr("time", Value::record([("scaleSeconds", Value::Number(0.5))]));
    assert_eq!(f.eval(&node, &tree).unwrap(), Value::Number(5.0));

    let mut no_payload = ConfigNode::empty();
    no_payload.set_active_expr(Some("time")).unwrap();
    assert_eq!(f.eval(&no_payload, &tree).unwrap(), Value::Number(10.0));

    f.clock.advance(1.0);
    assert_eq!(f.eval(&no_payload, &tree).unwrap(), Value::Number(11.0));
}

#[test]
fn expression_results_are_validated_against_the_leaf() {
    let f = Fixture::new();
    let flag = TypeTree::boolean(false);
    let err = f.eval(&ConfigNode::module_output("lfo"), &flag).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn literal_failing_validation_names_the_nested_path() {
    let f = Fixture::new();
    let node = ConfigNode::record([(
        "stops",
        ConfigNode::list([
            ConfigNode::empty(),
            ConfigNode::list([ConfigNode::literal("x")]),
        ]),
    )]);
    let err = f.eval(&node, &nested()).unwrap_err();
    assert!(err.to_string().starts_with("configuration error at $.stops[1][0]:"), "{err}");
}

#[test]
fn arrays_take_their_length_from_the_config() {
    let f = Fixture::new();
    let tree = TypeTree::array(TypeTree::number(1.0), 4);
    let node = ConfigNode::list([ConfigNode::literal(2.0), ConfigNode::empty()]);
    assert_eq!(
        f.eval(&node, &tree).unwrap(),
        Value::List(vec![Value::Number(2.0), Value::Number(1.0)])
    );
}

#[test]
fn registry_lists_builtins_in_order_and_rejects_duplicates() {
    let mut reg = ExpressionRegistry::with_builtins();
    assert_eq!(reg.keys().collect::<Vec<_>>(), ["moduleOutput", "staticColor", "time"]);
    assert!(reg.register(crate::config::Time::new()).is_err());
    assert_eq!(reg.get("staticColor").map(|e| e.label()), Some("Color"));
}
