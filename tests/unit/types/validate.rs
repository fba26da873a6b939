use super::*;

fn root() -> ConfigPath {
    ConfigPath::root()
}

#[test]
fn number_clamps_and_rejects_non_numbers() {
    let t = TypeTree::number_in(0.5, 0.0, 1.0);
    assert_eq!(t.validate(&Value::Number(3.0), &root()).unwrap(), Value::Number(1.0));
    assert_eq!(t.validate(&Value::Number(-3.0), &root()).unwrap(), Value::Number(0.0));
    assert!(t.validate(&Value::from("1"), &root()).is_err());
    assert!(t.validate(&Value::Number(f64::INFINITY), &root()).is_err());
}

#[test]
fn integer_rejects_fractions() {
    let t = TypeTree::integer_in(4, 1, 64);
    assert_eq!(t.validate(&Value::Number(8.0), &root()).unwrap(), Value::Number(8.0));
    assert!(t.validate(&Value::Number(2.5), &root()).is_err());
    assert_eq!(t.validate(&Value::Number(100.0), &root()).unwrap(), Value::Number(64.0));
}

#[test]
fn color_coerces_hex_and_lists() {
    let t = TypeTree::color(Color::BLACK);
    assert_eq!(
        t.validate(&Value::from("#ffffff"), &root()).unwrap(),
        Value::Color(Color::WHITE)
    );
    assert_eq!(
        t.validate(
            &Value::List(vec![Value::Number(1.0), Value::Number(1.0), Value::Number(1.0)]),
            &root()
        )
        .unwrap(),
        Value::Color(Color::WHITE)
    );
    assert!(t.validate(&Value::from("#zz"), &root()).is_err());
    assert!(t.validate(&Value::Bool(true), &root()).is_err());
}

#[test]
fn enum_accepts_only_declared_options() {
    let t = TypeTree::enumeration(["linear", "sine"], "linear");
    assert!(t.validate(&Value::from("sine"), &root()).is_ok());
    let err = t.validate(&Value::from("cubic"), &root()).unwrap_err();
    assert!(err.to_string().contains("not one of [linear, sine]"));
}

#[test]
fn texture_accepts_null() {
    assert!(TypeTree::texture().validate(&Value::Null, &root()).is_ok());
    assert!(TypeTree::texture().validate(&Value::Number(1.0), &root()).is_err());
}

#[test]
fn record_errors_name_the_failing_path() {
    let t = TypeTree::record([(
        "grid",
        TypeTree::record([
            ("rows", TypeTree::integer(4)),
            ("columns", TypeTree::integer(4)),
        ]),
    )]);
    let bad = Value::record([(
        "grid",
        Value::record([("rows", Value::Number(1.5))]),
    )]);
    let err = t.validate(&bad, &root().field("input")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "configuration error at $.input.grid.rows: expected integer, found 1.5"
    );
}

#[test]
fn record_fills_missing_fields_and_rejects_unknown_ones() {
    let t = TypeTree::record([("a", TypeTree::number(1.0)), ("b", TypeTree::boolean(true))]);
    let v = t
        .validate(&Value::record([("a", Value::Number(2.0))]), &root())
        .unwrap();
    assert_eq!(v.get("b"), Some(&Value::Bool(true)));

    let err = t
        .validate(&Value::record([("c", Value::Null)]), &root())
        .unwrap_err();
    assert!(err.to_string().contains("unknown field 'c'"));
}

#[test]
fn tuple_length_is_fixed_but_array_is_not() {
    let tup = TypeTree::tuple([TypeTree::number(0.0), TypeTree::number(0.0)]);
    assert!(tup.validate(&Value::List(vec![Value::Number(1.0)]), &root()).is_err());

    let arr = TypeTree::array(TypeTree::number(0.0), 2);
    let v = arr
        .validate(&Value::List(vec![Value::Number(1.0); 5]), &root())
        .unwrap();
    assert_eq!(v.as_list().unwrap().len(), 5);

    let err = arr
        .validate(&Value::List(vec![Value::Number(1.0), Value::Null]), &root())
        .unwrap_err();
    assert!(err.to_string().contains("$[1]"));
}
