use super::*;

#[test]
fn display_prefixes_are_stable() {
    let path = ConfigPath::root().field("input").field("rows");
    let e = FxError::configuration(&path, "x");
    assert_eq!(e.to_string(), "configuration error at $.input.rows: x");
    assert!(
        FxError::graph_definition("x")
            .to_string()
            .contains("graph definition error:")
    );
    assert!(FxError::gpu("x").to_string().contains("gpu resource error:"));
    assert!(FxError::module("x").to_string().contains("module error:"));
    assert!(
        FxError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: FxError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, FxError::Serde(_)));
}

#[test]
fn configuration_is_recognised() {
    assert!(FxError::configuration(&ConfigPath::root(), "bad").is_configuration());
    assert!(!FxError::module("bad").is_configuration());
}
