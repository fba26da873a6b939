use super::*;
use crate::foundation::time::ManualClock;

fn input(period: f64, easing: &str) -> Value {
    Value::record([
        ("period", Value::Number(period)),
        ("min", Value::Number(0.0)),
        ("max", Value::Number(1.0)),
        ("easing", Value::from(easing)),
    ])
}

fn run(osc: &mut Oscillator, clock: &ManualClock, input: &Value) -> f64 {
    let ctx = UpdateContext { clock, tick: 0 };
    osc.update(&ctx, input).unwrap().as_f64().unwrap()
}

#[test]
fn linear_ramp_starts_at_first_update() {
    let clock = ManualClock::new(1000.0);
    let mut osc = Oscillator::default();
    let i = input(4.0, "linear");
    assert_eq!(run(&mut osc, &clock, &i), 0.0);
    clock.advance(2.0);
    assert!((run(&mut osc, &clock, &i) - 0.5).abs() < 1e-9);
    clock.advance(2.0);
    assert!(run(&mut osc, &clock, &i).abs() < 1e-9);
}

#[test]
fn waveforms_at_quarter_points() {
    let cases = [
        (Easing::Sine, [0.5, 1.0, 0.5, 0.0]),
        (Easing::Triangle, [0.0, 0.5, 1.0, 0.5]),
        (Easing::Square, [1.0, 1.0, 0.0, 0.0]),
        (Easing::Sawtooth, [1.0, 0.75, 0.5, 0.25]),
    ];
    for (easing, expected) in cases {
        for (i, want) in expected.into_iter().enumerate() {
            let got = easing.shape(i as f64 * 0.25);
            assert!((got - want).abs() < 1e-9, "{easing:?} at {i}: {got}");
        }
    }
}

#[test]
fn period_change_keeps_phase() {
    assert!((offset_to_keep_phase(1.5, 0.0, 1.0, 2.0) - 1.5).abs() < 1e-9);
    assert!((phase_at(1.5, 1.5, 2.0) - 0.5).abs() < 1e-9);

    let clock = ManualClock::new(0.0);
    let mut osc = Oscillator::default();
    run(&mut osc, &clock, &input(1.0, "linear"));
    clock.advance(1.3);
    let before = run(&mut osc, &clock, &input(1.0, "linear"));
    let after = run(&mut osc, &clock, &input(5.0, "linear"));
    assert!((before - after).abs() < 1e-9, "{before} vs {after}");
}

#[test]
fn scales_into_min_max() {
    let clock = ManualClock::new(0.0);
    let mut osc = Oscillator::default();
    let i = Value::record([
        ("period", Value::Number(2.0)),
        ("min", Value::Number(-10.0)),
        ("max", Value::Number(10.0)),
        ("easing", Value::from("square")),
    ]);
    assert_eq!(run(&mut osc, &clock, &i), 10.0);
    clock.advance(1.5);
    assert_eq!(run(&mut osc, &clock, &i), -10.0);
}

#[test]
fn definition_defaults_validate() {
    let def = definition();
    let defaults = def.input.default_value();
    assert_eq!(defaults.get("easing"), Some(&Value::from("sine")));
    assert!(
        def.input
            .validate(&input(4.0, "wobble"), &crate::foundation::path::ConfigPath::root())
            .is_err()
    );
}
