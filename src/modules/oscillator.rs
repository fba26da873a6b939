use std::f64::consts::TAU;

use crate::foundation::error::{FxError, FxResult};
use crate::foundation::value::Value;
use crate::module::{
    ModuleDefinition, ModuleInstance, ModuleSpec, UpdateContext, define_module,
};
use crate::modules::{number, text};
use crate::types::TypeTree;

pub const TYPE_ID: &str = "oscillator";

/// Waveform mapped onto `[0, 1]` before scaling into `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// Rising ramp.
    Linear,
    Sine,
    Triangle,
    Square,
    /// Falling ramp.
    Sawtooth,
}

impl Easing {
    pub const NAMES: [&'static str; 5] = ["linear", "sine", "triangle", "square", "sawtooth"];

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "linear" => Self::Linear,
            "sine" => Self::Sine,
            "triangle" => Self::Triangle,
            "square" => Self::Square,
            "sawtooth" => Self::Sawtooth,
            _ => return None,
        })
    }

    /// Shape value for `phase` in `[0, 1)`.
    pub fn shape(self, phase: f64) -> f64 {
        match self {
            Self::Linear => phase,
            Self::Sine => (1.0 + (TAU * phase).sin()) * 0.5,
            Self::Triangle => {
                if phase < 0.5 {
                    phase * 2.0
                } else {
                    2.0 - phase * 2.0
                }
            }
            Self::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Sawtooth => 1.0 - phase,
        }
    }
}

/// Position within the period, in `[0, 1)`.
pub fn phase_at(elapsed: f64, offset: f64, period: f64) -> f64 {
    if period <= 0.0 {
        return 0.0;
    }
    ((elapsed + offset) / period).rem_euclid(1.0)
}

/// Offset that keeps the phase at `elapsed` unchanged when the period goes from `old_period` to
/// `new_period`.
pub fn offset_to_keep_phase(elapsed: f64, old_offset: f64, old_period: f64, new_period: f64) -> f64 {
    let phase = phase_at(elapsed, old_offset, old_period);
    (phase * new_period - elapsed).rem_euclid(new_period.max(f64::MIN_POSITIVE))
}

pub fn definition() -> ModuleDefinition {
    define_module(
        TYPE_ID,
        ModuleSpec {
            label: "Oscillator".into(),
            input: TypeTree::record([
                (
                    "period",
                    TypeTree::number_in(1.0, 0.001, 3600.0)
                        .labeled("Period")
                        .described("Seconds per cycle"),
                ),
                ("min", TypeTree::number(0.0).labeled("Min")),
                ("max", TypeTree::number(1.0).labeled("Max")),
                (
                    "easing",
                    TypeTree::enumeration(Easing::NAMES, "sine").labeled("Easing"),
                ),
            ])
            .labeled("Oscillator"),
            output: TypeTree::number(0.0),
        },
        |_ctx| Ok(Box::new(Oscillator::default()) as Box<dyn ModuleInstance>),
    )
}

/// CPU oscillator. Time starts at the first update.
#[derive(Debug, Default)]
pub struct Oscillator {
    start: Option<f64>,
    period: Option<f64>,
    offset: f64,
}

impl ModuleInstance for Oscillator {
    fn update(&mut self, ctx: &UpdateContext<'_>, input: &Value) -> FxResult<Value> {
        let period = number(input, "period")?;
        let min = number(input, "min")?;
        let max = number(input, "max")?;
        let easing_name = text(input, "easing")?;
        let easing = Easing::parse(easing_name)
            .ok_or_else(|| FxError::module(format!("unknown easing '{easing_name}'")))?;

        let now = ctx.clock.now_seconds();
        let start = *self.start.get_or_insert(now);
        let elapsed = now - start;

        if let Some(old) = self.period
            && old != period
        {
            self.offset = offset_to_keep_phase(elapsed, self.offset, old, period);
        }
        self.period = Some(period);

        let phase = phase_at(elapsed, self.offset, period);
        Ok(Value::Number(min + (max - min) * easing.shape(phase)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/modules/oscillator.rs"]
mod tests;
