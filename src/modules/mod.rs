//! Built-in module library.
//!
//! The shader bodies are placeholders; what the GL modules pin down is their resource layout:
//! one framebuffer for generators, one ping-pong pair per feedback channel.

pub mod blur;
pub mod checkerboard;
pub mod fluid;
pub mod oscillator;
pub mod screen;

pub use screen::ScreenCompositor;

use crate::foundation::color::Color;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::value::Value;
use crate::gpu::TextureRef;
use crate::module::ModuleRegistry;

/// Registry holding `oscillator`, `checkerboard`, `blur` and `fluid`.
pub fn builtin_registry() -> FxResult<ModuleRegistry> {
    let mut reg = ModuleRegistry::new();
    register_builtins(&mut reg)?;
    Ok(reg)
}

pub fn register_builtins(reg: &mut ModuleRegistry) -> FxResult<()> {
    reg.register(oscillator::definition())?;
    reg.register(checkerboard::definition())?;
    reg.register(blur::definition())?;
    reg.register(fluid::definition())?;
    Ok(())
}

fn number(input: &Value, field: &str) -> FxResult<f64> {
    input
        .get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| FxError::module(format!("input '{field}' is not a number")))
}

fn text<'a>(input: &'a Value, field: &str) -> FxResult<&'a str> {
    input
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| FxError::module(format!("input '{field}' is not a string")))
}

fn color(input: &Value, field: &str) -> FxResult<Color> {
    input
        .get(field)
        .and_then(Value::as_color)
        .ok_or_else(|| FxError::module(format!("input '{field}' is not a color")))
}

/// `None` for an unconnected texture slot.
fn texture(input: &Value, field: &str) -> FxResult<Option<TextureRef>> {
    match input.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Texture(t)) => Ok(Some(*t)),
        Some(other) => Err(FxError::module(format!(
            "input '{field}' is a {}, not a texture",
            other.kind_name()
        ))),
    }
}
