use crate::foundation::error::FxResult;
use crate::foundation::value::Value;
use crate::gpu::{PingPong, ShaderProgram, TextureDesc, TextureFormat, Uniform};
use crate::module::{
    FactoryContext, ModuleDefinition, ModuleInstance, ModuleSpec, UpdateContext, define_module,
};
use crate::modules::{number, texture};
use crate::types::TypeTree;

pub const TYPE_ID: &str = "fluid";

const PRESSURE: &str = r#"#version 300 es
precision highp float;
uniform vec2 u_resolution;
uniform sampler2D u_pressure;
uniform sampler2D u_velocity;
in vec2 v_uv;
out vec4 frag;
void main() {
    vec2 px = 1.0 / u_resolution;
    float div = texture(u_velocity, v_uv + vec2(px.x, 0.0)).x - texture(u_velocity, v_uv - vec2(px.x, 0.0)).x
              + texture(u_velocity, v_uv + vec2(0.0, px.y)).y - texture(u_velocity, v_uv - vec2(0.0, px.y)).y;
    float p = texture(u_pressure, v_uv + vec2(px.x, 0.0)).x + texture(u_pressure, v_uv - vec2(px.x, 0.0)).x
            + texture(u_pressure, v_uv + vec2(0.0, px.y)).x + texture(u_pressure, v_uv - vec2(0.0, px.y)).x;
    frag = vec4((p - div) * 0.25, 0.0, 0.0, 1.0);
}
"#;

// Self-advection and pressure projection in one pass.
const VELOCITY: &str = r#"#version 300 es
precision highp float;
uniform vec2 u_resolution;
uniform sampler2D u_velocity;
uniform sampler2D u_pressure;
uniform float u_viscosity;
in vec2 v_uv;
out vec4 frag;
void main() {
    vec2 px = 1.0 / u_resolution;
    vec2 back = v_uv - texture(u_velocity, v_uv).xy * px;
    vec2 vel = texture(u_velocity, back).xy * (1.0 - u_viscosity);
    vec2 grad = vec2(
        texture(u_pressure, v_uv + vec2(px.x, 0.0)).x - texture(u_pressure, v_uv - vec2(px.x, 0.0)).x,
        texture(u_pressure, v_uv + vec2(0.0, px.y)).x - texture(u_pressure, v_uv - vec2(0.0, px.y)).x);
    frag = vec4(vel - grad * 0.5, 0.0, 1.0);
}
"#;

const INJECT: &str = r#"#version 300 es
precision highp float;
uniform vec2 u_resolution;
uniform sampler2D u_dye;
uniform sampler2D u_velocity;
uniform sampler2D u_source;
uniform float u_has_source;
uniform float u_dissipation;
in vec2 v_uv;
out vec4 frag;
void main() {
    vec2 back = v_uv - texture(u_velocity, v_uv).xy / u_resolution;
    vec4 dye = texture(u_dye, back) * u_dissipation;
    frag = max(dye, texture(u_source, v_uv) * u_has_source);
}
"#;

pub fn definition() -> ModuleDefinition {
    define_module(
        TYPE_ID,
        ModuleSpec {
            label: "Fluid".into(),
            input: TypeTree::record([
                ("source", TypeTree::texture().labeled("Dye source")),
                ("viscosity", TypeTree::number_in(0.1, 0.0, 1.0).labeled("Viscosity")),
                ("dissipation", TypeTree::number_in(0.98, 0.0, 1.0).labeled("Dissipation")),
            ])
            .labeled("Fluid"),
            output: TypeTree::texture(),
        },
        |ctx| Ok(Box::new(Fluid::new(ctx)?) as Box<dyn ModuleInstance>),
    )
}

/// Grid fluid simulation with velocity, pressure and dye channels, one ping-pong pair each.
///
/// Every update renders each channel exactly once, so all three pairs swap in step. Velocity and
/// pressure are always float targets; dye uses the runtime's format.
pub struct Fluid {
    velocity: PingPong,
    pressure: PingPong,
    dye: PingPong,
    pressure_solve: ShaderProgram,
    velocity_step: ShaderProgram,
    inject: ShaderProgram,
}

impl Fluid {
    pub fn new(ctx: &FactoryContext) -> FxResult<Self> {
        let device = ctx.require_device()?;
        let opts = ctx.opts;
        let sim = TextureDesc::new(opts.width, opts.height, TextureFormat::Rgba32F);
        Ok(Self {
            velocity: PingPong::new(device, sim)?,
            pressure: PingPong::new(device, sim)?,
            dye: PingPong::new(device, opts.target_desc())?,
            pressure_solve: ShaderProgram::new(device, PRESSURE)?,
            velocity_step: ShaderProgram::new(device, VELOCITY)?,
            inject: ShaderProgram::new(device, INJECT)?,
        })
    }

    /// `(velocity, pressure, dye)`.
    pub fn channels(&self) -> [&PingPong; 3] {
        [&self.velocity, &self.pressure, &self.dye]
    }
}

impl ModuleInstance for Fluid {
    fn update(&mut self, _ctx: &UpdateContext<'_>, input: &Value) -> FxResult<Value> {
        let source = texture(input, "source")?;
        let viscosity = number(input, "viscosity")? as f32;
        let dissipation = number(input, "dissipation")? as f32;

        let velocity = self.velocity.handle();
        let solve = &self.pressure_solve;
        self.pressure.render(|prev| {
            solve.draw(&[
                ("u_pressure", Uniform::Texture(prev)),
                ("u_velocity", Uniform::Texture(velocity)),
            ])
        })?;

        let pressure = self.pressure.handle();
        let step = &self.velocity_step;
        self.velocity.render(|prev| {
            step.draw(&[
                ("u_velocity", Uniform::Texture(prev)),
                ("u_pressure", Uniform::Texture(pressure)),
                ("u_viscosity", Uniform::Float(viscosity)),
            ])
        })?;

        let velocity = self.velocity.handle();
        let inject = &self.inject;
        self.dye.render(|prev| {
            inject.draw(&[
                ("u_dye", Uniform::Texture(prev)),
                ("u_velocity", Uniform::Texture(velocity)),
                ("u_source", Uniform::Texture(source.unwrap_or(prev))),
                ("u_has_source", Uniform::Float(if source.is_some() { 1.0 } else { 0.0 })),
                ("u_dissipation", Uniform::Float(dissipation)),
            ])
        })?;

        Ok(Value::Texture(self.dye.handle()))
    }
}
