use crate::foundation::error::FxResult;
use crate::foundation::value::Value;
use crate::gpu::{PingPong, ShaderProgram, Uniform};
use crate::module::{
    FactoryContext, ModuleDefinition, ModuleInstance, ModuleSpec, UpdateContext, define_module,
};
use crate::modules::{number, texture};
use crate::types::TypeTree;

pub const TYPE_ID: &str = "blur";

const FRAGMENT: &str = r#"#version 300 es
precision highp float;
uniform vec2 u_resolution;
uniform sampler2D u_prev;
uniform sampler2D u_source;
uniform float u_has_source;
uniform float u_radius;
uniform float u_feedback;
in vec2 v_uv;
out vec4 frag;
void main() {
    vec2 px = u_radius / u_resolution;
    vec4 acc = vec4(0.0);
    for (int i = -2; i <= 2; i++) {
        acc += texture(u_prev, v_uv + px * float(i));
    }
    vec4 src = texture(u_source, v_uv) * u_has_source;
    frag = mix(src, acc / 5.0, u_feedback);
}
"#;

pub fn definition() -> ModuleDefinition {
    define_module(
        TYPE_ID,
        ModuleSpec {
            label: "Blur".into(),
            input: TypeTree::record([
                ("source", TypeTree::texture().labeled("Source")),
                ("radius", TypeTree::number_in(2.0, 0.0, 64.0).labeled("Radius")),
                ("feedback", TypeTree::number_in(0.5, 0.0, 1.0).labeled("Feedback")),
            ])
            .labeled("Blur"),
            output: TypeTree::texture(),
        },
        |ctx| Ok(Box::new(Blur::new(ctx)?) as Box<dyn ModuleInstance>),
    )
}

/// Feedback blur: each pass mixes the source into a blurred copy of the previous result.
pub struct Blur {
    buffers: PingPong,
    program: ShaderProgram,
}

impl Blur {
    pub fn new(ctx: &FactoryContext) -> FxResult<Self> {
        let device = ctx.require_device()?;
        let buffers = PingPong::new(device, ctx.opts.target_desc())?;
        let program = ShaderProgram::new(device, FRAGMENT)?;
        Ok(Self { buffers, program })
    }

    pub fn buffers(&self) -> &PingPong {
        &self.buffers
    }
}

impl ModuleInstance for Blur {
    fn update(&mut self, _ctx: &UpdateContext<'_>, input: &Value) -> FxResult<Value> {
        let source = texture(input, "source")?;
        let radius = number(input, "radius")? as f32;
        let feedback = number(input, "feedback")? as f32;

        let program = &self.program;
        self.buffers.render(|prev| {
            // Unconnected source samples the previous frame and is masked out.
            program.draw(&[
                ("u_prev", Uniform::Texture(prev)),
                ("u_source", Uniform::Texture(source.unwrap_or(prev))),
                ("u_has_source", Uniform::Float(if source.is_some() { 1.0 } else { 0.0 })),
                ("u_radius", Uniform::Float(radius)),
                ("u_feedback", Uniform::Float(feedback)),
            ])
        })?;
        Ok(Value::Texture(self.buffers.handle()))
    }
}
