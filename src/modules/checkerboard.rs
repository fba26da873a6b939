use crate::foundation::color::Color;
use crate::foundation::error::FxResult;
use crate::foundation::value::Value;
use crate::gpu::{Framebuffer, ShaderProgram, Uniform};
use crate::module::{
    FactoryContext, ModuleDefinition, ModuleInstance, ModuleSpec, UpdateContext, define_module,
};
use crate::modules::{color, number};
use crate::types::TypeTree;

pub const TYPE_ID: &str = "checkerboard";

const FRAGMENT: &str = r#"#version 300 es
precision highp float;
uniform vec2 u_resolution;
uniform float u_intensity;
uniform int u_rows;
uniform int u_columns;
uniform vec4 u_color;
in vec2 v_uv;
out vec4 frag;
void main() {
    ivec2 cell = ivec2(floor(v_uv * vec2(float(u_columns), float(u_rows))));
    float on = float((cell.x + cell.y) % 2 == 0);
    frag = vec4(u_color.rgb * on * u_intensity, u_color.a);
}
"#;

pub fn definition() -> ModuleDefinition {
    define_module(
        TYPE_ID,
        ModuleSpec {
            label: "Checkerboard".into(),
            input: TypeTree::record([
                ("intensity", TypeTree::number_in(1.0, 0.0, 1.0).labeled("Intensity")),
                ("rows", TypeTree::integer_in(8, 1, 256).labeled("Rows")),
                ("columns", TypeTree::integer_in(8, 1, 256).labeled("Columns")),
                ("color", TypeTree::color(Color::WHITE).labeled("Color")),
            ])
            .labeled("Checkerboard"),
            output: TypeTree::texture(),
        },
        |ctx| Ok(Box::new(Checkerboard::new(ctx)?) as Box<dyn ModuleInstance>),
    )
}

/// Single-pass generator drawing into one framebuffer.
pub struct Checkerboard {
    target: Framebuffer,
    program: ShaderProgram,
}

impl Checkerboard {
    pub fn new(ctx: &FactoryContext) -> FxResult<Self> {
        let device = ctx.require_device()?;
        let target = Framebuffer::new(device, ctx.opts.target_desc())?;
        let program = ShaderProgram::new(device, FRAGMENT)?;
        Ok(Self { target, program })
    }
}

impl ModuleInstance for Checkerboard {
    fn update(&mut self, _ctx: &UpdateContext<'_>, input: &Value) -> FxResult<Value> {
        let intensity = number(input, "intensity")? as f32;
        let rows = number(input, "rows")? as i32;
        let columns = number(input, "columns")? as i32;
        let tint = color(input, "color")?;

        self.target.bind()?;
        let drawn = self.program.draw(&[
            ("u_intensity", Uniform::Float(intensity)),
            ("u_rows", Uniform::Int(rows)),
            ("u_columns", Uniform::Int(columns)),
            ("u_color", Uniform::from(tint)),
        ]);
        self.target.unbind()?;
        drawn?;
        Ok(Value::Texture(self.target.handle()))
    }
}
