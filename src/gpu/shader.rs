use crate::foundation::color::Color;
use crate::foundation::error::{FxError, FxResult};
use crate::gpu::device::{ProgramId, ShaderId, ShaderStage, SharedDevice, UniformValue};
use crate::gpu::texture::TextureRef;

/// Vertex stage shared by every program: a full-screen quad exposing `v_uv`.
pub const FULLSCREEN_VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
out vec2 v_uv;
void main() {
    v_uv = a_position * 0.5 + 0.5;
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

/// Name of the uniform every program receives with the target size in pixels.
pub const RESOLUTION_UNIFORM: &str = "u_resolution";

/// Caller-supplied uniform value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Texture(TextureRef),
}

impl From<f32> for Uniform {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for Uniform {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<Color> for Uniform {
    fn from(c: Color) -> Self {
        Self::Vec4(c.to_array())
    }
}

impl From<TextureRef> for Uniform {
    fn from(t: TextureRef) -> Self {
        Self::Texture(t)
    }
}

struct Shader {
    device: SharedDevice,
    id: ShaderId,
}

impl Drop for Shader {
    fn drop(&mut self) {
        self.device.delete_shader(self.id);
    }
}

/// Linked program = fixed full-screen vertex stage + a caller fragment stage.
///
/// Field order matters: the program is deleted in `Drop`, then the fragment and vertex shaders
/// drop in declaration order.
pub struct ShaderProgram {
    device: SharedDevice,
    id: ProgramId,
    fragment: Shader,
    vertex: Shader,
}

impl ShaderProgram {
    /// Compile and link. Any failure is a [`FxError::GpuResource`] and releases whatever was
    /// already created.
    pub fn new(device: &SharedDevice, fragment_source: &str) -> FxResult<Self> {
        let vertex = Shader {
            device: device.clone(),
            id: device
                .compile_shader(ShaderStage::Vertex, FULLSCREEN_VERTEX_SHADER)
                .map_err(|e| FxError::gpu(format!("vertex shader: {e}")))?,
        };
        let fragment = Shader {
            device: device.clone(),
            id: device
                .compile_shader(ShaderStage::Fragment, fragment_source)
                .map_err(|e| FxError::gpu(format!("fragment shader: {e}")))?,
        };
        let id = device
            .link_program(vertex.id, fragment.id)
            .map_err(|e| FxError::gpu(format!("link: {e}")))?;
        tracing::trace!(program = id.0, "shader program linked");
        Ok(Self {
            device: device.clone(),
            id,
            fragment,
            vertex,
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    /// Bind the program, set the resolution uniform plus `uniforms`, and draw into the currently
    /// bound target. Texture uniforms take sampler units in the order given, starting at 0.
    pub fn draw(&self, uniforms: &[(&str, Uniform)]) -> FxResult<()> {
        self.device.use_program(self.id)?;
        let (w, h) = self.device.viewport();
        self.device.set_uniform(
            self.id,
            RESOLUTION_UNIFORM,
            UniformValue::Vec2([w as f32, h as f32]),
        )?;

        let mut unit = 0u32;
        for (name, value) in uniforms {
            let raw = match *value {
                Uniform::Float(v) => UniformValue::Float(v),
                Uniform::Int(v) => UniformValue::Int(v),
                Uniform::Vec2(v) => UniformValue::Vec2(v),
                Uniform::Vec3(v) => UniformValue::Vec3(v),
                Uniform::Vec4(v) => UniformValue::Vec4(v),
                Uniform::Texture(t) => {
                    self.device.bind_texture(t.id, unit)?;
                    let raw = UniformValue::Sampler(unit);
                    unit += 1;
                    raw
                }
            };
            self.device.set_uniform(self.id, name, raw)?;
        }

        self.device.draw_fullscreen_quad()
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        tracing::trace!(program = self.id.0, "shader program released");
        self.device.delete_program(self.id);
    }
}
