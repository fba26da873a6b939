use std::rc::Rc;

use crate::foundation::color::Color;
use crate::foundation::error::FxResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub u64);

/// Channel storage of a texture. Both formats carry four channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    #[default]
    Rgba8,
    Rgba32F,
}

impl TextureFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgba32F => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureDesc {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
        }
    }

    /// Number of channel values (`width * height * 4`).
    pub fn channel_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Pixel payload for [`GraphicsDevice::upload_texture`]; must match the texture format.
#[derive(Debug, Clone, Copy)]
pub enum PixelData<'a> {
    Rgba8(&'a [u8]),
    Rgba32F(&'a [f32]),
}

impl PixelData<'_> {
    pub fn format(&self) -> TextureFormat {
        match self {
            Self::Rgba8(_) => TextureFormat::Rgba8,
            Self::Rgba32F(_) => TextureFormat::Rgba32F,
        }
    }

    pub fn channel_len(&self) -> usize {
        match self {
            Self::Rgba8(d) => d.len(),
            Self::Rgba32F(d) => d.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Raw uniform payload as the device sees it. Texture uniforms arrive as sampler units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Sampler(u32),
}

/// The graphics capability GL-backed modules render through.
///
/// Calls are immediate-mode enqueues; nothing here waits for GPU completion. Implementations are
/// single-threaded and use interior mutability, so every method takes `&self`. Deletion methods
/// cannot fail: they are called from `Drop`.
pub trait GraphicsDevice {
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> FxResult<ShaderId>;
    fn link_program(&self, vertex: ShaderId, fragment: ShaderId) -> FxResult<ProgramId>;
    fn delete_shader(&self, id: ShaderId);
    fn delete_program(&self, id: ProgramId);

    fn create_texture(&self, desc: TextureDesc) -> FxResult<TextureId>;
    fn upload_texture(&self, id: TextureId, data: PixelData<'_>) -> FxResult<()>;
    fn bind_texture(&self, id: TextureId, unit: u32) -> FxResult<()>;
    fn delete_texture(&self, id: TextureId);

    /// Create a framebuffer with `color` as its only attachment. Fails when incomplete.
    fn create_framebuffer(&self, color: TextureId) -> FxResult<FramebufferId>;
    /// `None` binds the screen.
    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> FxResult<()>;
    fn delete_framebuffer(&self, id: FramebufferId);

    fn set_viewport(&self, width: u32, height: u32);
    fn viewport(&self) -> (u32, u32);
    fn clear(&self, color: Color) -> FxResult<()>;

    fn use_program(&self, id: ProgramId) -> FxResult<()>;
    fn set_uniform(&self, program: ProgramId, name: &str, value: UniformValue) -> FxResult<()>;
    /// Draw the full-screen quad with the current program into the bound target.
    fn draw_fullscreen_quad(&self) -> FxResult<()>;

    /// Copy a texture onto the screen, scaling to fit.
    fn blit_to_screen(&self, id: TextureId) -> FxResult<()>;
    fn screen_size(&self) -> (u32, u32);
}

/// Devices are shared by every resource they allocate so `Drop` can release them.
pub type SharedDevice = Rc<dyn GraphicsDevice>;
