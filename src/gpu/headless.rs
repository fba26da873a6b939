use std::cell::RefCell;
use std::collections::HashMap;

use crate::foundation::color::Color;
use crate::foundation::error::{FxError, FxResult};
use crate::gpu::device::{
    FramebufferId, GraphicsDevice, PixelData, ProgramId, ShaderId, ShaderStage, TextureDesc,
    TextureId, UniformValue,
};

/// Everything a [`HeadlessDevice`] was asked to do, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CompileShader { id: ShaderId, stage: ShaderStage },
    LinkProgram { id: ProgramId },
    CreateTexture { id: TextureId, desc: TextureDesc },
    UploadTexture { id: TextureId },
    BindTexture { id: TextureId, unit: u32 },
    CreateFramebuffer { id: FramebufferId, texture: TextureId },
    BindFramebuffer(Option<FramebufferId>),
    Clear { target: Option<FramebufferId>, color: Color },
    UseProgram(ProgramId),
    SetUniform { program: ProgramId, name: String, value: UniformValue },
    Draw {
        program: ProgramId,
        target: Option<FramebufferId>,
        sampled: Vec<TextureId>,
    },
    BlitToScreen(TextureId),
    DeleteShader(ShaderId),
    DeleteProgram(ProgramId),
    DeleteTexture(TextureId),
    DeleteFramebuffer(FramebufferId),
}

struct TextureState {
    desc: TextureDesc,
    // RGBA, row-major, normalized.
    pixels: Vec<f32>,
}

#[derive(Default)]
struct ProgramState {
    uniforms: HashMap<String, UniformValue>,
}

struct State {
    next_id: u64,
    shaders: HashMap<ShaderId, ShaderStage>,
    programs: HashMap<ProgramId, ProgramState>,
    textures: HashMap<TextureId, TextureState>,
    framebuffers: HashMap<FramebufferId, TextureId>,
    bound_framebuffer: Option<FramebufferId>,
    units: HashMap<u32, TextureId>,
    current_program: Option<ProgramId>,
    viewport: (u32, u32),
    screen_size: (u32, u32),
    screen: Vec<f32>,
    commands: Vec<DeviceCommand>,
}

impl State {
    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory [`GraphicsDevice`] with GL-like validation and no rasterizer.
///
/// Shaders are "compiled" by shape checks only, draws are recorded but produce no pixels, while
/// clears, uploads and screen blits do touch pixel memory. It is what the test suite and the demo
/// render against.
pub struct HeadlessDevice {
    state: RefCell<State>,
}

impl HeadlessDevice {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width as usize) * (height as usize) * 4;
        Self {
            state: RefCell::new(State {
                next_id: 0,
                shaders: HashMap::new(),
                programs: HashMap::new(),
                textures: HashMap::new(),
                framebuffers: HashMap::new(),
                bound_framebuffer: None,
                units: HashMap::new(),
                current_program: None,
                viewport: (width, height),
                screen_size: (width, height),
                screen: vec![0.0; len],
                commands: Vec::new(),
            }),
        }
    }

    pub fn commands(&self) -> Vec<DeviceCommand> {
        self.state.borrow().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.borrow_mut().commands.clear();
    }

    pub fn live_textures(&self) -> usize {
        self.state.borrow().textures.len()
    }

    pub fn live_framebuffers(&self) -> usize {
        self.state.borrow().framebuffers.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn bound_framebuffer(&self) -> Option<FramebufferId> {
        self.state.borrow().bound_framebuffer
    }

    /// Last value set for `name` on `program`.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|p| p.uniforms.get(name).copied())
    }

    /// Snapshot of a texture as 8-bit RGBA, `None` if it no longer exists.
    pub fn texture_image(&self, id: TextureId) -> Option<image::RgbaImage> {
        let state = self.state.borrow();
        let tex = state.textures.get(&id)?;
        to_image(tex.desc.width, tex.desc.height, &tex.pixels)
    }

    pub fn screen_image(&self) -> Option<image::RgbaImage> {
        let state = self.state.borrow();
        let (w, h) = state.screen_size;
        to_image(w, h, &state.screen)
    }
}

fn to_image(width: u32, height: u32, pixels: &[f32]) -> Option<image::RgbaImage> {
    let bytes = pixels
        .iter()
        .map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();
    image::RgbaImage::from_raw(width, height, bytes)
}

fn compile_error(source: &str) -> Option<&'static str> {
    if source.trim().is_empty() {
        Some("empty source")
    } else if source.contains("#error") {
        Some("#error directive")
    } else if !source.contains("void main") {
        Some("missing entry point `void main`")
    } else {
        None
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn compile_shader(&self, stage: ShaderStage, source: &str) -> FxResult<ShaderId> {
        if let Some(reason) = compile_error(source) {
            return Err(FxError::gpu(format!("{stage:?} shader failed to compile: {reason}")));
        }
        let mut s = self.state.borrow_mut();
        let id = ShaderId(s.alloc_id());
        s.shaders.insert(id, stage);
        s.commands.push(DeviceCommand::CompileShader { id, stage });
        Ok(id)
    }

    fn link_program(&self, vertex: ShaderId, fragment: ShaderId) -> FxResult<ProgramId> {
        let mut s = self.state.borrow_mut();
        match (s.shaders.get(&vertex), s.shaders.get(&fragment)) {
            (Some(ShaderStage::Vertex), Some(ShaderStage::Fragment)) => {}
            (v, f) => {
                return Err(FxError::gpu(format!(
                    "program link failed: vertex={v:?} fragment={f:?}"
                )));
            }
        }
        let id = ProgramId(s.alloc_id());
        s.programs.insert(id, ProgramState::default());
        s.commands.push(DeviceCommand::LinkProgram { id });
        Ok(id)
    }

    fn delete_shader(&self, id: ShaderId) {
        let mut s = self.state.borrow_mut();
        if s.shaders.remove(&id).is_none() {
            tracing::warn!(shader = id.0, "delete of unknown shader");
        }
        s.commands.push(DeviceCommand::DeleteShader(id));
    }

    fn delete_program(&self, id: ProgramId) {
        let mut s = self.state.borrow_mut();
        if s.programs.remove(&id).is_none() {
            tracing::warn!(program = id.0, "delete of unknown program");
        }
        if s.current_program == Some(id) {
            s.current_program = None;
        }
        s.commands.push(DeviceCommand::DeleteProgram(id));
    }

    fn create_texture(&self, desc: TextureDesc) -> FxResult<TextureId> {
        let mut s = self.state.borrow_mut();
        let id = TextureId(s.alloc_id());
        s.textures.insert(
            id,
            TextureState {
                desc,
                pixels: vec![0.0; desc.channel_len()],
            },
        );
        s.commands.push(DeviceCommand::CreateTexture { id, desc });
        Ok(id)
    }

    fn upload_texture(&self, id: TextureId, data: PixelData<'_>) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        let tex = s
            .textures
            .get_mut(&id)
            .ok_or_else(|| FxError::gpu(format!("upload to unknown texture {}", id.0)))?;
        if data.channel_len() != tex.pixels.len() {
            return Err(FxError::gpu(format!(
                "upload of {} channels into texture of {}",
                data.channel_len(),
                tex.pixels.len()
            )));
        }
        match data {
            PixelData::Rgba8(bytes) => {
                for (dst, src) in tex.pixels.iter_mut().zip(bytes) {
                    *dst = f32::from(*src) / 255.0;
                }
            }
            PixelData::Rgba32F(floats) => tex.pixels.copy_from_slice(floats),
        }
        s.commands.push(DeviceCommand::UploadTexture { id });
        Ok(())
    }

    fn bind_texture(&self, id: TextureId, unit: u32) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        if !s.textures.contains_key(&id) {
            return Err(FxError::gpu(format!("bind of unknown texture {}", id.0)));
        }
        s.units.insert(unit, id);
        s.commands.push(DeviceCommand::BindTexture { id, unit });
        Ok(())
    }

    fn delete_texture(&self, id: TextureId) {
        let mut s = self.state.borrow_mut();
        if s.textures.remove(&id).is_none() {
            tracing::warn!(texture = id.0, "delete of unknown texture");
        }
        s.units.retain(|_, bound| *bound != id);
        s.commands.push(DeviceCommand::DeleteTexture(id));
    }

    fn create_framebuffer(&self, color: TextureId) -> FxResult<FramebufferId> {
        let mut s = self.state.borrow_mut();
        match s.textures.get(&color) {
            Some(t) if t.desc.width > 0 && t.desc.height > 0 => {}
            Some(t) => {
                return Err(FxError::gpu(format!(
                    "framebuffer incomplete: attachment {} is {}x{}",
                    color.0, t.desc.width, t.desc.height
                )));
            }
            None => {
                return Err(FxError::gpu(format!(
                    "framebuffer incomplete: unknown attachment {}",
                    color.0
                )));
            }
        }
        let id = FramebufferId(s.alloc_id());
        s.framebuffers.insert(id, color);
        s.commands.push(DeviceCommand::CreateFramebuffer { id, texture: color });
        Ok(id)
    }

    fn bind_framebuffer(&self, id: Option<FramebufferId>) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        if let Some(fb) = id
            && !s.framebuffers.contains_key(&fb)
        {
            return Err(FxError::gpu(format!("bind of unknown framebuffer {}", fb.0)));
        }
        s.bound_framebuffer = id;
        s.commands.push(DeviceCommand::BindFramebuffer(id));
        Ok(())
    }

    fn delete_framebuffer(&self, id: FramebufferId) {
        let mut s = self.state.borrow_mut();
        if s.framebuffers.remove(&id).is_none() {
            tracing::warn!(framebuffer = id.0, "delete of unknown framebuffer");
        }
        if s.bound_framebuffer == Some(id) {
            s.bound_framebuffer = None;
        }
        s.commands.push(DeviceCommand::DeleteFramebuffer(id));
    }

    fn set_viewport(&self, width: u32, height: u32) {
        self.state.borrow_mut().viewport = (width, height);
    }

    fn viewport(&self) -> (u32, u32) {
        self.state.borrow().viewport
    }

    fn clear(&self, color: Color) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        let target = s.bound_framebuffer;
        let rgba = color.to_array();
        let pixels = match target {
            Some(fb) => {
                let tex_id = s
                    .framebuffers
                    .get(&fb)
                    .copied()
                    .ok_or_else(|| FxError::gpu(format!("clear of unknown framebuffer {}", fb.0)))?;
                let tex = s
                    .textures
                    .get_mut(&tex_id)
                    .ok_or_else(|| FxError::gpu(format!("framebuffer {} lost its texture", fb.0)))?;
                &mut tex.pixels
            }
            None => &mut s.screen,
        };
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        s.commands.push(DeviceCommand::Clear { target, color });
        Ok(())
    }

    fn use_program(&self, id: ProgramId) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        if !s.programs.contains_key(&id) {
            return Err(FxError::gpu(format!("use of unknown program {}", id.0)));
        }
        s.current_program = Some(id);
        s.commands.push(DeviceCommand::UseProgram(id));
        Ok(())
    }

    fn set_uniform(&self, program: ProgramId, name: &str, value: UniformValue) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        let p = s
            .programs
            .get_mut(&program)
            .ok_or_else(|| FxError::gpu(format!("uniform on unknown program {}", program.0)))?;
        p.uniforms.insert(name.to_owned(), value);
        s.commands.push(DeviceCommand::SetUniform {
            program,
            name: name.to_owned(),
            value,
        });
        Ok(())
    }

    fn draw_fullscreen_quad(&self) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        let program = s
            .current_program
            .ok_or_else(|| FxError::gpu("draw without a program in use"))?;
        let target = s.bound_framebuffer;
        let target_texture = target.and_then(|fb| s.framebuffers.get(&fb).copied());

        let mut sampled = Vec::new();
        if let Some(p) = s.programs.get(&program) {
            for value in p.uniforms.values() {
                if let UniformValue::Sampler(unit) = value
                    && let Some(tex) = s.units.get(unit)
                {
                    sampled.push(*tex);
                }
            }
        }
        sampled.sort();
        sampled.dedup();

        if let Some(tex) = target_texture
            && sampled.contains(&tex)
        {
            return Err(FxError::gpu(format!(
                "feedback loop: texture {} is sampled while being rendered to",
                tex.0
            )));
        }

        s.commands.push(DeviceCommand::Draw {
            program,
            target,
            sampled,
        });
        Ok(())
    }

    fn blit_to_screen(&self, id: TextureId) -> FxResult<()> {
        let mut s = self.state.borrow_mut();
        let (sw, sh) = s.screen_size;
        let tex = s
            .textures
            .get(&id)
            .ok_or_else(|| FxError::gpu(format!("blit of unknown texture {}", id.0)))?;
        let (tw, th) = (tex.desc.width as usize, tex.desc.height as usize);
        let mut screen = vec![0.0; (sw as usize) * (sh as usize) * 4];
        if tw > 0 && th > 0 {
            for y in 0..sh as usize {
                let ty = y * th / sh as usize;
                for x in 0..sw as usize {
                    let tx = x * tw / sw as usize;
                    let src = (ty * tw + tx) * 4;
                    let dst = (y * sw as usize + x) * 4;
                    screen[dst..dst + 4].copy_from_slice(&tex.pixels[src..src + 4]);
                }
            }
        }
        s.screen = screen;
        s.commands.push(DeviceCommand::BlitToScreen(id));
        Ok(())
    }

    fn screen_size(&self) -> (u32, u32) {
        self.state.borrow().screen_size
    }
}
