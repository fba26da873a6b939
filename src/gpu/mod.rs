//! Graphics resources for GL-backed modules.
//!
//! Resource wrappers own their device handle and release it on drop, in dependency order.
//! [`HeadlessDevice`] implements [`GraphicsDevice`] without a GPU.

pub mod device;
pub mod framebuffer;
pub mod headless;
pub mod pingpong;
pub mod shader;
pub mod texture;

pub use device::{
    FramebufferId, GraphicsDevice, PixelData, ProgramId, ShaderId, ShaderStage, SharedDevice,
    TextureDesc, TextureFormat, TextureId, UniformValue,
};
pub use framebuffer::Framebuffer;
pub use headless::{DeviceCommand, HeadlessDevice};
pub use pingpong::PingPong;
pub use shader::{FULLSCREEN_VERTEX_SHADER, RESOLUTION_UNIFORM, ShaderProgram, Uniform};
pub use texture::{Texture, TextureRef};

#[cfg(test)]
#[path = "../../tests/unit/gpu/resources.rs"]
mod resources_tests;

#[cfg(test)]
#[path = "../../tests/unit/gpu/pingpong.rs"]
mod pingpong_tests;
