use crate::foundation::color::Color;
use crate::foundation::error::FxResult;
use crate::gpu::device::{FramebufferId, SharedDevice, TextureDesc};
use crate::gpu::texture::{Texture, TextureRef};

/// Render target that exclusively owns its color texture.
///
/// Dropping it deletes the framebuffer first; the texture field is dropped afterwards, so the
/// framebuffer → texture release order holds by construction.
pub struct Framebuffer {
    device: SharedDevice,
    id: FramebufferId,
    texture: Texture,
}

impl Framebuffer {
    /// Allocate a texture and attach it. If the framebuffer turns out incomplete the texture is
    /// released before the error is returned.
    pub fn new(device: &SharedDevice, desc: TextureDesc) -> FxResult<Self> {
        let texture = Texture::new(device, desc)?;
        let id = device.create_framebuffer(texture.id())?;
        tracing::trace!(framebuffer = id.0, texture = texture.id().0, "framebuffer created");
        Ok(Self {
            device: device.clone(),
            id,
            texture,
        })
    }

    pub fn id(&self) -> FramebufferId {
        self.id
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn handle(&self) -> TextureRef {
        self.texture.handle()
    }

    /// Bind as the draw target and size the viewport to the attachment.
    pub fn bind(&self) -> FxResult<()> {
        self.device.bind_framebuffer(Some(self.id))?;
        let desc = self.texture.desc();
        self.device.set_viewport(desc.width, desc.height);
        Ok(())
    }

    /// Rebind the screen.
    pub fn unbind(&self) -> FxResult<()> {
        self.device.bind_framebuffer(None)?;
        let (w, h) = self.device.screen_size();
        self.device.set_viewport(w, h);
        Ok(())
    }

    pub fn clear(&self, color: Color) -> FxResult<()> {
        self.bind()?;
        self.device.clear(color)?;
        self.unbind()
    }

    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        tracing::trace!(framebuffer = self.id.0, "framebuffer released");
        self.device.delete_framebuffer(self.id);
    }
}
