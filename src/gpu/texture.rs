use crate::foundation::error::{FxError, FxResult};
use crate::gpu::device::{PixelData, SharedDevice, TextureDesc, TextureFormat, TextureId};

/// Read-only handle to a texture owned by some module.
///
/// Handles are what crosses module boundaries; the owning [`Texture`] stays with its module and a
/// handle outliving it simply fails to bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRef {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl TextureRef {
    pub fn bind(&self, device: &SharedDevice, unit: u32) -> FxResult<()> {
        device.bind_texture(self.id, unit)
    }

    pub fn draw_to_screen(&self, device: &SharedDevice) -> FxResult<()> {
        device.blit_to_screen(self.id)
    }
}

/// Fixed-size pixel buffer on the device. Released exactly once, on drop or [`Texture::dispose`].
pub struct Texture {
    device: SharedDevice,
    desc: TextureDesc,
    id: TextureId,
}

impl Texture {
    pub fn new(device: &SharedDevice, desc: TextureDesc) -> FxResult<Self> {
        if desc.width == 0 || desc.height == 0 {
            return Err(FxError::gpu(format!(
                "texture size must be non-zero, got {}x{}",
                desc.width, desc.height
            )));
        }
        let id = device.create_texture(desc)?;
        tracing::trace!(texture = id.0, width = desc.width, height = desc.height, "texture created");
        Ok(Self {
            device: device.clone(),
            desc,
            id,
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn desc(&self) -> TextureDesc {
        self.desc
    }

    pub fn handle(&self) -> TextureRef {
        TextureRef {
            id: self.id,
            width: self.desc.width,
            height: self.desc.height,
            format: self.desc.format,
        }
    }

    pub fn bind(&self, unit: u32) -> FxResult<()> {
        self.device.bind_texture(self.id, unit)
    }

    /// Replace the whole pixel buffer. Format and length must match the texture.
    pub fn update_data(&self, data: PixelData<'_>) -> FxResult<()> {
        if data.format() != self.desc.format {
            return Err(FxError::gpu(format!(
                "pixel data format {:?} does not match texture format {:?}",
                data.format(),
                self.desc.format
            )));
        }
        if data.channel_len() != self.desc.channel_len() {
            return Err(FxError::gpu(format!(
                "pixel data has {} channels, texture expects {}",
                data.channel_len(),
                self.desc.channel_len()
            )));
        }
        self.device.upload_texture(self.id, data)
    }

    pub fn draw_to_screen(&self) -> FxResult<()> {
        self.device.blit_to_screen(self.id)
    }

    /// Explicit release; consuming `self` makes a second dispose impossible.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        tracing::trace!(texture = self.id.0, "texture released");
        self.device.delete_texture(self.id);
    }
}
