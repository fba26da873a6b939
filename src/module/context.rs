use crate::foundation::error::{FxError, FxResult};
use crate::foundation::time::Clock;
use crate::gpu::{SharedDevice, TextureDesc, TextureFormat};

/// Render settings shared by every module a runtime creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeOpts {
    /// Width of GL module render targets, in pixels.
    pub width: u32,
    /// Height of GL module render targets, in pixels.
    pub height: u32,
    /// Channel format of GL module render targets.
    pub format: TextureFormat,
}

impl Default for RuntimeOpts {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            format: TextureFormat::Rgba8,
        }
    }
}

impl RuntimeOpts {
    pub fn target_desc(&self) -> TextureDesc {
        TextureDesc::new(self.width, self.height, self.format)
    }
}

/// Handed to a module factory.
#[derive(Clone)]
pub struct FactoryContext {
    pub device: Option<SharedDevice>,
    pub opts: RuntimeOpts,
}

impl FactoryContext {
    /// The device, or a [`FxError::GpuResource`] for runtimes built without one.
    pub fn require_device(&self) -> FxResult<&SharedDevice> {
        self.device
            .as_ref()
            .ok_or_else(|| FxError::gpu("module requires a graphics device"))
    }
}

/// Handed to [`crate::module::ModuleInstance::update`] every tick.
#[derive(Clone, Copy)]
pub struct UpdateContext<'a> {
    pub clock: &'a dyn Clock,
    /// Index of the running tick, starting at 0.
    pub tick: u64,
}
