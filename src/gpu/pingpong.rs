use crate::foundation::color::Color;
use crate::foundation::error::FxResult;
use crate::gpu::device::{SharedDevice, TextureDesc};
use crate::gpu::framebuffer::Framebuffer;
use crate::gpu::texture::TextureRef;

/// Two same-sized render targets used for feedback passes.
///
/// One holds the latest result (`current`), the other is written next. A pass reads `current`,
/// draws into the write target, then [`PingPong::swap`] flips the roles, so a pass never samples
/// the texture it renders into.
pub struct PingPong {
    targets: [Framebuffer; 2],
    current: usize,
}

impl PingPong {
    pub fn new(device: &SharedDevice, desc: TextureDesc) -> FxResult<Self> {
        let first = Framebuffer::new(device, desc)?;
        let second = Framebuffer::new(device, desc)?;
        Ok(Self {
            targets: [first, second],
            current: 0,
        })
    }

    /// Target holding the most recent result.
    pub fn current(&self) -> &Framebuffer {
        &self.targets[self.current]
    }

    /// Target the next pass renders into.
    pub fn write_target(&self) -> &Framebuffer {
        &self.targets[1 - self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Clear both targets.
    pub fn clear(&self, color: Color) -> FxResult<()> {
        for fb in &self.targets {
            fb.clear(color)?;
        }
        Ok(())
    }

    /// Run one pass: bind the write target, call `draw` with the previous result, unbind, swap.
    ///
    /// On error the roles are left unchanged.
    pub fn render<F>(&mut self, draw: F) -> FxResult<()>
    where
        F: FnOnce(TextureRef) -> FxResult<()>,
    {
        let previous = self.current().handle();
        let target = self.write_target();
        target.bind()?;
        let drawn = draw(previous);
        target.unbind()?;
        drawn?;
        self.swap();
        Ok(())
    }

    /// Read handle of the current result.
    pub fn handle(&self) -> TextureRef {
        self.current().handle()
    }

    pub fn dispose(self) {
        drop(self);
    }
}
