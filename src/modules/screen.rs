use crate::foundation::color::Color;
use crate::foundation::error::{FxError, FxResult};
use crate::foundation::value::Value;
use crate::gpu::SharedDevice;
use crate::graph::{GraphRuntime, TickHandlerId, TickReport};

/// Tick handler that presents one node's texture output on the screen.
///
/// While the node has no texture yet (unknown id, or still at its `Null` default) the screen is
/// cleared to the background color.
pub struct ScreenCompositor {
    device: SharedDevice,
    node_id: String,
    background: Color,
}

impl ScreenCompositor {
    pub fn new(device: SharedDevice, node_id: impl Into<String>) -> Self {
        Self {
            device,
            node_id: node_id.into(),
            background: Color::BLACK,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn present(&self, report: &TickReport<'_>) -> FxResult<()> {
        match report.output(&self.node_id) {
            Some(Value::Texture(t)) => t.draw_to_screen(&self.device),
            None | Some(Value::Null) => {
                self.device.bind_framebuffer(None)?;
                self.device.clear(self.background)
            }
            Some(other) => Err(FxError::module(format!(
                "node '{}' outputs a {}, not a texture",
                self.node_id,
                other.kind_name()
            ))),
        }
    }

    /// Register on `runtime`; remove with [`GraphRuntime::remove_tick_handler`].
    pub fn attach(self, runtime: &mut GraphRuntime) -> TickHandlerId {
        runtime.add_tick_handler(move |report| self.present(report))
    }
}
