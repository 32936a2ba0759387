use super::ctx::{FrameCtx, LoadCtx};
use crate::coords::Viewport;
use crate::time::GameTime;
use crate::window::RuntimeConfig;

/// Control directive returned by per-frame callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Lifecycle implemented by anything the runtime can drive.
///
/// Call order: `initialize` once before the window exists, `load_content`
/// once after the window and GPU are up, then `update` followed by `render`
/// every frame until the window closes or a callback returns
/// [`AppControl::Exit`].
pub trait Scene {
    /// Last chance to adjust the window configuration.
    fn initialize(&mut self, config: &mut RuntimeConfig) {
        let _ = config;
    }

    /// Creates GPU resources. An error stops the runtime before the first
    /// frame.
    fn load_content(&mut self, ctx: &mut LoadCtx<'_, '_>) -> anyhow::Result<()>;

    /// Advances simulation state.
    fn update(&mut self, time: &GameTime) -> AppControl;

    /// Records the frame, usually through [`FrameCtx::begin_pass`]. The
    /// runtime submits and presents it afterwards.
    fn render(&mut self, ctx: &mut FrameCtx<'_, '_>, time: &GameTime) -> AppControl;

    /// Called after the viewport has followed a window resize.
    fn resized(&mut self, viewport: Viewport) {
        let _ = viewport;
    }
}
