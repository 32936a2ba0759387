use winit::dpi::PhysicalSize;

/// Rendering viewport in physical pixels, origin at the top-left of the
/// surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole surface of the given size.
    #[inline]
    pub fn covering(size: PhysicalSize<u32>) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// A zero-area viewport (minimized window) must not be applied to a pass.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}
