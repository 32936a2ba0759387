/// Knobs for adapter, device and surface creation.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB swapchain format if the surface offers one.
    pub prefer_srgb: bool,

    /// Fifo is always available and syncs to the display.
    pub present_mode: wgpu::PresentMode,

    /// Requested compositing mode; falls back to the first supported one.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub power_preference: wgpu::PowerPreference,
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the presentation engine may queue ahead.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
