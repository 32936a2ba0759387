use anyhow::{Context, Result};

/// Creates a device/queue pair without a window or surface.
///
/// Used for offscreen work and tests; fails on machines with no usable
/// adapter (including software fallbacks).
pub fn headless_device() -> Result<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });

    pollster::block_on(async {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter available")?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("neonet headless device"),
                ..Default::default()
            })
            .await
            .context("failed to create headless wgpu device")
    })
}
