use std::sync::Arc;

use winit::window::Window;

use crate::coords::Viewport;
use crate::device::{Gpu, GpuFrame};
use crate::paint::Color;
use crate::resources::TextureCache;
use crate::shader::{GpuShaderProgram, PipelineConfig, ShaderError, WgpuShaderBackend};
use crate::texture::{Texture2D, TextureError};

/// Context passed to [`Scene::load_content`](super::Scene::load_content).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct LoadCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a Gpu<'w>,
    pub textures: &'a TextureCache,
}

impl<'a, 'w> LoadCtx<'a, 'w> {
    pub fn device(&self) -> &wgpu::Device {
        self.gpu.device()
    }

    pub fn queue(&self) -> &wgpu::Queue {
        self.gpu.queue()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.gpu.surface_format()
    }

    /// Resolves a texture through the runtime's cache.
    pub fn load_texture(&self, name: &str) -> Result<Arc<Texture2D>, TextureError> {
        self.textures.load(self.gpu.device(), self.gpu.queue(), name)
    }

    /// Compiles `program` against this window's device.
    pub fn compile(
        &self,
        program: &mut GpuShaderProgram,
        config: PipelineConfig<'_>,
    ) -> Result<(), ShaderError> {
        program.compile(&WgpuShaderBackend::new(self.gpu.device(), config))
    }
}

/// Context passed to [`Scene::render`](super::Scene::render).
///
/// The runtime has already acquired the frame and presents it once `render`
/// returns. A scene that opens no pass still gets a frame cleared to
/// `RuntimeConfig::clear_color`.
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub gpu: &'a Gpu<'w>,
    pub textures: &'a TextureCache,
    frame: &'a mut GpuFrame,
    cleared: bool,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    pub fn new(
        window: &'a Window,
        gpu: &'a Gpu<'w>,
        textures: &'a TextureCache,
        frame: &'a mut GpuFrame,
    ) -> Self {
        Self {
            window,
            gpu,
            textures,
            frame,
            cleared: false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.gpu.viewport()
    }

    /// Opens a render pass on the frame that clears to `clear` and maps draws
    /// to the current viewport.
    pub fn begin_pass(&mut self, clear: Color) -> wgpu::RenderPass<'_> {
        self.cleared = true;
        let viewport = self.gpu.viewport();
        let GpuFrame { view, encoder, .. } = &mut *self.frame;
        open_pass(encoder, view, clear, viewport)
    }

    /// Whether a clearing pass has been recorded this frame.
    pub fn is_cleared(&self) -> bool {
        self.cleared
    }
}

/// Records a pass into `encoder` that clears `view` to `clear`, with the
/// viewport set unless it is empty.
pub(crate) fn open_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    clear: Color,
    viewport: Viewport,
) -> wgpu::RenderPass<'e> {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("neonet frame pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear.into()),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
        multiview_mask: None,
    });

    if !viewport.is_empty() {
        pass.set_viewport(
            viewport.x as f32,
            viewport.y as f32,
            viewport.width as f32,
            viewport.height as f32,
            0.0,
            1.0,
        );
    }

    pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless_device;

    const SIZE: u32 = 4;
    // Copy rows must be 256-byte aligned.
    const ROW_BYTES: u32 = 256;

    /// Clears an offscreen target through `open_pass` and reads back the
    /// top-left pixel.
    fn cleared_pixel(clear: Color, viewport: Viewport) -> Option<[u8; 4]> {
        let Ok((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return None;
        };

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("clear target"),
            size: wgpu::Extent3d { width: SIZE, height: SIZE, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("clear readback"),
            size: (ROW_BYTES * SIZE) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
        drop(open_pass(&mut encoder, &view, clear, viewport));
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(ROW_BYTES),
                    rows_per_image: Some(SIZE),
                },
            },
            wgpu::Extent3d { width: SIZE, height: SIZE, depth_or_array_layers: 1 },
        );
        queue.submit(std::iter::once(encoder.finish()));

        readback.map_async(wgpu::MapMode::Read, .., |r| r.unwrap());
        device.poll(wgpu::PollType::wait_indefinitely()).unwrap();

        let bytes = readback.get_mapped_range(..);
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn pass_clears_to_requested_color() {
        let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
        let viewport = Viewport::new(0, 0, SIZE, SIZE);
        if let Some(pixel) = cleared_pixel(red, viewport) {
            assert_eq!(pixel, [255, 0, 0, 255]);
        }
    }

    #[test]
    fn empty_viewport_still_clears() {
        let viewport = Viewport::new(0, 0, 0, 0);
        if let Some(pixel) = cleared_pixel(Color::BLACK, viewport) {
            assert_eq!(pixel, [0, 0, 0, 255]);
        }
    }
}
