use super::{TextureError, TextureImage};

/// GPU format every loaded texture uses.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Bind group layout shared by all `Texture2D`s:
/// binding 0 = 2D float texture, binding 1 = filtering sampler.
///
/// Pipelines that sample textures include this layout at the group index they
/// pass to [`Texture2D::bind`]. Identical layouts are interchangeable in wgpu,
/// so creating it more than once is fine.
pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("neonet texture2d bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

struct GpuTexture {
    texture: wgpu::Texture,
    // Held for the bind group's lifetime.
    _view: wgpu::TextureView,
    _sampler: wgpu::Sampler,
    bind_group: wgpu::BindGroup,
}

/// A GPU-resident 2D texture with its sampler and bind group.
///
/// Released on [`dispose`](Self::dispose) or drop, whichever comes first.
pub struct Texture2D {
    name: String,
    width: u32,
    height: u32,
    mip_level_count: u32,
    gpu: Option<GpuTexture>,
}

impl Texture2D {
    /// Allocates a texture for `image` and writes every mip level.
    ///
    /// Sampling is fixed: nearest filtering (including between mip levels),
    /// repeat wrapping on both axes.
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        image: &TextureImage,
    ) -> Self {
        let levels = image.mip_levels();
        let mip_level_count = levels.len() as u32;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: image.width(),
                height: image.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, pixels) in levels.iter().enumerate() {
            let (w, h) = pixels.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                pixels.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(name),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &bind_group_layout(device),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            name: name.to_string(),
            width: image.width(),
            height: image.height(),
            mip_level_count,
            gpu: Some(GpuTexture {
                texture,
                _view: view,
                _sampler: sampler,
                bind_group,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    pub fn is_disposed(&self) -> bool {
        self.gpu.is_none()
    }

    /// Binds the texture and its sampler at bind group `index` of `pass`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, index: u32) -> Result<(), TextureError> {
        let gpu = self
            .gpu
            .as_ref()
            .ok_or_else(|| TextureError::Disposed(self.name.clone()))?;
        pass.set_bind_group(index, &gpu.bind_group, &[]);
        Ok(())
    }

    /// Releases the GPU texture. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.texture.destroy();
            log::debug!("disposed texture {}", self.name);
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture2D")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mip_level_count", &self.mip_level_count)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless_device;
    use image::RgbaImage;

    #[test]
    fn upload_then_dispose_is_idempotent() {
        let Ok((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return;
        };

        let image = TextureImage::from_rgba(RgbaImage::new(4, 4));
        let mut tex = Texture2D::upload(&device, &queue, "checker", &image);
        assert_eq!(tex.size(), (4, 4));
        assert_eq!(tex.mip_level_count(), 3);
        assert!(!tex.is_disposed());

        tex.dispose();
        assert!(tex.is_disposed());
        tex.dispose();
        assert!(tex.is_disposed());
    }
}
