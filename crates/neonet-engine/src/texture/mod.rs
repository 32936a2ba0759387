//! 2D textures: CPU decode and GPU upload.
//!
//! Loading is split so the CPU half can be exercised without a device:
//! [`TextureImage::decode`] reads, flips and builds the mip chain;
//! [`Texture2D::upload`] allocates and fills the GPU texture.

mod error;
mod decode;
mod texture2d;

use std::path::Path;

pub use error::TextureError;
pub use decode::{mip_level_count, TextureImage};
pub use texture2d::{bind_group_layout, Texture2D, TEXTURE_FORMAT};

/// Decodes `path` and uploads it as a new texture.
///
/// Decode failures propagate before anything is allocated on the GPU.
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: impl AsRef<Path>,
) -> Result<Texture2D, TextureError> {
    let path = path.as_ref();
    let image = TextureImage::decode(path)?;
    let texture = Texture2D::upload(device, queue, &path.display().to_string(), &image);
    log::info!(
        "loaded texture {} ({}x{}, {} mip levels)",
        path.display(),
        image.width(),
        image.height(),
        image.mip_levels().len()
    );
    Ok(texture)
}
