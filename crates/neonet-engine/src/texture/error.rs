use std::path::PathBuf;

/// Texture loading and usage errors.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {0} used after dispose")]
    Disposed(String),
}
