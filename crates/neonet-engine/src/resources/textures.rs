use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::ResourceCache;
use crate::texture::{load_texture, Texture2D, TextureError};

/// Texture cache keyed by name, resolved against an optional root directory.
///
/// `load("character.png")` with root `res/textures` reads
/// `res/textures/character.png` on the first call and returns the memoized
/// texture afterwards.
#[derive(Default)]
pub struct TextureCache {
    root: Option<PathBuf>,
    cache: ResourceCache<Texture2D>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            cache: ResourceCache::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// File path a texture name resolves to.
    pub fn resolve(&self, name: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(name),
            None => PathBuf::from(name),
        }
    }

    /// Returns the texture for `name`, decoding and uploading it on a miss.
    pub fn load(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
    ) -> Result<Arc<Texture2D>, TextureError> {
        self.cache
            .get_or_load(name, |name| load_texture(device, queue, self.resolve(name)))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Texture2D>> {
        self.cache.get(name)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Releases every cached texture not referenced elsewhere.
    pub fn clear(&self) {
        let count = self.cache.len();
        self.cache.clear();
        if count > 0 {
            log::debug!("released {count} cached textures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless_device;
    use image::RgbaImage;

    #[test]
    fn resolve_joins_root() {
        let cache = TextureCache::with_root("res/textures");
        assert_eq!(cache.resolve("wall.png"), Path::new("res/textures/wall.png"));
        assert_eq!(TextureCache::new().resolve("wall.png"), Path::new("wall.png"));
    }

    #[test]
    fn load_memoizes_gpu_texture() {
        let Ok((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return;
        };

        let dir = tempfile::tempdir().unwrap();
        RgbaImage::new(2, 2).save(dir.path().join("tile.png")).unwrap();
        let cache = TextureCache::with_root(dir.path());

        let a = cache.load(&device, &queue, "tile.png").unwrap();
        let b = cache.load(&device, &queue, "tile.png").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_texture_error_propagates() {
        let Ok((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return;
        };

        let dir = tempfile::tempdir().unwrap();
        let cache = TextureCache::with_root(dir.path());
        let err = cache.load(&device, &queue, "nope.png").unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(cache.is_empty());
    }
}
