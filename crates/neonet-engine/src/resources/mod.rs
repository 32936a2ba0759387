//! Name-keyed resource caches.
//!
//! Caches are plain values owned by whoever composes the application (the
//! runtime owns the texture cache for its window) and lent out by reference.
//! There is no process-wide instance.

mod cache;
mod textures;

pub use cache::ResourceCache;
pub use textures::TextureCache;
