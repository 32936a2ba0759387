//! Neonet engine crate.
//!
//! Window, render loop and GPU plumbing, plus the shader, texture and
//! resource-cache pieces scenes build on.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod resources;
pub mod shader;
pub mod texture;
