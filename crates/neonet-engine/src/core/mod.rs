//! Core engine-facing contracts.
//!
//! Defines the interface between the runtime (platform loop) and scenes: the
//! `Scene` lifecycle and the contexts handed to its callbacks.

mod ctx;
mod scene;

pub use ctx::{FrameCtx, LoadCtx};
pub(crate) use ctx::open_pass;
pub use scene::{AppControl, Scene};
