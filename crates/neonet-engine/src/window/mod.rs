//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, wires them to the GPU layer and
//! drives a [`Scene`](crate::core::Scene) through its lifecycle.

mod lifecycle;
mod runtime;

pub use lifecycle::{InvalidTransition, Lifecycle, LoopState};
pub use runtime::{Runtime, RuntimeConfig};
