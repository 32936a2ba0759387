//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - tracking the rendering viewport across resizes
//! - acquiring frames and providing encoders/views for rendering

mod error;
mod frame;
mod gpu;
mod headless;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use headless::headless_device;
pub use init::GpuInit;
