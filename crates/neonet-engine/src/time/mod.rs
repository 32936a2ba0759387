//! Frame timing.
//!
//! One `FrameClock` per render loop; `tick()` once per frame yields the
//! `GameTime` handed to the scene's update and render callbacks.

mod frame_clock;

pub use frame_clock::{FrameClock, GameTime};
