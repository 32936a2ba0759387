use std::time::Instant;

use crate::time::{FrameClock, GameTime};

/// Render loop state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Before content is loaded. `Scene::initialize` runs here.
    Uninitialized,
    /// Content loaded; no frame drawn yet.
    Loaded,
    /// At least one frame has started.
    Running,
    /// Terminal.
    Stopped,
}

impl LoopState {
    pub fn can_transition_to(self, next: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, next),
            (Uninitialized, Loaded) | (Loaded, Running) | (Uninitialized | Loaded | Running, Stopped)
        )
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("invalid render loop transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: LoopState,
    pub to: LoopState,
}

/// Loop state plus the frame clock, independent of any window.
///
/// The runtime asks [`begin_frame`](Self::begin_frame) for a `GameTime` on
/// every redraw and only drives the scene when it gets one.
#[derive(Debug)]
pub struct Lifecycle {
    state: LoopState,
    clock: FrameClock,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LoopState::Uninitialized,
            clock: FrameClock::new(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    fn transition(&mut self, to: LoopState) -> Result<(), InvalidTransition> {
        if !self.state.can_transition_to(to) {
            return Err(InvalidTransition { from: self.state, to });
        }
        log::debug!("render loop {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Marks content as loaded. The first frame's delta is measured from `now`.
    pub fn mark_loaded(&mut self, now: Instant) -> Result<(), InvalidTransition> {
        self.transition(LoopState::Loaded)?;
        self.clock.reset_at(now);
        Ok(())
    }

    /// Ticks the clock for a frame starting at `now`.
    ///
    /// Returns `None` unless content is loaded and the loop has not stopped.
    pub fn begin_frame(&mut self, now: Instant) -> Option<GameTime> {
        match self.state {
            LoopState::Loaded => {
                self.state = LoopState::Running;
            }
            LoopState::Running => {}
            LoopState::Uninitialized | LoopState::Stopped => return None,
        }
        Some(self.clock.tick_at(now))
    }

    /// Stops the loop. Stopping twice is harmless.
    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            // Every non-terminal state may stop.
            let _ = self.transition(LoopState::Stopped);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.state == LoopState::Stopped
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
