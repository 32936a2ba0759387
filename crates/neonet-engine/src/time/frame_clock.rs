use std::time::{Duration, Instant};

/// Timing snapshot for one frame.
///
/// `elapsed` is the wall-clock time since the previous frame; `total` is the
/// running sum of every `elapsed` since the loop started.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct GameTime {
    pub elapsed: Duration,
    pub total: Duration,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

impl GameTime {
    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    #[inline]
    pub fn total_secs(&self) -> f64 {
        self.total.as_secs_f64()
    }
}

/// Frame clock producing `GameTime` snapshots.
///
/// Deltas are not clamped: a long stall shows up as one long `elapsed`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    total: Duration,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose first delta is measured from `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last: start,
            total: Duration::ZERO,
            frame_index: 0,
        }
    }

    /// Moves the delta baseline to `now` without touching the accumulated
    /// total or the frame counter.
    ///
    /// The runtime calls this once content is loaded so asset I/O does not
    /// show up as the first frame's delta.
    pub fn reset_at(&mut self, now: Instant) {
        self.last = now;
    }

    /// Advances the clock to `now`.
    ///
    /// A `now` earlier than the previous tick yields a zero delta.
    pub fn tick_at(&mut self, now: Instant) -> GameTime {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        self.total += elapsed;

        let time = GameTime {
            elapsed,
            total: self.total,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }

    /// Total time accumulated so far.
    pub fn total(&self) -> Duration {
        self.total
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn first_tick_measures_from_start() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let t = clock.tick_at(start + ms(16));
        assert_eq!(t.elapsed, ms(16));
        assert_eq!(t.total, ms(16));
        assert_eq!(t.frame_index, 0);
    }

    #[test]
    fn total_is_sum_of_elapsed() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let mut sum = Duration::ZERO;
        let mut at = start;
        for step in [5, 16, 33, 1, 250] {
            at += ms(step);
            let t = clock.tick_at(at);
            assert_eq!(t.elapsed, ms(step));
            sum += t.elapsed;
            assert_eq!(t.total, sum);
        }
        assert_eq!(clock.total(), ms(305));
    }

    #[test]
    fn frame_index_increments() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let a = clock.tick_at(start + ms(1));
        let b = clock.tick_at(start + ms(2));
        assert_eq!(a.frame_index + 1, b.frame_index);
    }

    #[test]
    fn reset_moves_baseline_only() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + ms(10));

        clock.reset_at(start + ms(500));
        let t = clock.tick_at(start + ms(516));
        assert_eq!(t.elapsed, ms(16));
        assert_eq!(t.total, ms(26));
        assert_eq!(t.frame_index, 1);
    }

    #[test]
    fn backwards_instant_gives_zero_delta() {
        let start = Instant::now() + ms(100);
        let mut clock = FrameClock::starting_at(start);
        let t = clock.tick_at(start - ms(10));
        assert_eq!(t.elapsed, Duration::ZERO);
        assert_eq!(t.total, Duration::ZERO);
    }
}
