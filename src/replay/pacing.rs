//! Inter-frame delay computation.

use std::time::Duration;

/// Deltas at or above this many seconds are treated as capture artifacts
/// (corrupt timestamps, multi-day gaps) and applied as zero wait, bounding
/// worst-case total replay time.
pub const MAX_INTER_FRAME_DELAY_SECS: f64 = 10.0;

/// Wait to apply between two consecutive frames when preserving timing.
///
/// The delta is honored only in the open interval (0, 10) seconds:
/// non-positive deltas (out-of-order or duplicate timestamps) and clamped
/// deltas both map to zero.
pub fn inter_frame_delay(previous: f64, current: f64) -> Duration {
    let delta = current - previous;
    if delta > 0.0 && delta < MAX_INTER_FRAME_DELAY_SECS {
        Duration::from_secs_f64(delta)
    } else {
        Duration::ZERO
    }
}

/// Courtesy throttle applied in fast (non-timing-preserving) mode so the
/// driver queue is not overwhelmed. The original heuristic paused 1ms every
/// 100th frame with no stated rationale; both knobs are tunable and the
/// throttle can be disabled outright.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleConfig {
    /// Pause after every Nth frame. Zero disables the throttle.
    pub every: u64,
    pub pause: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            every: 100,
            pause: Duration::from_millis(1),
        }
    }
}

impl ThrottleConfig {
    pub const DISABLED: Self = Self {
        every: 0,
        pause: Duration::ZERO,
    };

    /// The pause owed after sending the frame at `index` (1-based), if any.
    pub fn pause_after(&self, index: u64) -> Option<Duration> {
        if self.every > 0 && index % self.every == 0 {
            Some(self.pause)
        } else {
            None
        }
    }
}
