//! Elapsed-time throttling for expensive sub-draws.

/// Nominal frame length the cadences are expressed in.
pub const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

/// Fires once every `interval_ms` of accumulated frame time.
#[derive(Debug, Clone, PartialEq)]
pub struct Throttle {
    interval_ms: f64,
    accumulated_ms: f64,
}

impl Throttle {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms: interval_ms.max(0.0),
            accumulated_ms: 0.0,
        }
    }

    /// A throttle due every `frames` nominal frames.
    pub fn every_frames(frames: u32) -> Self {
        Self::new(NOMINAL_FRAME_MS * frames as f64)
    }

    /// Add `delta_ms` and report whether the throttle fired.
    ///
    /// Fires at most once per call; a long stall does not cause a burst.
    pub fn tick(&mut self, delta_ms: f64) -> bool {
        self.accumulated_ms += delta_ms.max(0.0);
        if self.accumulated_ms < self.interval_ms {
            return false;
        }
        self.accumulated_ms = if self.interval_ms > 0.0 {
            self.accumulated_ms % self.interval_ms
        } else {
            0.0
        };
        true
    }
}
