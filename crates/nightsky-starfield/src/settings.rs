//! Tunables for the starfield simulation.

use nightsky_core::AnimationSpeed;

/// Default number of general background stars.
pub const DEFAULT_STAR_COUNT: usize = 100;

/// Constellation lines are drawn every this many nominal frames.
pub const CONSTELLATION_LINE_FRAMES: u32 = 6;

/// Shooting stars are updated every this many nominal frames.
pub const SHOOTING_STAR_FRAMES: u32 = 9;

/// Settings for a [`crate::Starfield`].
#[derive(Debug, Clone, PartialEq)]
pub struct StarfieldSettings {
    /// General stars, not counting constellation members.
    pub star_count: usize,
    /// Twinkle speed multiplier.
    pub speed: AnimationSpeed,
    /// Draw the faint lines joining constellation stars.
    pub constellation_lines: bool,
    /// Spawn shooting stars.
    pub shooting_stars: bool,
    /// Fixed random seed; `None` seeds from the system clock.
    pub seed: Option<u64>,
    /// Shortest wait between shooting stars.
    pub spawn_interval_min_ms: u64,
    /// Longest wait between shooting stars.
    pub spawn_interval_max_ms: u64,
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            star_count: DEFAULT_STAR_COUNT,
            speed: AnimationSpeed::Normal,
            constellation_lines: true,
            shooting_stars: true,
            seed: None,
            spawn_interval_min_ms: 15_000,
            spawn_interval_max_ms: 25_000,
        }
    }
}

impl StarfieldSettings {
    /// Same settings with a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
