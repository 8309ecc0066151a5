//! Twinkling stars and the tiers they belong to.

use std::f32::consts::TAU;

use nightsky_core::Viewport;
use rand::Rng;

/// Extra wrap distance below the surface so parallax stars re-enter smoothly.
pub const PARALLAX_WRAP_MARGIN: f32 = 100.0;

/// Visual tier of a star.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Background star drifting slowly with scroll.
    SlowParallax,
    /// Background star drifting faster with scroll.
    FastParallax,
    /// Fixed, glowing constellation member.
    Constellation,
}

impl Tier {
    /// Vertical shift per pixel of scroll.
    pub fn parallax_factor(&self) -> f32 {
        match self {
            Tier::SlowParallax => 0.02,
            Tier::FastParallax => 0.05,
            Tier::Constellation => 0.0,
        }
    }

    /// Center and amplitude of the twinkle modulation.
    fn twinkle_band(&self) -> (f32, f32) {
        match self {
            Tier::SlowParallax | Tier::FastParallax => (0.7, 0.3),
            Tier::Constellation => (0.75, 0.25),
        }
    }

    /// Allowed drawn opacity range.
    pub fn opacity_range(&self) -> (f32, f32) {
        match self {
            Tier::SlowParallax | Tier::FastParallax => (0.3, 0.9),
            Tier::Constellation => (0.4, 1.0),
        }
    }
}

/// A single star on the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels, before parallax.
    pub y: f32,
    /// Circle radius in pixels.
    pub radius: f32,
    /// Brightness the twinkle modulates around.
    pub base_brightness: f32,
    /// Phase advance per frame.
    pub twinkle_speed: f32,
    /// Visual tier.
    pub tier: Tier,
    phase: f32,
    brightness: f32,
}

impl Star {
    pub fn new(
        x: f32,
        y: f32,
        radius: f32,
        base_brightness: f32,
        twinkle_speed: f32,
        phase: f32,
        tier: Tier,
    ) -> Self {
        Self {
            x,
            y,
            radius,
            base_brightness,
            twinkle_speed,
            tier,
            phase: phase.rem_euclid(TAU),
            brightness: base_brightness,
        }
    }

    /// Current twinkle phase in `[0, 2π)`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Current modulated brightness.
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Advance the twinkle by one frame and recompute brightness.
    pub fn advance(&mut self, multiplier: f32) {
        self.phase = (self.phase + self.twinkle_speed * multiplier).rem_euclid(TAU);
        let (center, amplitude) = self.tier.twinkle_band();
        self.brightness = self.base_brightness * (center + amplitude * self.phase.sin());
    }

    /// Opacity to draw with, clamped to the tier's range.
    pub fn opacity(&self) -> f32 {
        let (lo, hi) = self.tier.opacity_range();
        self.brightness.clamp(lo, hi)
    }

    /// Drawn vertical position after scroll parallax.
    ///
    /// Background tiers wrap modulo `height + PARALLAX_WRAP_MARGIN`;
    /// constellation stars never move.
    pub fn parallax_y(&self, scroll_y: f32, height: f32) -> f32 {
        match self.tier {
            Tier::Constellation => self.y,
            tier => {
                (self.y + scroll_y * tier.parallax_factor())
                    .rem_euclid(height + PARALLAX_WRAP_MARGIN)
            }
        }
    }
}

/// Generate `count` background stars spread over the viewport.
pub fn generate_field<R: Rng + ?Sized>(
    count: usize,
    viewport: Viewport,
    rng: &mut R,
) -> Vec<Star> {
    (0..count)
        .map(|_| {
            // Roughly 40% of the field drifts on the faster layer
            let tier = if rng.random_bool(0.4) {
                Tier::FastParallax
            } else {
                Tier::SlowParallax
            };
            Star::new(
                rng.random_range(0.0..viewport.width),
                rng.random_range(0.0..viewport.height),
                rng.random_range(0.8..2.3),
                rng.random_range(0.3..0.9),
                rng.random_range(0.005..0.025),
                rng.random_range(0.0..TAU),
                tier,
            )
        })
        .collect()
}
