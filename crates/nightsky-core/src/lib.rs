//! Core types shared by the nightsky crates.

use serde::{Deserialize, Serialize};

/// Pixel dimensions of a drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A viewport with no drawable area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check whether a point lies in `[0, width) x [0, height)`.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x < self.width && y >= 0.0 && y < self.height
    }
}

/// A single drawing instruction in surface pixel space.
///
/// Colors are always white over a black clear; only opacity varies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole surface with black.
    Clear,
    /// Filled circle centered on `(x, y)`.
    FillCircle {
        x: f32,
        y: f32,
        radius: f32,
        opacity: f32,
    },
    /// Straight line segment.
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        opacity: f32,
    },
}

/// Animation speed setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl AnimationSpeed {
    /// Cycle to the next speed.
    pub fn next(&self) -> Self {
        match self {
            AnimationSpeed::Slow => AnimationSpeed::Normal,
            AnimationSpeed::Normal => AnimationSpeed::Fast,
            AnimationSpeed::Fast => AnimationSpeed::Slow,
        }
    }

    /// Multiplier applied to every star's twinkle phase advance.
    pub fn twinkle_multiplier(&self) -> f32 {
        match self {
            AnimationSpeed::Slow => 0.5,
            AnimationSpeed::Normal => 1.0,
            AnimationSpeed::Fast => 2.0,
        }
    }

    /// Delay between frame callbacks in milliseconds.
    pub fn frame_interval_ms(&self) -> u64 {
        match self {
            AnimationSpeed::Slow => 50,
            AnimationSpeed::Normal => 33,
            AnimationSpeed::Fast => 16,
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            AnimationSpeed::Slow => "slow",
            AnimationSpeed::Normal => "normal",
            AnimationSpeed::Fast => "fast",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_contains() {
        let viewport = Viewport::new(1024.0, 768.0);
        assert!(viewport.contains(0.0, 0.0));
        assert!(viewport.contains(1023.9, 767.9));
        assert!(!viewport.contains(1024.0, 10.0));
        assert!(!viewport.contains(10.0, -0.1));
    }

    #[test]
    fn test_viewport_empty() {
        assert!(Viewport::new(0.0, 10.0).is_empty());
        assert!(Viewport::default().is_empty());
        assert!(!Viewport::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_speed_cycle() {
        let speed = AnimationSpeed::default();
        assert_eq!(speed, AnimationSpeed::Normal);
        assert_eq!(speed.next().next().next(), speed);
    }
}
