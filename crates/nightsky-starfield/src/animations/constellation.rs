//! Fixed constellation patterns.

use std::f32::consts::TAU;
use std::ops::Range;

use nightsky_core::Viewport;
use rand::Rng;

use super::star::{Star, Tier};

/// Radius of every constellation star.
pub const MEMBER_RADIUS: f32 = 1.8;

/// Brightness boost applied to pattern brightness.
pub const MEMBER_BRIGHTNESS_BOOST: f32 = 1.5;

/// Twinkle speed shared by all constellation stars.
pub const MEMBER_TWINKLE_SPEED: f32 = 0.008;

/// Opacity of connecting lines.
pub const LINE_OPACITY: f32 = 0.15;

/// Width of connecting lines.
pub const LINE_WIDTH: f32 = 0.3;

/// A point of a constellation in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationPoint {
    pub x: f32,
    pub y: f32,
    pub brightness: f32,
}

const fn point(x: f32, y: f32, brightness: f32) -> ConstellationPoint {
    ConstellationPoint { x, y, brightness }
}

/// A named cluster of stars and the pairs joined by lines.
#[derive(Debug, PartialEq)]
pub struct Constellation {
    pub name: &'static str,
    pub points: &'static [ConstellationPoint],
    pub connections: &'static [(usize, usize)],
}

/// All constellations drawn on the sky.
pub static CONSTELLATIONS: [Constellation; 3] = [
    Constellation {
        name: "Northern Cross",
        points: &[
            point(0.2, 0.3, 0.4),
            point(0.25, 0.25, 0.35),
            point(0.3, 0.3, 0.4),
            point(0.25, 0.35, 0.3),
            point(0.25, 0.4, 0.35),
        ],
        connections: &[(0, 2), (1, 3), (3, 4)],
    },
    Constellation {
        name: "Southern Triangle",
        points: &[
            point(0.7, 0.6, 0.35),
            point(0.75, 0.7, 0.4),
            point(0.8, 0.6, 0.3),
        ],
        connections: &[(0, 1), (1, 2), (2, 0)],
    },
    Constellation {
        name: "Diamond",
        points: &[
            point(0.5, 0.15, 0.4),
            point(0.45, 0.2, 0.35),
            point(0.55, 0.2, 0.35),
            point(0.5, 0.25, 0.3),
        ],
        connections: &[(0, 1), (0, 2), (1, 3), (2, 3)],
    },
];

/// Total number of constellation stars across all patterns.
pub fn member_count() -> usize {
    CONSTELLATIONS.iter().map(|c| c.points.len()).sum()
}

/// Where a constellation's members sit inside the star population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationSpan {
    pub constellation: &'static Constellation,
    pub start: usize,
}

impl ConstellationSpan {
    /// Index range of the members in the population.
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.constellation.points.len()
    }

    /// Star pairs to connect with a line.
    ///
    /// Pairs pointing outside the population are skipped.
    pub fn segments<'a>(&self, stars: &'a [Star]) -> impl Iterator<Item = (&'a Star, &'a Star)> {
        let start = self.start;
        self.constellation
            .connections
            .iter()
            .filter_map(move |&(a, b)| Some((stars.get(start + a)?, stars.get(start + b)?)))
    }
}

/// Append every constellation's members to `stars`, scaled to `viewport`.
pub fn materialize<R: Rng + ?Sized>(
    viewport: Viewport,
    stars: &mut Vec<Star>,
    rng: &mut R,
) -> Vec<ConstellationSpan> {
    CONSTELLATIONS
        .iter()
        .map(|constellation| {
            let start = stars.len();
            stars.extend(constellation.points.iter().map(|p| {
                Star::new(
                    p.x * viewport.width,
                    p.y * viewport.height,
                    MEMBER_RADIUS,
                    p.brightness * MEMBER_BRIGHTNESS_BOOST,
                    MEMBER_TWINKLE_SPEED,
                    rng.random_range(0.0..TAU),
                    Tier::Constellation,
                )
            }));
            ConstellationSpan {
                constellation,
                start,
            }
        })
        .collect()
}
