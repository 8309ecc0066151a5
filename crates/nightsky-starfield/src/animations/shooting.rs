//! Shooting stars (transient streaks).

use std::f32::consts::FRAC_PI_4;

use nightsky_core::{DrawCommand, Viewport};
use rand::Rng;

/// Opacity lost on every update.
pub const FADE_PER_STEP: f32 = 0.01;

/// Distance past the right/bottom edge before a streak is dropped.
pub const BOUNDS_MARGIN: f32 = 100.0;

/// Number of trailing points drawn behind the head.
pub const TAIL_POINTS: usize = 3;

/// Spacing between trailing points in pixels.
pub const TAIL_SPACING: f32 = 8.0;

const HEAD_RADIUS: f32 = 2.0;
const TAIL_RADIUS: f32 = 1.0;

/// A single shooting star.
#[derive(Debug, Clone, PartialEq)]
pub struct ShootingStar {
    /// Head position in pixels.
    pub x: f32,
    pub y: f32,
    /// Direction of travel in radians.
    pub angle: f32,
    /// Pixels travelled per update.
    pub speed: f32,
    /// Nominal streak length in pixels.
    pub length: f32,
    opacity: f32,
}

impl ShootingStar {
    pub fn new(x: f32, y: f32, angle: f32, speed: f32, length: f32) -> Self {
        Self {
            x,
            y,
            angle,
            speed,
            length,
            opacity: 1.0,
        }
    }

    /// Spawn at a random spot in the upper half, heading down and to the right.
    pub fn spawn<R: Rng + ?Sized>(viewport: Viewport, rng: &mut R) -> Self {
        Self::new(
            rng.random_range(0.0..viewport.width),
            rng.random_range(0.0..viewport.height * 0.5),
            rng.random_range(FRAC_PI_4..2.0 * FRAC_PI_4),
            rng.random_range(1.5..4.0),
            rng.random_range(30.0..90.0),
        )
    }

    /// Remaining opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Move along the heading and fade.
    pub fn advance(&mut self) {
        self.x += self.angle.cos() * self.speed;
        self.y += self.angle.sin() * self.speed;
        self.opacity = (self.opacity - FADE_PER_STEP).max(0.0);
    }

    /// Faded out or past the right/bottom margin.
    pub fn is_expired(&self, viewport: Viewport) -> bool {
        self.opacity <= 0.0
            || self.x > viewport.width + BOUNDS_MARGIN
            || self.y > viewport.height + BOUNDS_MARGIN
    }

    /// Head circle followed by the fading tail points.
    pub fn draw_commands(&self) -> impl Iterator<Item = DrawCommand> + '_ {
        let head = DrawCommand::FillCircle {
            x: self.x,
            y: self.y,
            radius: HEAD_RADIUS,
            opacity: self.opacity * 0.8,
        };
        let (sin, cos) = self.angle.sin_cos();
        let tail = (1..=TAIL_POINTS).map(move |i| {
            let back = i as f32 * TAIL_SPACING;
            DrawCommand::FillCircle {
                x: self.x - cos * back,
                y: self.y - sin * back,
                radius: TAIL_RADIUS,
                opacity: self.opacity * (0.6 - i as f32 * 0.2),
            }
        });
        std::iter::once(head).chain(tail)
    }
}

/// Decides when the next shooting star appears.
///
/// The wait is drawn from `[min_ms, max_ms]` once per spawn and measured
/// from the first observed timestamp, then from each spawn.
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    min_ms: f64,
    max_ms: f64,
    last_spawn_ms: Option<f64>,
    next_interval_ms: f64,
}

impl SpawnTimer {
    pub fn new<R: Rng + ?Sized>(min_ms: f64, max_ms: f64, rng: &mut R) -> Self {
        let (min_ms, max_ms) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            min_ms,
            max_ms,
            last_spawn_ms: None,
            next_interval_ms: rng.random_range(min_ms..=max_ms),
        }
    }

    /// Current wait before the next spawn.
    pub fn next_interval_ms(&self) -> f64 {
        self.next_interval_ms
    }

    /// Returns true when a shooting star should spawn at `now_ms`.
    pub fn poll<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> bool {
        let Some(last) = self.last_spawn_ms else {
            self.last_spawn_ms = Some(now_ms);
            return false;
        };
        if now_ms - last < self.next_interval_ms {
            return false;
        }
        self.last_spawn_ms = Some(now_ms);
        self.next_interval_ms = rng.random_range(self.min_ms..=self.max_ms);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_spawn_in_upper_half() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let s = ShootingStar::spawn(VIEWPORT, &mut rng);
            assert!((0.0..800.0).contains(&s.x));
            assert!((0.0..300.0).contains(&s.y));
            assert!(s.angle >= FRAC_PI_4 && s.angle < 2.0 * FRAC_PI_4);
            assert_eq!(s.opacity(), 1.0);
        }
    }

    #[test]
    fn test_opacity_never_increases_and_expires() {
        // Horizontal and slow, so only fading can remove it
        let mut s = ShootingStar::new(0.0, 0.0, 0.0, 0.1, 40.0);
        let mut previous = s.opacity();
        let mut steps = 0;
        while !s.is_expired(VIEWPORT) {
            s.advance();
            assert!(s.opacity() <= previous);
            previous = s.opacity();
            steps += 1;
            assert!(steps <= 101, "never faded");
        }
        assert_eq!(s.opacity(), 0.0);
        assert!(steps >= 99);
    }

    #[test]
    fn test_expires_past_margins() {
        let right = ShootingStar::new(900.1, 10.0, 0.0, 1.0, 40.0);
        let bottom = ShootingStar::new(10.0, 700.1, 0.0, 1.0, 40.0);
        let edge = ShootingStar::new(900.0, 700.0, 0.0, 1.0, 40.0);
        assert!(right.is_expired(VIEWPORT));
        assert!(bottom.is_expired(VIEWPORT));
        assert!(!edge.is_expired(VIEWPORT));
    }

    #[test]
    fn test_tail_trails_behind_head() {
        let s = ShootingStar::new(100.0, 100.0, 0.0, 2.0, 40.0);
        let commands: Vec<_> = s.draw_commands().collect();
        assert_eq!(commands.len(), 1 + TAIL_POINTS);

        let DrawCommand::FillCircle { x, opacity, .. } = commands[0] else {
            panic!("head should be a circle");
        };
        assert_eq!(x, 100.0);
        assert!((opacity - 0.8).abs() < 1e-6);

        let mut last_x = x;
        let mut last_opacity = opacity;
        for command in &commands[1..] {
            let DrawCommand::FillCircle { x, opacity, .. } = *command else {
                panic!("tail should be circles");
            };
            assert!(x < last_x);
            assert!(opacity < last_opacity);
            last_x = x;
            last_opacity = opacity;
        }
    }

    #[test]
    fn test_spawn_timer_waits_full_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut timer = SpawnTimer::new(15_000.0, 25_000.0, &mut rng);
        let interval = timer.next_interval_ms();
        assert!((15_000.0..=25_000.0).contains(&interval));

        assert!(!timer.poll(1_000.0, &mut rng));
        assert!(!timer.poll(1_000.0 + interval - 1.0, &mut rng));
        assert!(timer.poll(1_000.0 + interval, &mut rng));
        // Interval restarts from the spawn
        assert!(!timer.poll(1_000.0 + interval + 14_999.0, &mut rng));
    }

    #[test]
    fn test_spawn_timer_swaps_reversed_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let timer = SpawnTimer::new(500.0, 100.0, &mut rng);
        assert!((100.0..=500.0).contains(&timer.next_interval_ms()));
    }
}
