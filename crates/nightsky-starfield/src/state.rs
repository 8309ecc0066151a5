//! Starfield simulation state.

use log::debug;
use nightsky_core::{AnimationSpeed, DrawCommand, Viewport};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::animations::constellation::{self, ConstellationSpan, LINE_OPACITY, LINE_WIDTH};
use crate::animations::shooting::{ShootingStar, SpawnTimer};
use crate::animations::star::{self, Star, Tier};
use crate::settings::{CONSTELLATION_LINE_FRAMES, SHOOTING_STAR_FRAMES, StarfieldSettings};
use crate::throttle::Throttle;

/// Throttled sub-draws that are due on the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePlan {
    /// Draw constellation lines.
    pub constellation_lines: bool,
    /// Draw (and update) shooting stars.
    pub shooting_stars: bool,
}

/// The whole sky: star population, constellations and shooting stars.
#[derive(Debug)]
pub struct Starfield {
    /// Surface size the population was generated for.
    viewport: Viewport,
    settings: StarfieldSettings,
    /// General stars first, then constellation members.
    stars: Vec<Star>,
    /// Slices of `stars` contributed by each constellation.
    spans: Vec<ConstellationSpan>,
    shooting_stars: Vec<ShootingStar>,
    /// Streaks as they were before the last shooting-star update.
    shooting_frame: Vec<DrawCommand>,
    rng: ChaCha8Rng,
    spawn_timer: SpawnTimer,
    line_cadence: Throttle,
    shooting_cadence: Throttle,
    last_frame_ms: Option<f64>,
    scroll_y: f32,
    plan: FramePlan,
    spawned: usize,
}

impl Starfield {
    /// Create a starfield and populate it for `viewport`.
    pub fn new(viewport: Viewport, settings: StarfieldSettings) -> Self {
        let seed = settings.seed.unwrap_or_else(time_seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let spawn_timer = SpawnTimer::new(
            settings.spawn_interval_min_ms as f64,
            settings.spawn_interval_max_ms as f64,
            &mut rng,
        );

        let mut starfield = Self {
            viewport: drawable(viewport),
            settings,
            stars: Vec::new(),
            spans: Vec::new(),
            shooting_stars: Vec::new(),
            shooting_frame: Vec::new(),
            rng,
            spawn_timer,
            line_cadence: Throttle::every_frames(CONSTELLATION_LINE_FRAMES),
            shooting_cadence: Throttle::every_frames(SHOOTING_STAR_FRAMES),
            last_frame_ms: None,
            scroll_y: 0.0,
            plan: FramePlan::default(),
            spawned: 0,
        };
        starfield.populate();
        starfield
    }

    /// Discard the population and regenerate it in one pass.
    fn populate(&mut self) {
        self.stars.clear();
        self.stars.extend(star::generate_field(
            self.settings.star_count,
            self.viewport,
            &mut self.rng,
        ));
        self.spans = constellation::materialize(self.viewport, &mut self.stars, &mut self.rng);
        debug!(
            "populated {} stars for {}x{}",
            self.stars.len(),
            self.viewport.width,
            self.viewport.height
        );
    }

    /// Rebuild the population for a new surface size.
    ///
    /// Shooting stars already in flight are kept.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = drawable(viewport);
        self.populate();
    }

    /// Advance the simulation to `timestamp_ms` with the page scrolled to `scroll_y`.
    pub fn step(&mut self, timestamp_ms: f64, scroll_y: f32) -> FramePlan {
        let delta_ms = self
            .last_frame_ms
            .map_or(0.0, |last| (timestamp_ms - last).max(0.0));
        self.last_frame_ms = Some(timestamp_ms);
        self.scroll_y = scroll_y;

        let multiplier = self.settings.speed.twinkle_multiplier();
        for star in &mut self.stars {
            star.advance(multiplier);
        }

        let line_due = self.line_cadence.tick(delta_ms);
        let shooting_due = self.shooting_cadence.tick(delta_ms);
        self.plan = FramePlan {
            constellation_lines: self.settings.constellation_lines && line_due,
            shooting_stars: self.settings.shooting_stars && shooting_due,
        };

        if self.plan.shooting_stars {
            let viewport = self.viewport;
            // Draw where each streak is now, then move it
            self.shooting_frame.clear();
            for shooting_star in &mut self.shooting_stars {
                self.shooting_frame.extend(shooting_star.draw_commands());
                shooting_star.advance();
            }
            self.shooting_stars.retain(|s| !s.is_expired(viewport));

            if self.spawn_timer.poll(timestamp_ms, &mut self.rng) {
                let spawned = ShootingStar::spawn(viewport, &mut self.rng);
                debug!("shooting star at ({:.0}, {:.0})", spawned.x, spawned.y);
                self.shooting_stars.push(spawned);
                self.spawned += 1;
            }
        }

        self.plan
    }

    /// Draw commands for the current state, back to front.
    pub fn draw(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(self.stars.len() * 2 + 1);
        commands.push(DrawCommand::Clear);

        for star in self.stars.iter().filter(|s| s.tier != Tier::Constellation) {
            commands.push(DrawCommand::FillCircle {
                x: star.x,
                y: star.parallax_y(self.scroll_y, self.viewport.height),
                radius: star.radius,
                opacity: star.opacity(),
            });
        }

        if self.plan.constellation_lines {
            for span in &self.spans {
                commands.extend(span.segments(&self.stars).map(|(a, b)| DrawCommand::Line {
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                    width: LINE_WIDTH,
                    opacity: LINE_OPACITY,
                }));
            }
        }

        for star in self.stars.iter().filter(|s| s.tier == Tier::Constellation) {
            let opacity = star.opacity();
            // Soft halo, then the sharp core
            commands.push(DrawCommand::FillCircle {
                x: star.x,
                y: star.y,
                radius: star.radius * 1.2,
                opacity: opacity * 0.3,
            });
            commands.push(DrawCommand::FillCircle {
                x: star.x,
                y: star.y,
                radius: star.radius,
                opacity,
            });
        }

        if self.plan.shooting_stars {
            commands.extend_from_slice(&self.shooting_frame);
        }

        commands
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn constellation_spans(&self) -> &[ConstellationSpan] {
        &self.spans
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting_stars
    }

    /// Shooting stars spawned since creation.
    pub fn spawned_count(&self) -> usize {
        self.spawned
    }

    /// Change the twinkle speed without rebuilding the population.
    pub fn set_speed(&mut self, speed: AnimationSpeed) {
        self.settings.speed = speed;
    }
}

/// Clamp a viewport to at least one pixel in each direction.
fn drawable(viewport: Viewport) -> Viewport {
    Viewport::new(viewport.width.max(1.0), viewport.height.max(1.0))
}

/// Seed from the system clock.
fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animations::constellation::member_count;

    fn seeded(viewport: Viewport) -> Starfield {
        Starfield::new(viewport, StarfieldSettings::default().with_seed(42))
    }

    fn count_lines(commands: &[DrawCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    #[test]
    fn test_mount_population() {
        let viewport = Viewport::new(1024.0, 768.0);
        let starfield = seeded(viewport);

        assert_eq!(starfield.stars().len(), 112);
        assert_eq!(member_count(), 12);
        for s in starfield.stars() {
            assert!(viewport.contains(s.x, s.y), "({}, {}) outside", s.x, s.y);
        }
        let members = starfield
            .stars()
            .iter()
            .filter(|s| s.tier == Tier::Constellation)
            .count();
        assert_eq!(members, 12);
    }

    #[test]
    fn test_resize_keeps_count() {
        let mut starfield = seeded(Viewport::new(1024.0, 768.0));
        starfield.resize(Viewport::new(640.0, 480.0));
        assert_eq!(starfield.stars().len(), 112);
        starfield.resize(Viewport::new(1920.0, 1080.0));
        starfield.resize(Viewport::new(1920.0, 1080.0));
        assert_eq!(starfield.stars().len(), 112);

        let viewport = starfield.viewport();
        assert!(starfield.stars().iter().all(|s| viewport.contains(s.x, s.y)));
    }

    #[test]
    fn test_resize_rescales_constellations() {
        let mut starfield = seeded(Viewport::new(1000.0, 1000.0));
        starfield.resize(Viewport::new(2000.0, 500.0));
        let span = starfield.constellation_spans()[2];
        let top = &starfield.stars()[span.start];
        assert!((top.x - 1000.0).abs() < 1e-3);
        assert!((top.y - 75.0).abs() < 1e-3);
    }

    #[test]
    fn test_spans_point_at_constellation_stars() {
        let starfield = seeded(Viewport::new(800.0, 600.0));
        for span in starfield.constellation_spans() {
            for star in &starfield.stars()[span.range()] {
                assert_eq!(star.tier, Tier::Constellation);
            }
        }
    }

    #[test]
    fn test_no_spawn_before_min_interval() {
        let mut starfield = seeded(Viewport::new(1024.0, 768.0));
        for frame in 0..100 {
            starfield.step(frame as f64 * 16.0, 0.0);
        }
        assert_eq!(starfield.spawned_count(), 0);
        assert!(starfield.shooting_stars().is_empty());
    }

    #[test]
    fn test_at_most_one_spawn_within_window() {
        let mut starfield = seeded(Viewport::new(1024.0, 768.0));
        // 100 frames spanning 20 seconds
        for frame in 0..100 {
            starfield.step(frame as f64 * 200.0, 0.0);
        }
        assert!(starfield.spawned_count() <= 1);
    }

    #[test]
    fn test_spawns_eventually() {
        let mut starfield = seeded(Viewport::new(1024.0, 768.0));
        for frame in 0..=1600 {
            starfield.step(frame as f64 * 16.0, 0.0);
        }
        // 25.6 seconds always covers the longest interval
        assert!(starfield.spawned_count() >= 1);
    }

    #[test]
    fn test_lines_only_on_cadence() {
        let mut starfield = seeded(Viewport::new(800.0, 600.0));
        let plan = starfield.step(0.0, 0.0);
        assert!(!plan.constellation_lines);
        assert_eq!(count_lines(&starfield.draw()), 0);

        let mut with_lines = 0;
        for frame in 1..=60 {
            if starfield.step(frame as f64 * 1000.0 / 60.0, 0.0).constellation_lines {
                with_lines += 1;
                assert_eq!(count_lines(&starfield.draw()), 10);
            }
        }
        assert!((9..=10).contains(&with_lines));
    }

    #[test]
    fn test_lines_can_be_disabled() {
        let settings = StarfieldSettings {
            constellation_lines: false,
            ..StarfieldSettings::default().with_seed(1)
        };
        let mut starfield = Starfield::new(Viewport::new(800.0, 600.0), settings);
        for frame in 0..120 {
            starfield.step(frame as f64 * 16.7, 0.0);
            assert_eq!(count_lines(&starfield.draw()), 0);
        }
    }

    #[test]
    fn test_draw_order() {
        let mut starfield = seeded(Viewport::new(800.0, 600.0));
        starfield.step(0.0, 0.0);
        let commands = starfield.draw();

        assert_eq!(commands[0], DrawCommand::Clear);
        // clear + 100 field stars + 12 × (halo + core)
        assert_eq!(commands.len(), 1 + 100 + 24);
    }

    fn count_circles(commands: &[DrawCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
            .count()
    }

    #[test]
    fn test_shooting_stars_drawn_only_on_cadence() {
        let mut starfield = seeded(Viewport::new(1024.0, 768.0));
        // 100 field stars + 12 × (halo + core)
        let sky_circles = 100 + 24;

        let mut frame = 0;
        while starfield.spawned_count() == 0 {
            starfield.step(frame as f64 * 16.0, 0.0);
            frame += 1;
            assert!(frame < 2000, "no shooting star spawned");
        }

        let mut on_cadence = 0;
        let mut off_cadence = 0;
        for _ in 0..120 {
            let in_flight = starfield.shooting_stars().len();
            let plan = starfield.step(frame as f64 * 16.0, 0.0);
            frame += 1;
            let circles = count_circles(&starfield.draw());
            if plan.shooting_stars {
                // Head and three tail points per streak
                assert_eq!(circles, sky_circles + 4 * in_flight);
                if in_flight > 0 {
                    on_cadence += 1;
                }
            } else {
                assert_eq!(circles, sky_circles);
                off_cadence += 1;
            }
        }
        assert!(on_cadence > 0);
        assert!(off_cadence > 0);
    }

    #[test]
    fn test_streak_drawn_before_it_moves() {
        let mut starfield = seeded(Viewport::new(1024.0, 768.0));
        let mut frame = 0;
        while starfield.spawned_count() == 0 {
            starfield.step(frame as f64 * 16.0, 0.0);
            frame += 1;
            assert!(frame < 2000, "no shooting star spawned");
        }

        let spawned = starfield.shooting_stars()[0].clone();
        loop {
            let plan = starfield.step(frame as f64 * 16.0, 0.0);
            frame += 1;
            if plan.shooting_stars {
                break;
            }
        }

        // The first drawn head sits at the spawn point at full opacity
        let head = spawned.draw_commands().next();
        assert!(head.is_some_and(|h| starfield.draw().contains(&h)));
        assert!(starfield.shooting_stars()[0].opacity() < spawned.opacity());
    }

    #[test]
    fn test_parallax_uses_scroll() {
        let mut starfield = seeded(Viewport::new(800.0, 600.0));
        starfield.step(0.0, 0.0);
        let still = starfield.draw();
        starfield.step(0.0, 500.0);
        let scrolled = starfield.draw();

        let y_of = |c: &DrawCommand| match *c {
            DrawCommand::FillCircle { y, .. } => y,
            _ => f32::NAN,
        };
        let moved = still[1..101]
            .iter()
            .zip(&scrolled[1..101])
            .filter(|&(a, b)| (y_of(a) - y_of(b)).abs() > 1e-3)
            .count();
        assert_eq!(moved, 100);

        // Constellation stars stay put
        let fixed_moved = still[101..]
            .iter()
            .zip(&scrolled[101..])
            .filter(|&(a, b)| y_of(a) != y_of(b))
            .count();
        assert_eq!(fixed_moved, 0);
    }

    #[test]
    fn test_same_seed_same_sky() {
        let a = seeded(Viewport::new(300.0, 200.0));
        let b = seeded(Viewport::new(300.0, 200.0));
        assert_eq!(a.stars(), b.stars());
    }

    #[test]
    fn test_empty_viewport_is_clamped() {
        let starfield = seeded(Viewport::new(0.0, 0.0));
        assert_eq!(starfield.viewport(), Viewport::new(1.0, 1.0));
        assert_eq!(starfield.stars().len(), 112);
    }
}
