//! Decorative starfield and shooting stars
//!
//! Positions are in viewport units (vw, vh). Everything is drawn from a
//! seeded RNG so a layout can be reproduced from its seed.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tuning::Tuning;

/// Twinkle period range in seconds
pub const TWINKLE_SECS: (f32, f32) = (3.0, 7.0);
/// Delay before the first shooting star (ms)
pub const FIRST_SHOT_MS: (f64, f64) = (2000.0, 8000.0);
/// Delay between shooting stars (ms)
pub const NEXT_SHOT_MS: (f64, f64) = (6000.0, 14000.0);
/// Shooting star base flight time range in seconds
pub const SHOT_DURATION_SECS: (f32, f32) = (2.4, 5.2);
pub const SPEED_UP_CHANCE: f64 = 0.6;
/// Largest fraction a speed-up shaves off the flight time
pub const MAX_SPEED_UP: f32 = 0.5;
/// Extra time a finished shooting star stays in the DOM (ms)
pub const REMOVE_GRACE_MS: f64 = 600.0;
/// Spread either side of the inward edge normal, in degrees
pub const ANGLE_SPREAD_DEG: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// (vw, vh)
    pub position: Vec2,
    pub big: bool,
    pub dim: bool,
    pub twinkle_secs: f32,
}

impl Star {
    pub fn class_name(&self) -> String {
        let mut class = String::from("star");
        if self.big {
            class.push_str(" big");
        }
        if self.dim {
            class.push_str(" dim");
        }
        class
    }
}

/// Screen edge a shooting star enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// Unit vector pointing into the viewport (y grows downward)
    pub fn inward(&self) -> Vec2 {
        match self {
            Edge::Left => Vec2::X,
            Edge::Right => Vec2::NEG_X,
            Edge::Top => Vec2::Y,
            Edge::Bottom => Vec2::NEG_Y,
        }
    }

    fn base_angle_deg(&self) -> f32 {
        match self {
            Edge::Left => 0.0,
            Edge::Right => 180.0,
            Edge::Top => 90.0,
            Edge::Bottom => -90.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShootingStar {
    pub edge: Edge,
    /// Spawn point just outside the viewport (vw, vh)
    pub position: Vec2,
    pub angle_deg: f32,
    /// Flight time, rounded to hundredths of a second
    pub duration_secs: f32,
}

impl ShootingStar {
    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle_deg.to_radians())
    }

    /// When the element should be removed, counted from spawn
    pub fn lifetime_ms(&self) -> f64 {
        self.duration_secs as f64 * 1000.0 + REMOVE_GRACE_MS
    }
}

pub struct Starfield {
    rng: Pcg32,
    count: usize,
    big_chance: f64,
    dim_chance: f64,
}

impl Starfield {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            count: tuning.star_count,
            big_chance: tuning.star_big_chance.clamp(0.0, 1.0),
            dim_chance: tuning.star_dim_chance.clamp(0.0, 1.0),
        }
    }

    pub fn stars(&mut self) -> Vec<Star> {
        (0..self.count)
            .map(|_| {
                let big = self.rng.random_bool(self.big_chance);
                let dim = self.rng.random_bool(self.dim_chance);
                let position = Vec2::new(
                    self.rng.random_range(0.0..100.0),
                    self.rng.random_range(0.0..100.0),
                );
                let twinkle = self.rng.random_range(TWINKLE_SECS.0..TWINKLE_SECS.1);
                Star {
                    position,
                    big,
                    dim,
                    twinkle_secs: (twinkle * 100.0).round() / 100.0,
                }
            })
            .collect()
    }

    pub fn first_shot_delay_ms(&mut self) -> f64 {
        self.rng.random_range(FIRST_SHOT_MS.0..FIRST_SHOT_MS.1)
    }

    pub fn next_shot_delay_ms(&mut self) -> f64 {
        self.rng.random_range(NEXT_SHOT_MS.0..NEXT_SHOT_MS.1)
    }

    pub fn shoot(&mut self) -> ShootingStar {
        let edge = Edge::ALL[self.rng.random_range(0..Edge::ALL.len())];
        let along = self.rng.random_range(0.0..100.0);
        let outside = self.rng.random_range(20.0..40.0);
        let position = match edge {
            Edge::Left => Vec2::new(-outside, along),
            Edge::Right => Vec2::new(100.0 + outside, along),
            Edge::Top => Vec2::new(along, -outside),
            Edge::Bottom => Vec2::new(along, 100.0 + outside),
        };
        let spread = self.rng.random_range(-ANGLE_SPREAD_DEG..=ANGLE_SPREAD_DEG);

        let base = self
            .rng
            .random_range(SHOT_DURATION_SECS.0..SHOT_DURATION_SECS.1);
        let factor = if self.rng.random_bool(SPEED_UP_CHANCE) {
            1.0 - self.rng.random_range(0.0..MAX_SPEED_UP)
        } else {
            1.0
        };

        ShootingStar {
            edge,
            position,
            angle_deg: edge.base_angle_deg() + spread,
            duration_secs: (base * factor * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_star_count_and_bounds() {
        let mut field = Starfield::new(1, &Tuning::default());
        let stars = field.stars();
        assert_eq!(stars.len(), 140);
        for star in &stars {
            assert!((0.0..100.0).contains(&star.position.x));
            assert!((0.0..100.0).contains(&star.position.y));
            assert!(star.twinkle_secs >= 3.0 && star.twinkle_secs <= 7.0);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = Starfield::new(77, &Tuning::default()).stars();
        let b = Starfield::new(77, &Tuning::default()).stars();
        assert_eq!(a, b);
    }

    #[test]
    fn test_big_and_dim_roughly_proportional() {
        let tuning = Tuning {
            star_count: 5000,
            ..Tuning::default()
        };
        let stars = Starfield::new(5, &tuning).stars();
        let big = stars.iter().filter(|s| s.big).count() as f64 / 5000.0;
        let dim = stars.iter().filter(|s| s.dim).count() as f64 / 5000.0;
        assert!((big - 0.12).abs() < 0.03);
        assert!((dim - 0.25).abs() < 0.03);
    }

    #[test]
    fn test_class_name() {
        let star = Star {
            position: Vec2::ZERO,
            big: true,
            dim: true,
            twinkle_secs: 4.0,
        };
        assert_eq!(star.class_name(), "star big dim");
    }

    #[test]
    fn test_shot_delays_in_range() {
        let mut field = Starfield::new(3, &Tuning::default());
        let first = field.first_shot_delay_ms();
        assert!((2000.0..8000.0).contains(&first));
        for _ in 0..50 {
            let next = field.next_shot_delay_ms();
            assert!((6000.0..14000.0).contains(&next));
        }
    }

    proptest! {
        #[test]
        fn prop_shooting_star_heads_inward(seed in any::<u64>()) {
            let mut field = Starfield::new(seed, &Tuning::default());
            let shot = field.shoot();

            // Within 45 degrees of the inward normal
            prop_assert!(shot.direction().dot(shot.edge.inward()) >= 0.707 - 1e-3);

            // Spawned outside the viewport
            let p = shot.position;
            prop_assert!(p.x < 0.0 || p.x > 100.0 || p.y < 0.0 || p.y > 100.0);

            // Up to 50% faster than the base range
            prop_assert!(shot.duration_secs >= 1.2 - 0.01);
            prop_assert!(shot.duration_secs <= 5.2 + 0.01);
            prop_assert!((shot.lifetime_ms() - (shot.duration_secs as f64 * 1000.0 + 600.0)).abs() < 1e-6);
        }
    }
}
