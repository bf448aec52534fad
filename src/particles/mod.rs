//! Weather particle system: spawn, advance and cull typed particles.
//!
//! Fixed-rate classes (rain, snow, hail, ash) spawn exactly their preset
//! rate per tick. Debris spawns with its preset probability, meteors with a
//! fixed low probability while the preset declares them. All spawns are
//! gated by the live-particle cap and dropped once it is reached.

pub mod config;
pub mod particle;

pub use config::ParticleConfig;
pub use particle::{Particle, ParticleClass, ParticleKind};

use std::collections::BTreeMap;

use rand::Rng;

use crate::atmosphere::{WeatherPreset, WindState};
use crate::core::{Vec2, Viewport, clamp01};

/// Owns the live particle list.
pub struct ParticleSystem {
    config: ParticleConfig,
    particles: Vec<Particle>,
    /// Whether the last spawn pass hit the cap; logged on transitions only.
    saturated: bool,
}

impl ParticleSystem {
    pub fn new(config: ParticleConfig) -> Self {
        let particles = Vec::with_capacity(config.cap.min(4096));
        Self {
            config,
            particles,
            saturated: false,
        }
    }

    /// One tick: spawn for the active preset, advance everything, cull.
    pub fn update(&mut self, preset: &WeatherPreset, wind: &WindState, viewport: Viewport, rng: &mut impl Rng) {
        self.spawn(preset, wind, viewport, rng);

        let decay = self.config.meteor_decay;
        for p in &mut self.particles {
            p.advance(wind, decay);
        }

        self.cull(viewport);
    }

    /// Spawn this tick's particles for `preset`.
    pub fn spawn(&mut self, preset: &WeatherPreset, wind: &WindState, viewport: Viewport, rng: &mut impl Rng) {
        if viewport.is_empty() {
            return;
        }
        let mut dropped = 0usize;

        let fixed_rate = [
            (ParticleClass::Rain, preset.rain_rate),
            (ParticleClass::Snow, preset.snow_rate),
            (ParticleClass::Hail, preset.hail_rate),
            (ParticleClass::Ash, preset.ash_rate),
        ];
        for (class, rate) in fixed_rate {
            let Some(rate) = rate.filter(|&r| r > 0) else { continue };
            let room = self.config.cap.saturating_sub(self.particles.len());
            let n = (rate as usize).min(room);
            dropped += rate as usize - n;
            for _ in 0..n {
                let p = self.make_falling(class, wind, viewport, rng);
                self.particles.push(p);
            }
        }

        if let Some(chance) = preset.debris.filter(|&d| d > 0.0) {
            if rng.gen_bool(clamp01(chance) as f64) {
                let p = make_debris(wind, viewport, rng);
                if !self.push(p) {
                    dropped += 1;
                }
            }
        }

        if preset.meteor_rate.is_some_and(|r| r > 0.0) && rng.gen_bool(clamp01(self.config.meteor_chance) as f64) {
            let p = make_meteor(viewport, rng);
            if !self.push(p) {
                dropped += 1;
            }
        }

        let saturated = dropped > 0;
        if saturated && !self.saturated {
            log::debug!("Particle cap {} reached, dropping spawns", self.config.cap);
        }
        self.saturated = saturated;
    }

    /// Remove particles outside the cull box and expired meteors. `retain`
    /// keeps survivors in their original order.
    pub fn cull(&mut self, viewport: Viewport) {
        let c = &self.config;
        let (min_x, max_x) = (-c.cull_margin_x, viewport.width + c.cull_margin_x);
        let (min_y, max_y) = (-c.cull_margin_top, viewport.height + c.cull_margin_bottom);
        self.particles.retain(|p| {
            !p.is_expired() && p.pos.x >= min_x && p.pos.x <= max_x && p.pos.y >= min_y && p.pos.y <= max_y
        });
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Live particles per class.
    pub fn class_counts(&self) -> BTreeMap<ParticleClass, usize> {
        let mut counts = BTreeMap::new();
        for p in &self.particles {
            *counts.entry(p.class()).or_insert(0) += 1;
        }
        counts
    }

    fn push(&mut self, p: Particle) -> bool {
        if self.particles.len() >= self.config.cap {
            return false;
        }
        self.particles.push(p);
        true
    }

    /// Rain, snow, hail and ash all enter from above the screen, shifted
    /// upwind so the wind carries them into view. The shift is capped so a
    /// spawn always lands inside the horizontal cull box.
    fn make_falling(&self, class: ParticleClass, wind: &WindState, viewport: Viewport, rng: &mut impl Rng) -> Particle {
        let spread = self.config.spawn_spread;
        let max_offset = (self.config.cull_margin_x - spread).max(0.0);
        let offset = (wind.signed_force() * self.config.upwind_offset).clamp(-max_offset, max_offset);
        let x = rng.gen_range(0.0..viewport.width + spread * 2.0) - spread - offset;
        let y = -rng.gen_range(10.0..60.0);
        let z: f32 = rng.r#gen();

        let kind = match class {
            ParticleClass::Rain => ParticleKind::Rain {
                length: 10.0 + rng.gen_range(0.0..20.0) * (0.5 + z * 0.5),
            },
            ParticleClass::Snow => ParticleKind::Snow {
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
            },
            ParticleClass::Ash => ParticleKind::Ash {
                phase: rng.gen_range(0.0..std::f32::consts::TAU),
            },
            _ => ParticleKind::Hail,
        };
        Particle { pos: Vec2::new(x, y), z, kind }
    }
}

/// Debris enters from the upwind edge somewhere in the visible height band.
fn make_debris(wind: &WindState, viewport: Viewport, rng: &mut impl Rng) -> Particle {
    let downwind = if wind.direction >= 0.0 { 1.0 } else { -1.0 };
    let x = if downwind > 0.0 { -30.0 } else { viewport.width + 30.0 };
    let y = rng.gen_range(0.0..viewport.height);
    let spin = rng.gen_range(0.05..0.2) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Particle {
        pos: Vec2::new(x, y),
        z: rng.r#gen(),
        kind: ParticleKind::Debris {
            rotation: rng.gen_range(0.0..std::f32::consts::TAU),
            spin,
            drift: downwind * rng.gen_range(3.0..7.0),
        },
    }
}

/// Meteors streak diagonally across the upper sky.
fn make_meteor(viewport: Viewport, rng: &mut impl Rng) -> Particle {
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    Particle {
        pos: Vec2::new(rng.gen_range(0.0..viewport.width), -20.0),
        z: rng.gen_range(0.5..1.0),
        kind: ParticleKind::Meteor {
            velocity: Vec2::new(side * rng.gen_range(8.0..14.0), rng.gen_range(3.0..6.0)),
            life: 1.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::WeatherTable;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const VP: Viewport = Viewport::new(800.0, 600.0);

    fn wind(force: f32, direction: f32) -> WindState {
        WindState {
            direction,
            ..WindState::new(0.1, force)
        }
    }

    #[test]
    fn test_fixed_rate_spawns_exactly_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = WeatherTable::builtin();
        let mut sys = ParticleSystem::new(ParticleConfig::default());
        sys.spawn(table.get("rain"), &wind(0.3, 1.0), VP, &mut rng);
        assert_eq!(sys.len(), 5);
        assert!(sys.particles().iter().all(|p| p.class() == ParticleClass::Rain));
    }

    #[test]
    fn test_absent_rates_spawn_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = WeatherTable::builtin();
        let mut sys = ParticleSystem::new(ParticleConfig::default());
        for _ in 0..500 {
            sys.update(table.get("sunny"), &wind(0.1, 1.0), VP, &mut rng);
        }
        assert!(sys.is_empty());
    }

    #[test]
    fn test_zero_meteor_rate_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut preset = WeatherPreset::calm("Dim sky", 0.01, 0.05, 10.0, 0.0, 1.0);
        preset.meteor_rate = Some(0.0);
        let config = ParticleConfig { meteor_chance: 1.0, ..ParticleConfig::default() };
        let mut sys = ParticleSystem::new(config);
        for _ in 0..200 {
            sys.spawn(&preset, &wind(0.1, 1.0), VP, &mut rng);
        }
        assert!(sys.is_empty());

        preset.meteor_rate = Some(1.0);
        sys.spawn(&preset, &wind(0.1, 1.0), VP, &mut rng);
        assert_eq!(sys.len(), 1);
    }

    #[test]
    fn test_spawn_is_above_screen_and_upwind() {
        let mut rng = StdRng::seed_from_u64(8);
        let table = WeatherTable::builtin();
        let mut sys = ParticleSystem::new(ParticleConfig::default());
        let w = wind(1.0, 1.0);
        for _ in 0..20 {
            sys.spawn(table.get("storm"), &w, VP, &mut rng);
        }
        let n = sys.len() as f32;
        let mean_x: f32 = sys.particles().iter().map(|p| p.pos.x).sum::<f32>() / n;
        // Wind blows right, so the spawn band is shifted left of centre
        assert!(mean_x < VP.width / 2.0 - 200.0, "mean x {mean_x}");
        assert!(sys.particles().iter().all(|p| p.pos.y < 0.0));
    }

    #[test]
    fn test_cap_never_exceeded() {
        let mut rng = StdRng::seed_from_u64(2);
        let table = WeatherTable::builtin();
        let config = ParticleConfig { cap: 150, ..ParticleConfig::default() };
        let mut sys = ParticleSystem::new(config);
        for name in ["hurricane", "blizzard", "hail", "volcanic_ash", "tornado", "meteor_shower"] {
            for _ in 0..300 {
                sys.update(table.get(name), &wind(1.5, -1.2), VP, &mut rng);
                assert!(sys.len() <= 150);
            }
        }
    }

    #[test]
    fn test_every_particle_eventually_removed() {
        let mut rng = StdRng::seed_from_u64(3);
        let table = WeatherTable::builtin();
        for &(force, direction) in &[(0.0, 1.0), (2.0, 1.5), (2.0, -1.5), (0.3, -0.2)] {
            let w = wind(force, direction);
            let mut sys = ParticleSystem::new(ParticleConfig::default());
            for name in ["rain", "snow", "hail", "volcanic_ash", "tornado", "meteor_shower"] {
                for _ in 0..100 {
                    sys.spawn(table.get(name), &w, VP, &mut rng);
                }
            }
            assert!(!sys.is_empty());
            let calm = WeatherTable::builtin().get("sunny").clone();
            for _ in 0..20_000 {
                sys.update(&calm, &w, VP, &mut rng);
                if sys.is_empty() {
                    break;
                }
            }
            assert!(sys.is_empty(), "{} particles leaked at force {force}", sys.len());
        }
    }

    #[test]
    fn test_debris_enters_from_upwind_edge() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut preset = WeatherPreset::calm("Debris", 0.1, 0.5, 15.0, 0.0, 1.0);
        preset.debris = Some(1.0);
        let mut sys = ParticleSystem::new(ParticleConfig::default());
        sys.spawn(&preset, &wind(0.5, -1.0), VP, &mut rng);
        assert_eq!(sys.len(), 1);
        let p = sys.particles()[0];
        assert!(p.pos.x > VP.width);
        assert!(p.pos.y >= 0.0 && p.pos.y < VP.height);
        match p.kind {
            ParticleKind::Debris { drift, .. } => assert!(drift < 0.0),
            _ => panic!("expected debris"),
        }
    }

    #[test]
    fn test_cull_preserves_order() {
        let mut sys = ParticleSystem::new(ParticleConfig::default());
        for (i, y) in [10.0, 5000.0, 20.0, 5000.0, 30.0].into_iter().enumerate() {
            sys.particles.push(Particle {
                pos: Vec2::new(i as f32, y),
                z: 0.0,
                kind: ParticleKind::Hail,
            });
        }
        sys.cull(VP);
        let xs: Vec<f32> = sys.particles().iter().map(|p| p.pos.x).collect();
        assert_eq!(xs, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_class_counts() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut preset = WeatherPreset::calm("Mixed", 0.1, 0.2, -2.0, 0.0, 1.0);
        preset.snow_rate = Some(3);
        preset.hail_rate = Some(2);
        let mut sys = ParticleSystem::new(ParticleConfig::default());
        sys.spawn(&preset, &wind(0.2, 1.0), VP, &mut rng);
        let counts = sys.class_counts();
        assert_eq!(counts.get(&ParticleClass::Snow), Some(&3));
        assert_eq!(counts.get(&ParticleClass::Hail), Some(&2));
        assert_eq!(counts.get(&ParticleClass::Rain), None);
    }
}
