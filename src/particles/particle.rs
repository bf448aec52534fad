//! Weather particle variants and their per-tick motion.

use crate::atmosphere::WindState;
use crate::core::Vec2;

/// Particle class, for counting and spawn bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParticleClass {
    Rain,
    Snow,
    Hail,
    Ash,
    Debris,
    Meteor,
}

impl ParticleClass {
    pub const ALL: [ParticleClass; 6] = [
        ParticleClass::Rain,
        ParticleClass::Snow,
        ParticleClass::Hail,
        ParticleClass::Ash,
        ParticleClass::Debris,
        ParticleClass::Meteor,
    ];
}

/// Class-specific kinematic state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParticleKind {
    Rain {
        /// Streak length in pixels.
        length: f32,
    },
    Snow {
        /// Offset into the sideways sine drift.
        phase: f32,
    },
    Hail,
    Ash {
        phase: f32,
    },
    Debris {
        rotation: f32,
        /// Rotation added per tick.
        spin: f32,
        /// Downwind self-velocity so debris leaves even in calm air.
        drift: f32,
    },
    Meteor {
        velocity: Vec2,
        /// Remaining life in `[0, 1]`; culled at 0.
        life: f32,
    },
}

/// One live weather particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    /// Depth factor in `[0, 1]`: 1 is near (faster, bigger, brighter).
    pub z: f32,
    pub kind: ParticleKind,
}

impl Particle {
    pub fn class(&self) -> ParticleClass {
        match self.kind {
            ParticleKind::Rain { .. } => ParticleClass::Rain,
            ParticleKind::Snow { .. } => ParticleClass::Snow,
            ParticleKind::Hail => ParticleClass::Hail,
            ParticleKind::Ash { .. } => ParticleClass::Ash,
            ParticleKind::Debris { .. } => ParticleClass::Debris,
            ParticleKind::Meteor { .. } => ParticleClass::Meteor,
        }
    }

    /// Advance one tick under the current wind.
    ///
    /// Every class except meteors has a strictly positive fall speed, so any
    /// particle eventually crosses the bottom cull line.
    pub fn advance(&mut self, wind: &WindState, meteor_decay: f32) {
        let push = wind.signed_force();
        let z = self.z;
        match &mut self.kind {
            ParticleKind::Rain { .. } => {
                self.pos.y += 10.0 + z * 15.0;
                self.pos.x += push * 25.0;
            }
            ParticleKind::Snow { phase } => {
                self.pos.y += 1.0 + z * 1.5;
                self.pos.x += (self.pos.y * 0.02 + *phase).sin() * 0.8 + push * 5.0;
            }
            ParticleKind::Ash { phase } => {
                self.pos.y += 0.6 + z;
                self.pos.x += (self.pos.y * 0.015 + *phase).sin() * 0.6 + push * 4.0;
            }
            ParticleKind::Hail => {
                self.pos.y += 18.0 + z * 10.0;
                self.pos.x += push * 3.0;
            }
            ParticleKind::Debris { rotation, spin, drift } => {
                *rotation += *spin;
                self.pos.x += *drift + push * 15.0;
                self.pos.y += rotation.sin() * 1.5 + 0.3 + z * 0.5;
            }
            ParticleKind::Meteor { velocity, life } => {
                self.pos += *velocity;
                *life = (*life - meteor_decay).max(0.0);
            }
        }
    }

    /// Meteors die when their life runs out; everything else lives until it
    /// leaves the cull box.
    pub fn is_expired(&self) -> bool {
        matches!(self.kind, ParticleKind::Meteor { life, .. } if life <= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wind(force: f32, direction: f32) -> WindState {
        WindState {
            direction,
            ..WindState::new(0.1, force)
        }
    }

    #[test]
    fn test_rain_drifts_with_wind() {
        let mut p = Particle { pos: Vec2::ZERO, z: 0.0, kind: ParticleKind::Rain { length: 12.0 } };
        p.advance(&wind(0.4, -1.0), 0.02);
        assert!((p.pos.y - 10.0).abs() < 1e-5);
        assert!((p.pos.x + 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_nearer_rain_falls_faster() {
        let mut far = Particle { pos: Vec2::ZERO, z: 0.0, kind: ParticleKind::Rain { length: 12.0 } };
        let mut near = Particle { z: 1.0, ..far };
        let w = wind(0.0, 1.0);
        far.advance(&w, 0.02);
        near.advance(&w, 0.02);
        assert!(near.pos.y > far.pos.y);
    }

    #[test]
    fn test_meteor_life_decays_to_zero() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            z: 0.5,
            kind: ParticleKind::Meteor { velocity: Vec2::new(8.0, 4.0), life: 1.0 },
        };
        let w = wind(0.0, 1.0);
        let mut ticks = 0;
        while !p.is_expired() {
            p.advance(&w, 0.02);
            ticks += 1;
            assert!(ticks <= 51);
        }
        assert!(ticks >= 49);
        assert!((p.pos.x - 8.0 * ticks as f32).abs() < 1e-2);
    }

    #[test]
    fn test_debris_rotates_and_drifts_in_calm_air() {
        let mut p = Particle {
            pos: Vec2::new(0.0, 100.0),
            z: 0.5,
            kind: ParticleKind::Debris { rotation: 0.0, spin: 0.1, drift: 4.0 },
        };
        p.advance(&wind(0.0, 1.0), 0.02);
        assert!((p.pos.x - 4.0).abs() < 1e-5);
        match p.kind {
            ParticleKind::Debris { rotation, .. } => assert!((rotation - 0.1).abs() < 1e-6),
            _ => unreachable!(),
        }
    }
}
