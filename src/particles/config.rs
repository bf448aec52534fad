//! Particle system configuration.

use serde::{Deserialize, Serialize};

/// Spawn and cull tuning for weather particles.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Hard cap on live particles. Spawns beyond it are dropped.
    pub cap: usize,
    /// Horizontal off-screen margin before a particle is culled. Generous so
    /// strong wind does not clip particles still drifting into view.
    pub cull_margin_x: f32,
    /// Margin below the bottom edge.
    pub cull_margin_bottom: f32,
    /// Margin above the top edge.
    pub cull_margin_top: f32,
    /// Per-tick meteor chance while the preset declares `meteorRate`.
    pub meteor_chance: f32,
    /// Meteor life lost per tick (life starts at 1).
    pub meteor_decay: f32,
    /// Horizontal spawn spread beyond each screen edge.
    pub spawn_spread: f32,
    /// Upwind spawn offset per unit of `force * direction`.
    pub upwind_offset: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            cap: 2000,
            cull_margin_x: 1000.0,
            cull_margin_bottom: 100.0,
            cull_margin_top: 400.0,
            meteor_chance: 0.02,
            meteor_decay: 0.02,
            spawn_spread: 500.0,
            upwind_offset: 500.0,
        }
    }
}
