//! Aggregate garden configuration.
//!
//! Every section defaults, so a partial JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "seed": 42, "atmosphere": { "smoothing": 0.05 }, "particles": { "cap": 500 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atmosphere::AtmosphereConfig;
use crate::core::Result;
use crate::garden::PlantConfig;
use crate::grass::GrassConfig;
use crate::interaction::InteractionConfig;
use crate::particles::ParticleConfig;
use crate::scene::SceneConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Seed for every stochastic decision in the simulation.
    pub seed: u64,
    pub atmosphere: AtmosphereConfig,
    pub particles: ParticleConfig,
    pub grass: GrassConfig,
    pub plants: PlantConfig,
    pub interaction: InteractionConfig,
    pub scene: SceneConfig,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            seed: 0x6172_6465_6e,
            atmosphere: AtmosphereConfig::default(),
            particles: ParticleConfig::default(),
            grass: GrassConfig::default(),
            plants: PlantConfig::default(),
            interaction: InteractionConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl GardenConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = GardenConfig::from_json_str(
            r#"{ "seed": 5, "atmosphere": { "smoothing": 0.05 }, "particles": { "cap": 10 } }"#,
        )
        .unwrap();
        assert_eq!(cfg.seed, 5);
        assert_eq!(cfg.atmosphere.smoothing, 0.05);
        assert_eq!(cfg.atmosphere.day_cycle_ms, AtmosphereConfig::default().day_cycle_ms);
        assert_eq!(cfg.particles.cap, 10);
        assert_eq!(cfg.interaction.cooldown_ms, 2_000.0);
        assert_eq!(cfg.plants.growth_ms, 12_000.0);
    }

    #[test]
    fn test_empty_object_is_default() {
        let cfg = GardenConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg.grass.blade_count, 8000);
        assert!(GardenConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_serialized_config_reloads() {
        let cfg = GardenConfig::default();
        let text = cfg.to_json_string().unwrap();
        let back = GardenConfig::from_json_str(&text).unwrap();
        assert_eq!(back.seed, cfg.seed);
        assert_eq!(back.scene.sky.night, cfg.scene.sky.night);
    }
}
