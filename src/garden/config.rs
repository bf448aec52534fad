//! Plant growth and texture configuration

use serde::{Deserialize, Serialize};

use crate::core::Millis;

/// Configuration for planted entities
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantConfig {
    /// Age at which a plant is fully grown.
    pub growth_ms: Millis,
    /// Age at which a plant sways with the full wind angle.
    pub rooting_ms: Millis,
    /// Maximum number of decoded textures kept.
    pub texture_cache_capacity: usize,
    /// Texture payloads decoded per tick.
    pub decode_budget: usize,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            growth_ms: 12_000.0,
            rooting_ms: 2_000.0,
            texture_cache_capacity: 256,
            decode_budget: 6,
        }
    }
}
