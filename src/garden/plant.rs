//! Plant records as supplied by the garden's data source.

use serde::{Deserialize, Serialize};

use crate::core::Millis;

/// Identifier assigned by the data source.
pub type PlantId = u64;

/// Timestamps below this are legacy second-resolution values.
const LEGACY_SECONDS_LIMIT: f64 = 2_000_000_000.0;

/// One planted entity. Read-only to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: PlantId,
    /// Base position in pixels.
    pub x: f32,
    pub y: f32,
    /// Encoded image payloads (data URL or bare base64).
    #[serde(rename = "stemTex")]
    pub stem_tex: String,
    #[serde(rename = "leafTex")]
    pub leaf_tex: String,
    #[serde(rename = "flowerTex")]
    pub flower_tex: String,
    #[serde(default = "default_author")]
    pub author: String,
    /// Planting time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub server_time: Millis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PlantStats>,
}

fn default_author() -> String {
    "Anonymous".to_string()
}

impl Plant {
    /// Planting time in milliseconds, upgrading legacy second timestamps.
    pub fn planted_at_ms(&self) -> Millis {
        if self.server_time > 0.0 && self.server_time < LEGACY_SECONDS_LIMIT {
            self.server_time * 1000.0
        } else {
            self.server_time
        }
    }

    /// Age at `now_ms`, never negative.
    pub fn age_ms(&self, now_ms: Millis) -> Millis {
        (now_ms - self.planted_at_ms()).max(0.0)
    }

    pub fn is_dead(&self) -> bool {
        self.stats.as_ref().is_some_and(|s| s.dead)
    }

    pub fn is_protected(&self, now_ms: Millis) -> bool {
        self.stats.as_ref().is_some_and(|s| s.is_protected(now_ms))
    }
}

/// Vitality stats the data source attaches to each plant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantStats {
    pub hp: f32,
    #[serde(rename = "maxHp")]
    pub max_hp: f32,
    #[serde(default)]
    pub vit: f32,
    #[serde(default)]
    pub dead: bool,
    /// Seconds since the Unix epoch, 0 while alive.
    #[serde(default)]
    pub death_time: f64,
    #[serde(default)]
    pub death_cause: Option<String>,
    /// Protection expiry, seconds since the Unix epoch.
    #[serde(default)]
    pub protect_until: f64,
}

impl PlantStats {
    pub fn is_protected(&self, now_ms: Millis) -> bool {
        self.protect_until * 1000.0 > now_ms
    }

    /// `hp / max_hp` in `[0, 1]`.
    pub fn health(&self) -> f32 {
        if self.max_hp > 0.0 {
            crate::core::clamp01(self.hp / self.max_hp)
        } else {
            0.0
        }
    }
}

/// A planting request for the creation sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewPlant {
    pub x: f32,
    pub y: f32,
    #[serde(rename = "stemTex")]
    pub stem_tex: String,
    #[serde(rename = "leafTex")]
    pub leaf_tex: String,
    #[serde(rename = "flowerTex")]
    pub flower_tex: String,
    pub author: String,
    /// Client time of the request, milliseconds since the Unix epoch.
    pub timestamp: Millis,
}
