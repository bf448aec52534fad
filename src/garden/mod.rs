//! Planted entities: records, growth, textures and the snapshot feed.

pub mod config;
pub mod feed;
pub mod growth;
pub mod plant;
pub mod texture;

pub use config::PlantConfig;
pub use feed::{GardenSnapshot, SnapshotMailbox, SnapshotPublisher, snapshot_channel};
pub use growth::Growth;
pub use plant::{NewPlant, Plant, PlantId, PlantStats};
pub use texture::{TextureCache, TextureKey, TextureStatus};

use crate::atmosphere::WindState;
use crate::core::{Millis, Vec2};

/// Where and how a plant stands this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantPose {
    pub base: Vec2,
    /// Wind rotation in radians, already scaled by maturity.
    pub rotation: f32,
    pub growth: Growth,
}

impl PlantPose {
    pub fn of(plant: &Plant, wind: &WindState, now_ms: Millis, config: &PlantConfig) -> Self {
        let growth = Growth::at_age(plant.age_ms(now_ms), config.growth_ms, config.rooting_ms);
        Self {
            base: Vec2::new(plant.x, plant.y),
            rotation: wind.plant_sway(plant.x) * growth.maturity,
            growth,
        }
    }
}
