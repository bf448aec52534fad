//! Pointer hit-testing, hover and click handling.
//!
//! Hover and click share one hitbox: a box `2 * hitbox_half_width` wide
//! reaching `hitbox_height` pixels up from the plant's base. The box is
//! centered on the swayed anchor, the base x shifted by
//! `sin(rotation) * sway_reach`, so it follows the stalk in strong wind.
//! The first plant in list order that contains the point wins.

use serde::{Deserialize, Serialize};

use crate::core::{Millis, Vec2};
use crate::garden::{NewPlant, Plant, PlantId, PlantPose};

/// Hitbox and cooldown settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Points strictly closer than this horizontally are inside.
    pub hitbox_half_width: f32,
    /// Inclusive height of the box above the base.
    pub hitbox_height: f32,
    /// Horizontal reach of a fully swayed stalk.
    pub sway_reach: f32,
    /// Minimum time between two protect actions.
    pub cooldown_ms: Millis,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hitbox_half_width: 40.0,
            hitbox_height: 200.0,
            sway_reach: 60.0,
            cooldown_ms: 2_000.0,
        }
    }
}

/// Accepts protect requests. Fire-and-forget.
pub trait ProtectSink {
    fn protect(&mut self, id: PlantId);
}

/// Accepts new plantings. Fire-and-forget.
pub trait CreationSink {
    fn create(&mut self, plant: NewPlant);
}

/// The drawing tool that produces a new plant's textures.
pub trait PlantEditor {
    /// Open the editor for a planting at `at`.
    fn open(&mut self, at: Vec2);
}

/// Discards every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ProtectSink for NullSink {
    fn protect(&mut self, _id: PlantId) {}
}

impl CreationSink for NullSink {
    fn create(&mut self, _plant: NewPlant) {}
}

impl PlantEditor for NullSink {
    fn open(&mut self, _at: Vec2) {}
}

/// Center of the hitbox's bottom edge.
pub fn hit_anchor(pose: &PlantPose, config: &InteractionConfig) -> Vec2 {
    Vec2::new(pose.base.x + pose.rotation.sin() * config.sway_reach, pose.base.y)
}

/// Whether `point` lies in the plant's hitbox.
pub fn hits(pose: &PlantPose, point: Vec2, config: &InteractionConfig) -> bool {
    let anchor = hit_anchor(pose, config);
    let dx = (point.x - anchor.x).abs();
    // Positive when the point is above the base
    let dy = anchor.y - point.y;
    dx < config.hitbox_half_width && dy >= 0.0 && dy <= config.hitbox_height
}

/// Index of the first plant whose hitbox contains `point`.
pub fn hit_test(poses: &[PlantPose], point: Vec2, config: &InteractionConfig) -> Option<usize> {
    poses.iter().position(|pose| hits(pose, point, config))
}

/// The plant under `point`, if any.
pub fn plant_at<'a>(
    plants: &'a [Plant],
    poses: &[PlantPose],
    point: Vec2,
    config: &InteractionConfig,
) -> Option<&'a Plant> {
    hit_test(poses, point, config).and_then(|i| plants.get(i))
}

/// What a primary click turned into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickOutcome {
    /// Plant hit and protected.
    Protected(PlantId),
    /// Plant hit while the protect action was cooling down; nothing happens.
    CoolingDown(PlantId),
    /// Empty ground: plant something here.
    Planting(Vec2),
}

/// Applies the protect cooldown to clicks.
#[derive(Clone, Debug)]
pub struct ClickHandler {
    cooldown_ms: Millis,
    /// Time of the last successful protect.
    last_protect: Option<Millis>,
}

impl ClickHandler {
    pub fn new(cooldown_ms: Millis) -> Self {
        Self {
            cooldown_ms,
            last_protect: None,
        }
    }

    /// Resolve a click given the plant it hit.
    pub fn click(&mut self, hit: Option<PlantId>, at: Vec2, now_ms: Millis) -> ClickOutcome {
        let Some(id) = hit else {
            return ClickOutcome::Planting(at);
        };
        if let Some(last) = self.last_protect {
            if now_ms - last < self.cooldown_ms {
                log::debug!("Protect on plant {} ignored, cooling down", id);
                return ClickOutcome::CoolingDown(id);
            }
        }
        self.last_protect = Some(now_ms);
        ClickOutcome::Protected(id)
    }

    /// Time left before the next protect is accepted.
    pub fn remaining(&self, now_ms: Millis) -> Millis {
        match self.last_protect {
            Some(last) => (self.cooldown_ms - (now_ms - last)).max(0.0),
            None => 0.0,
        }
    }
}
