//! Ground accumulation: puddles and snow cover.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::atmosphere::config::GroundConfig;
use crate::atmosphere::weather::WeatherPreset;
use crate::core::{Viewport, clamp01};

/// Puddle and snow levels, both always within `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundState {
    pub puddle_level: f32,
    pub snow_level: f32,
}

impl GroundState {
    /// Apply one tick of drying and snow accumulation under `preset`.
    ///
    /// Puddles move by `-dry_speed * dry_scale`, so a negative dry speed
    /// (wet weather) fills them.
    pub fn update(&mut self, preset: &WeatherPreset, config: &GroundConfig) {
        self.puddle_level = clamp01(self.puddle_level - preset.dry_speed * config.dry_scale);
        self.snow_level = if preset.is_freezing() {
            clamp01(self.snow_level + config.snow_rise)
        } else {
            clamp01(self.snow_level - config.snow_melt)
        };
    }
}

/// A static puddle ellipse at full size, in screen pixels. Drawn scaled by
/// the puddle level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Puddle {
    pub x: f32,
    pub y: f32,
    pub radius_x: f32,
    pub radius_y: f32,
}

/// Fixed set of decorative puddles, generated at init and on resize.
#[derive(Clone, Debug, Default)]
pub struct PuddleMap {
    puddles: Vec<Puddle>,
}

impl PuddleMap {
    /// Scatter `count` puddles over the lower two thirds of the viewport.
    pub fn generate(viewport: Viewport, count: usize, rng: &mut impl Rng) -> Self {
        if viewport.is_empty() {
            return Self::default();
        }
        let (w, h) = (viewport.width, viewport.height);
        let puddles = (0..count)
            .map(|_| Puddle {
                x: rng.gen_range(0.0..w),
                y: rng.gen_range(h / 3.0..h),
                radius_x: rng.gen_range(30.0..90.0),
                radius_y: rng.gen_range(8.0..22.0),
            })
            .collect();
        Self { puddles }
    }

    pub fn puddles(&self) -> &[Puddle] {
        &self.puddles
    }

    pub fn len(&self) -> usize {
        self.puddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puddles.is_empty()
    }
}
