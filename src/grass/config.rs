//! Grass field configuration.

use serde::{Deserialize, Serialize};

use crate::core::Color;

/// Grass field settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Blades generated per field.
    pub blade_count: usize,
    /// Blade colors, sampled uniformly.
    pub palette: Vec<Color>,
    /// Blade height range in pixels, `[min, max)`.
    pub min_height: f32,
    pub max_height: f32,
    /// Largest random base tilt either side of vertical, radians.
    pub max_tilt: f32,
    /// Multiplier from the global wind angle to blade deflection.
    pub wind_gain: f32,
    /// Stroke width of the nearest blades.
    pub stroke_width: f32,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            blade_count: 8000,
            palette: vec![
                Color::rgb8(0x1e, 0x36, 0x1a),
                Color::rgb8(0x2d, 0x4c, 0x1e),
                Color::rgb8(0x4a, 0x6b, 0x2f),
                Color::rgb8(0x63, 0x82, 0x35),
                Color::rgb8(0x78, 0x94, 0x40),
                Color::rgb8(0x8f, 0x9e, 0x53),
            ],
            min_height: 14.0,
            max_height: 24.0,
            max_tilt: 0.2,
            wind_gain: 3.0,
            stroke_width: 2.0,
        }
    }
}
