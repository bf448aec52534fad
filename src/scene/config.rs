//! Scene compositor configuration

use serde::{Deserialize, Serialize};

use crate::atmosphere::DayPhase;
use crate::core::Color;

/// Top and bottom colors of the background gradient for one day phase.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkyGradient {
    pub top: Color,
    pub bottom: Color,
}

impl SkyGradient {
    pub const fn new(top: Color, bottom: Color) -> Self {
        Self { top, bottom }
    }
}

/// Background palette per day phase.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyPalette {
    pub dawn: SkyGradient,
    pub day: SkyGradient,
    pub dusk: SkyGradient,
    pub night: SkyGradient,
}

impl Default for SkyPalette {
    fn default() -> Self {
        Self {
            // Muted reddish-brown earth
            dawn: SkyGradient::new(Color::rgb8(0x4a, 0x3b, 0x3b), Color::rgb8(0x6b, 0x4c, 0x4c)),
            // Dark forest floor
            day: SkyGradient::new(Color::rgb8(0x2a, 0x3a, 0x2a), Color::rgb8(0x3a, 0x4a, 0x3a)),
            dusk: SkyGradient::new(Color::rgb8(0x2d, 0x24, 0x24), Color::rgb8(0x4a, 0x30, 0x30)),
            night: SkyGradient::new(Color::rgb8(0x05, 0x05, 0x05), Color::rgb8(0x1a, 0x1a, 0x1a)),
        }
    }
}

impl SkyPalette {
    pub fn for_phase(&self, phase: DayPhase) -> SkyGradient {
        match phase {
            DayPhase::Dawn => self.dawn,
            DayPhase::Day => self.day,
            DayPhase::Dusk => self.dusk,
            DayPhase::Night => self.night,
        }
    }
}

/// Configuration for the scene compositor
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub sky: SkyPalette,
    /// How far `dark` presets pull the background toward black.
    pub dark_weather_dim: f32,
    /// Strength of the multiply tint over the background.
    pub sky_tint_strength: f32,
    /// Opacity of the full-screen tint overlay.
    pub overlay_tint_strength: f32,
    /// Fog color and its opacity at zero visibility.
    pub fog_color: Color,
    pub fog_strength: f32,
    pub night_color: Color,
    /// Number of drifting light beams.
    pub light_beams: usize,
    pub puddle_color: Color,
    /// Snow level above which the bottom snow drift is drawn.
    pub snow_drift_threshold: f32,
    /// Side length of a plant texture layer in pixels.
    pub layer_size: f32,
    /// Local pivots of the leaf and flower layers, pixels above the base.
    pub leaf_anchor: f32,
    pub flower_anchor: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            sky: SkyPalette::default(),
            dark_weather_dim: 0.45,
            sky_tint_strength: 0.6,
            overlay_tint_strength: 0.2,
            fog_color: Color::rgb8(0xa8, 0xb0, 0xb8),
            fog_strength: 0.75,
            night_color: Color::rgb8(0x00, 0x06, 0x14),
            light_beams: 5,
            puddle_color: Color::rgba(0.45, 0.6, 0.78, 0.45),
            snow_drift_threshold: 0.3,
            layer_size: 160.0,
            leaf_anchor: 80.0,
            flower_anchor: 150.0,
        }
    }
}
