//! Atmosphere configuration.

use serde::{Deserialize, Serialize};

use crate::atmosphere::color_ramp::ColorRamp;
use crate::core::Millis;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Full atmosphere configuration. Time-of-day ramps are keyed over a unit
/// cycle (`0.0` = midnight, `0.5` = noon) and interpolated by [`ColorRamp`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereConfig {
    /// Exponential smoothing factor applied to wind speed and force each
    /// tick. Clamped to `(0, 1]` at use. Larger = snappier transitions.
    pub smoothing: f32,
    /// Length of one full day/night cycle in milliseconds. 0 = time is paused.
    pub day_cycle_ms: Millis,
    /// Starting position in the cycle, `[0, 1)`.
    pub start_time_of_day: f32,
    /// Let a preset's `direction` pin the wind direction. When false the
    /// direction is a global background wave independent of the weather.
    pub honor_preset_direction: bool,
    /// Weather active at startup.
    pub initial_weather: String,

    /// Opacity of the night darkness overlay over the day.
    pub darkness_ramp: ColorRamp<f32>,

    // -- Sub-configs -------------------------------------------------------

    pub direction: DirectionWaves,
    pub ground: GroundConfig,
    pub lightning: LightningConfig,
    /// Per-tick smoothing factor of the aurora opacity.
    pub aurora_fade: f32,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.02,
            day_cycle_ms: 180_000.0, // 3 minutes per day
            start_time_of_day: 0.5,
            honor_preset_direction: false,
            initial_weather: "sunny".to_string(),

            darkness_ramp: ColorRamp::new(vec![
                (0.0, 0.75),  // midnight
                (0.2, 0.65),  // pre-dawn
                (0.3, 0.0),   // full day
                (0.7, 0.0),   // late afternoon
                (0.8, 0.65),  // after dusk
            ]),

            direction: DirectionWaves::default(),
            ground: GroundConfig::default(),
            lightning: LightningConfig::default(),
            aurora_fade: 0.02,
        }
    }
}

impl AtmosphereConfig {
    /// Smoothing factor restricted to the range where smoothing converges
    /// without overshoot.
    pub fn effective_smoothing(&self) -> f32 {
        if self.smoothing.is_finite() {
            self.smoothing.clamp(f32::EPSILON, 1.0)
        } else {
            Self::default().smoothing
        }
    }
}

// ---------------------------------------------------------------------------
// Wind direction
// ---------------------------------------------------------------------------

/// Background wind-direction wave: two sines of different periods plus low
/// amplitude Perlin noise.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionWaves {
    pub primary_amplitude: f32,
    pub primary_period_ms: Millis,
    pub secondary_amplitude: f32,
    pub secondary_period_ms: Millis,
    pub noise_amplitude: f32,
    /// Milliseconds per unit of noise input.
    pub noise_period_ms: Millis,
    pub noise_seed: u32,
}

impl Default for DirectionWaves {
    fn default() -> Self {
        Self {
            primary_amplitude: 0.9,
            primary_period_ms: 47_000.0,
            secondary_amplitude: 0.4,
            secondary_period_ms: 13_000.0,
            noise_amplitude: 0.15,
            noise_period_ms: 20_000.0,
            noise_seed: 7,
        }
    }
}

impl DirectionWaves {
    /// Upper bound of `|direction|` this wave can produce.
    pub fn max_magnitude(&self) -> f32 {
        self.primary_amplitude.abs() + self.secondary_amplitude.abs() + self.noise_amplitude.abs()
    }
}

// ---------------------------------------------------------------------------
// Ground
// ---------------------------------------------------------------------------

/// Per-tick puddle and snow accumulation rates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Puddles fall by `dry_speed * dry_scale` per tick.
    pub dry_scale: f32,
    /// Snow rise per tick while the preset is freezing.
    pub snow_rise: f32,
    /// Snow decay per tick otherwise.
    pub snow_melt: f32,
    /// Number of puddle ellipses in the static puddle map.
    pub puddle_count: usize,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            dry_scale: 0.05,
            snow_rise: 0.001,
            snow_melt: 0.0005,
            puddle_count: 14,
        }
    }
}

// ---------------------------------------------------------------------------
// Lightning
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LightningConfig {
    /// Per-tick chance of a strike while the preset has lightning.
    pub chance: f32,
    /// Per-tick smoothing factor of the flash fade-out.
    pub fade: f32,
}

impl Default for LightningConfig {
    fn default() -> Self {
        Self {
            chance: 0.006,
            fade: 0.08,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let cfg: AtmosphereConfig =
            serde_json::from_str(r#"{ "smoothing": 0.05, "ground": { "snow_rise": 0.01 } }"#).unwrap();
        assert!((cfg.smoothing - 0.05).abs() < 1e-6);
        assert!((cfg.ground.snow_rise - 0.01).abs() < 1e-6);
        assert!((cfg.ground.dry_scale - 0.05).abs() < 1e-6);
        assert_eq!(cfg.initial_weather, "sunny");
    }

    #[test]
    fn test_effective_smoothing_clamped() {
        let mut cfg = AtmosphereConfig::default();
        cfg.smoothing = 4.0;
        assert_eq!(cfg.effective_smoothing(), 1.0);
        cfg.smoothing = f32::NAN;
        assert!((cfg.effective_smoothing() - 0.02).abs() < 1e-6);
        cfg.smoothing = -1.0;
        assert!(cfg.effective_smoothing() > 0.0);
    }

    #[test]
    fn test_darkness_ramp_dark_at_night_clear_at_noon() {
        let cfg = AtmosphereConfig::default();
        assert!(cfg.darkness_ramp.sample(0.0) > 0.5);
        assert_eq!(cfg.darkness_ramp.sample(0.5), 0.0);
    }
}
