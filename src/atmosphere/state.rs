//! Atmosphere runtime state snapshot.

use serde::{Deserialize, Serialize};

use crate::atmosphere::ground::GroundState;
use crate::atmosphere::time::DayPhase;
use crate::atmosphere::wind::WindState;
use crate::core::Color;

/// Full atmosphere state computed each tick by [`super::AtmosphereSystem`].
///
/// Everything the compositor, audio mix and readout need, so none of them
/// has to reach back into the physics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AtmosphereState {
    // Weather
    /// Name the host asked for (may be unknown to the table).
    pub weather: String,
    /// Label to display, night-adjusted.
    pub label: String,
    pub visibility: f32,
    pub dark: bool,
    pub tint: Option<Color>,

    // Time
    pub time_of_day: f32,
    pub day_count: u32,
    pub is_night: bool,
    pub phase: DayPhase,

    // Physics
    pub wind: WindState,
    pub ground: GroundState,

    // Effects
    pub lightning: f32,
    pub aurora: f32,
    pub aurora_phase: f32,
    /// Opacity of the night darkness overlay.
    pub darkness: f32,
}

impl Default for AtmosphereState {
    fn default() -> Self {
        Self {
            weather: String::new(),
            label: String::new(),
            visibility: 1.0,
            dark: false,
            tint: None,
            time_of_day: 0.5,
            day_count: 0,
            is_night: false,
            phase: DayPhase::Day,
            wind: WindState::default(),
            ground: GroundState::default(),
            lightning: 0.0,
            aurora: 0.0,
            aurora_phase: 0.0,
            darkness: 0.0,
        }
    }
}

impl AtmosphereState {
    /// Wind speed for display, in the garden's nominal km/h.
    pub fn wind_kmh(&self) -> u32 {
        (self.wind.signed_force().abs() * 250.0).floor() as u32
    }

    /// Wind arrow rotation in degrees: 0 points right (blowing left to
    /// right), 180 points left, sweeping through 90 as the direction
    /// crosses zero.
    pub fn wind_arrow_degrees(&self) -> f32 {
        (1.0 - self.wind.direction.clamp(-1.0, 1.0)) * 90.0
    }
}
