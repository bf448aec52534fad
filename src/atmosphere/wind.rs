//! Wind physics: smoothed speed/force, phase accumulator, and the global
//! direction wave.

use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};

use crate::atmosphere::config::DirectionWaves;
use crate::core::Millis;

/// One exponential smoothing step toward `target`.
///
/// For `factor` in `(0, 1]` the result never overshoots: it lies between
/// `value` and `target` inclusive.
#[inline]
pub fn smooth(value: f32, target: f32, factor: f32) -> f32 {
    value + (target - value) * factor
}

/// Runtime wind state, mutated once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindState {
    /// Phase speed of the wind waveform (per tick).
    pub speed: f32,
    pub force: f32,
    /// Signed direction, practically within `[-1.5, 1.5]`.
    pub direction: f32,
    /// Monotonic phase; advances by `speed` every tick and is never reset.
    pub accumulator: f32,
    /// Derived global wind angle used for grass deflection. Display only.
    pub value: f32,
}

impl WindState {
    pub fn new(speed: f32, force: f32) -> Self {
        Self {
            speed,
            force,
            direction: 1.0,
            accumulator: 0.0,
            value: 0.0,
        }
    }

    /// Move speed and force one smoothing step toward their targets.
    pub fn smooth_toward(&mut self, speed: f32, force: f32, factor: f32) {
        self.speed = smooth(self.speed, speed, factor);
        self.force = smooth(self.force, force, factor);
    }

    /// Advance the phase accumulator and refresh the derived wind angle.
    pub fn advance(&mut self, elapsed_ms: Millis) {
        // Negative speeds would walk the phase backwards
        self.accumulator += self.speed.max(0.0);
        let drift = (elapsed_ms * 0.0007).cos() as f32 * 0.2;
        self.value = (self.accumulator.sin() + drift) * self.signed_force();
    }

    /// `force * direction`, the quantity particles drift by.
    #[inline]
    pub fn signed_force(&self) -> f32 {
        self.force * self.direction
    }

    /// Rotation of a fully rooted plant standing at horizontal position `x`.
    pub fn plant_sway(&self, x: f32) -> f32 {
        let local = (self.accumulator + x * 0.005).sin();
        let lean = self.force * 0.5;
        (local + lean) * self.signed_force()
    }
}

impl Default for WindState {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Samples the background direction wave at a point in time.
pub struct DirectionField {
    waves: DirectionWaves,
    perlin: Perlin,
}

impl DirectionField {
    pub fn new(waves: DirectionWaves) -> Self {
        let perlin = Perlin::new(waves.noise_seed);
        Self { waves, perlin }
    }

    /// Direction at `elapsed_ms` since the simulation started.
    pub fn sample(&self, elapsed_ms: Millis) -> f32 {
        let w = &self.waves;
        let wave = |amp: f32, period: Millis| -> f32 {
            if period <= 0.0 {
                return 0.0;
            }
            amp * (elapsed_ms / period * std::f64::consts::TAU).sin() as f32
        };
        let noise = if w.noise_period_ms > 0.0 {
            let t = elapsed_ms / w.noise_period_ms;
            (self.perlin.get([t, 0.5]) as f32).clamp(-1.0, 1.0) * w.noise_amplitude
        } else {
            0.0
        };
        // The primary wave starts at +1 so a fresh garden blows left to right
        let primary = if w.primary_period_ms > 0.0 {
            w.primary_amplitude * (elapsed_ms / w.primary_period_ms * std::f64::consts::TAU).cos() as f32
        } else {
            w.primary_amplitude
        };
        primary + wave(w.secondary_amplitude, w.secondary_period_ms) + noise
    }
}
