//! Generic keyframe interpolation over the day cycle.
//!
//! [`ColorRamp`] interpolates keyed values over a unit cycle (`0.0` =
//! midnight, `0.5` = noon) with proper wrapping around midnight. Used for the
//! night darkness overlay; any value that varies smoothly with time of day can
//! be keyed the same way.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lerp trait
// ---------------------------------------------------------------------------

/// Trait for types that can be linearly interpolated.
pub trait Lerp: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

// ---------------------------------------------------------------------------
// ColorRamp
// ---------------------------------------------------------------------------

/// Keyframe-based value ramp with wrapping support for a unit day cycle.
///
/// Keys are `(time, value)` pairs sorted by time. Sampling at any time `t`
/// returns a linearly interpolated value between the surrounding keys,
/// wrapping correctly around midnight (1.0 == 0.0).
#[derive(Clone, Debug)]
pub struct ColorRamp<T: Lerp> {
    keys: Vec<(f32, T)>,
}

impl<T: Lerp> ColorRamp<T> {
    /// Create a new ramp from unsorted keys. Keys are sorted by time.
    pub fn new(mut keys: Vec<(f32, T)>) -> Self {
        keys.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self { keys }
    }

    /// Create a constant ramp that always returns the same value.
    pub fn constant(value: T) -> Self {
        Self {
            keys: vec![(0.0, value)],
        }
    }

    /// Sample the ramp at cycle position `t`, with wrapping.
    ///
    /// An empty ramp (only reachable through deserialization) samples as
    /// `fallback`.
    pub fn sample_or(&self, t: f32, fallback: T) -> T {
        let n = self.keys.len();
        match n {
            0 => return fallback,
            1 => return self.keys[0].1.clone(),
            _ => {}
        }

        // Wrap t into [0, 1)
        let t = t.rem_euclid(1.0);

        // First key strictly after t; None or Some(0) means the wrapping segment.
        let upper_idx = self.keys.iter().position(|k| k.0 > t);

        let (t_a, v_a, t_b, v_b, offset) = match upper_idx {
            Some(idx) if idx > 0 => {
                let (t_a, ref v_a) = self.keys[idx - 1];
                let (t_b, ref v_b) = self.keys[idx];
                (t_a, v_a, t_b, v_b, 0.0)
            }
            Some(_) => {
                // t precedes the first key: measure from the last key of the previous cycle
                let (t_a, ref v_a) = self.keys[n - 1];
                let (t_b, ref v_b) = self.keys[0];
                (t_a, v_a, t_b + 1.0, v_b, 1.0)
            }
            None => {
                let (t_a, ref v_a) = self.keys[n - 1];
                let (t_b, ref v_b) = self.keys[0];
                (t_a, v_a, t_b + 1.0, v_b, 0.0)
            }
        };

        let span = t_b - t_a;
        if span < 1e-6 {
            return v_a.clone();
        }
        v_a.lerp(v_b, (t + offset - t_a) / span)
    }
}

impl ColorRamp<f32> {
    /// Sample a scalar ramp; empty ramps sample as 0.
    pub fn sample(&self, t: f32) -> f32 {
        self.sample_or(t, 0.0)
    }
}

// ---------------------------------------------------------------------------
// Serde support
// ---------------------------------------------------------------------------

impl<T: Lerp + Serialize> Serialize for ColorRamp<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.keys.serialize(serializer)
    }
}

impl<'de, T: Lerp + Deserialize<'de>> Deserialize<'de> for ColorRamp<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keys = Vec::<(f32, T)>::deserialize(deserializer)?;
        Ok(Self::new(keys))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
