//! Plant growth model.
//!
//! Growth is a pure function of a plant's age. Overall progress is remapped
//! into three overlapping stage windows so the reveal reads as continuous:
//!
//! | stage  | window      | used as                   |
//! |--------|-------------|---------------------------|
//! | stem   | `[0, 0.4]`  | linear height fraction    |
//! | leaves | `[0.2, 0.6]`| ease-out cubic scale      |
//! | flower | `[0.5, 1.0]`| ease-out cubic scale      |

use crate::core::{Millis, clamp01};

pub const STEM_WINDOW: (f32, f32) = (0.0, 0.4);
pub const LEAF_WINDOW: (f32, f32) = (0.2, 0.6);
pub const FLOWER_WINDOW: (f32, f32) = (0.5, 1.0);

/// `1 - (1 - x)^3`
#[inline]
pub fn ease_out_cubic(x: f32) -> f32 {
    let inv = 1.0 - clamp01(x);
    1.0 - inv * inv * inv
}

/// Remap `progress` into a stage window, clamped to `[0, 1]`.
#[inline]
pub fn stage_progress(progress: f32, (start, end): (f32, f32)) -> f32 {
    clamp01((progress - start) / (end - start))
}

/// Derived growth values for one plant at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Growth {
    /// Overall progress, `age / growth_duration` clamped.
    pub progress: f32,
    /// Stem stage progress; drawn as a linear height fraction.
    pub stem: f32,
    /// Raw leaf stage progress.
    pub leaves: f32,
    /// Raw flower stage progress.
    pub flower: f32,
    /// How rooted the plant is; scales wind sway so fresh plantings stand
    /// still. Reaches 1 long before full growth.
    pub maturity: f32,
}

impl Growth {
    pub fn at_age(age_ms: Millis, growth_ms: Millis, rooting_ms: Millis) -> Self {
        let progress = ratio(age_ms, growth_ms);
        Self {
            progress,
            stem: stage_progress(progress, STEM_WINDOW),
            leaves: stage_progress(progress, LEAF_WINDOW),
            flower: stage_progress(progress, FLOWER_WINDOW),
            maturity: ratio(age_ms, rooting_ms),
        }
    }

    /// Render scale of the leaf layer.
    pub fn leaf_scale(&self) -> f32 {
        ease_out_cubic(self.leaves)
    }

    /// Render scale of the flower layer.
    pub fn flower_scale(&self) -> f32 {
        ease_out_cubic(self.flower)
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }
}

/// `age / duration` clamped to `[0, 1]`; a zero duration means "done".
fn ratio(age_ms: Millis, duration_ms: Millis) -> f32 {
    if duration_ms <= 0.0 {
        return if age_ms >= 0.0 { 1.0 } else { 0.0 };
    }
    clamp01((age_ms / duration_ms) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROW: Millis = 12_000.0;
    const ROOT: Millis = 2_000.0;

    #[test]
    fn test_all_zero_at_planting() {
        let g = Growth::at_age(0.0, GROW, ROOT);
        assert_eq!((g.stem, g.leaves, g.flower, g.maturity), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(g.leaf_scale(), 0.0);
        assert_eq!(g.flower_scale(), 0.0);
    }

    #[test]
    fn test_all_complete_at_growth_duration() {
        let g = Growth::at_age(GROW, GROW, ROOT);
        assert_eq!((g.stem, g.leaves, g.flower, g.maturity), (1.0, 1.0, 1.0, 1.0));
        assert!(g.is_complete());
        assert_eq!(g.flower_scale(), 1.0);
    }

    #[test]
    fn test_stage_ordering() {
        let first_complete = |pick: fn(&Growth) -> f32| {
            (0..=12_000)
                .step_by(10)
                .find(|&age| pick(&Growth::at_age(age as f64, GROW, ROOT)) >= 1.0)
                .unwrap()
        };
        let stem = first_complete(|g| g.stem);
        let leaves = first_complete(|g| g.leaves);
        let flower = first_complete(|g| g.flower);
        assert!(stem < leaves, "stem {stem} leaves {leaves}");
        assert!(leaves <= flower, "leaves {leaves} flower {flower}");
        assert_eq!(stem, 4_800);
        assert_eq!(leaves, 7_200);
        assert_eq!(flower, 12_000);
    }

    #[test]
    fn test_stages_start_in_order_with_overlap() {
        // At 30% the stem is still growing while leaves have begun
        let g = Growth::at_age(3_600.0, GROW, ROOT);
        assert!(g.stem > 0.0 && g.stem < 1.0);
        assert!(g.leaves > 0.0);
        assert_eq!(g.flower, 0.0);
    }

    #[test]
    fn test_maturity_faster_than_growth() {
        let g = Growth::at_age(2_000.0, GROW, ROOT);
        assert_eq!(g.maturity, 1.0);
        assert!(g.progress < 0.2);
    }

    #[test]
    fn test_ease_out_cubic() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-6);
    }
}
