//! Procedural grass field.
//!
//! Blades are static records generated once per viewport size. The whole
//! field is regenerated on resize; individual blades are never removed.

pub mod config;

pub use config::GrassConfig;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::core::{Color, Vec2, Viewport};

/// One grass blade.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrassBlade {
    /// Base position in pixels.
    pub pos: Vec2,
    /// Resting tilt in radians.
    pub base_angle: f32,
    pub color: Color,
    pub height: f32,
    /// Depth factor in `[0, 1]`; nearer blades sway more.
    pub z: f32,
}

impl GrassBlade {
    /// Blade angle under the global wind angle, scaled by depth for parallax.
    pub fn angle(&self, wind_value: f32, wind_gain: f32) -> f32 {
        self.base_angle + wind_value * wind_gain * (0.4 + 0.6 * self.z)
    }

    /// Control point and tip of the quadratic stroke for a given angle.
    pub fn curve(&self, angle: f32) -> (Vec2, Vec2) {
        let dir = Vec2::new(angle.sin(), -angle.cos());
        let control = self.pos + dir * (self.height * 0.5);
        // The tip bends further than the midpoint so the blade reads as curved
        let tip_dir = Vec2::new((angle * 1.3).sin(), -(angle * 1.3).cos());
        let tip = self.pos + tip_dir * self.height;
        (control, tip)
    }
}

/// The full set of blades for one viewport size, sorted far-to-near.
#[derive(Clone, Debug, Default)]
pub struct GrassField {
    blades: Vec<GrassBlade>,
    viewport: Viewport,
}

impl GrassField {
    /// Generate a field covering `[0, width) x [0, height)`.
    pub fn generate(viewport: Viewport, config: &GrassConfig, rng: &mut impl Rng) -> Self {
        if viewport.is_empty() {
            return Self { blades: Vec::new(), viewport };
        }

        let fallback = [Color::rgb8(0x2d, 0x4c, 0x1e)];
        let palette: &[Color] = if config.palette.is_empty() { &fallback } else { &config.palette };
        let (min_h, max_h) = if config.max_height > config.min_height {
            (config.min_height, config.max_height)
        } else {
            (config.min_height, config.min_height + 1.0)
        };
        let tilt = config.max_tilt.abs();

        let mut blades: Vec<GrassBlade> = (0..config.blade_count)
            .map(|_| {
                let z: f32 = rng.r#gen();
                GrassBlade {
                    pos: Vec2::new(rng.gen_range(0.0..viewport.width), rng.gen_range(0.0..viewport.height)),
                    base_angle: if tilt > 0.0 { rng.gen_range(-tilt..tilt) } else { 0.0 },
                    color: *palette.choose(rng).unwrap_or(&fallback[0]),
                    height: rng.gen_range(min_h..max_h) * (0.6 + 0.4 * z),
                    z,
                }
            })
            .collect();

        // Painter's order: higher on screen is further away
        blades.sort_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        Self { blades, viewport }
    }

    pub fn blades(&self) -> &[GrassBlade] {
        &self.blades
    }

    pub fn len(&self) -> usize {
        self.blades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blades.is_empty()
    }

    /// Viewport this field was generated for.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_blades_inside_viewport() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = GrassConfig { blade_count: 3000, ..GrassConfig::default() };
        for vp in [Viewport::new(320.0, 200.0), Viewport::new(1920.0, 1080.0), Viewport::new(1.0, 1.0)] {
            let field = GrassField::generate(vp, &config, &mut rng);
            assert_eq!(field.len(), 3000);
            for b in field.blades() {
                assert!(b.pos.x >= 0.0 && b.pos.x < vp.width);
                assert!(b.pos.y >= 0.0 && b.pos.y < vp.height);
                assert!((0.0..1.0).contains(&b.z));
            }
        }
    }

    #[test]
    fn test_sorted_far_to_near() {
        let mut rng = StdRng::seed_from_u64(12);
        let field = GrassField::generate(Viewport::new(400.0, 300.0), &GrassConfig::default(), &mut rng);
        assert!(field.blades().windows(2).all(|w| w[0].pos.y <= w[1].pos.y));
    }

    #[test]
    fn test_empty_viewport_yields_no_blades() {
        let mut rng = StdRng::seed_from_u64(1);
        let field = GrassField::generate(Viewport::new(0.0, 300.0), &GrassConfig::default(), &mut rng);
        assert!(field.is_empty());
    }

    #[test]
    fn test_nearer_blades_deflect_more() {
        let blade = GrassBlade {
            pos: Vec2::new(10.0, 10.0),
            base_angle: 0.0,
            color: Color::BLACK,
            height: 18.0,
            z: 0.0,
        };
        let near = GrassBlade { z: 1.0, ..blade };
        assert!(near.angle(0.2, 3.0) > blade.angle(0.2, 3.0));
        assert_eq!(blade.angle(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_upright_blade_tip_above_base() {
        let blade = GrassBlade {
            pos: Vec2::new(50.0, 50.0),
            base_angle: 0.0,
            color: Color::BLACK,
            height: 20.0,
            z: 0.5,
        };
        let (control, tip) = blade.curve(0.0);
        assert!((tip - Vec2::new(50.0, 30.0)).length() < 1e-4);
        assert!((control - Vec2::new(50.0, 40.0)).length() < 1e-4);
    }
}
