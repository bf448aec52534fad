//! Drifting light beams shown through the night darkness overlay.

use rand::Rng;

use crate::core::{Color, Vec2, Viewport};
use crate::scene::surface::{BlendMode, DrawCommand};

/// One slanted beam of light.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightBeam {
    /// Top edge x position in pixels.
    pub x: f32,
    pub width: f32,
    /// Horizontal drift per tick.
    pub speed: f32,
    /// Peak opacity before darkness scaling.
    pub alpha: f32,
    /// Horizontal offset of the bottom edge relative to the top.
    pub slant: f32,
}

/// The beam set, drifting across the viewport and wrapping at its edges.
#[derive(Clone, Debug, Default)]
pub struct LightBeams {
    beams: Vec<LightBeam>,
}

impl LightBeams {
    pub fn generate(count: usize, viewport: Viewport, rng: &mut impl Rng) -> Self {
        let width = viewport.width.max(1.0);
        let beams = (0..count)
            .map(|_| LightBeam {
                x: rng.gen_range(0.0..width),
                width: rng.gen_range(40.0..140.0),
                speed: rng.gen_range(0.05..0.3) * if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
                alpha: rng.gen_range(0.03..0.08),
                slant: rng.gen_range(-200.0..200.0),
            })
            .collect();
        Self { beams }
    }

    pub fn beams(&self) -> &[LightBeam] {
        &self.beams
    }

    /// Drift every beam, wrapping so it re-enters from the opposite side.
    pub fn update(&mut self, viewport: Viewport) {
        let span = viewport.width.max(1.0);
        for beam in &mut self.beams {
            beam.x += beam.speed;
            if beam.x > span + beam.width {
                beam.x = -beam.width;
            } else if beam.x < -beam.width {
                beam.x = span + beam.width;
            }
        }
    }

    /// Screen-blended beam polygons, fading in with `darkness`.
    pub fn commands(&self, viewport: Viewport, darkness: f32) -> impl Iterator<Item = DrawCommand> + '_ {
        let h = viewport.height;
        self.beams
            .iter()
            .filter(move |_| darkness > 0.0)
            .map(move |beam| DrawCommand::Polygon {
                points: vec![
                    Vec2::new(beam.x, 0.0),
                    Vec2::new(beam.x + beam.width, 0.0),
                    Vec2::new(beam.x + beam.width * 1.6 + beam.slant, h),
                    Vec2::new(beam.x + beam.slant, h),
                ],
                color: Color::rgba(1.0, 0.95, 0.8, beam.alpha * darkness),
                blend: BlendMode::Screen,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_beams_wrap_around() {
        let vp = Viewport::new(100.0, 50.0);
        let mut beams = LightBeams::generate(3, vp, &mut StdRng::seed_from_u64(1));
        for _ in 0..100_000 {
            beams.update(vp);
        }
        for beam in beams.beams() {
            assert!(beam.x >= -beam.width - 1.0 && beam.x <= 100.0 + beam.width + 1.0);
        }
    }

    #[test]
    fn test_no_beams_in_daylight() {
        let vp = Viewport::new(100.0, 50.0);
        let beams = LightBeams::generate(4, vp, &mut StdRng::seed_from_u64(2));
        assert_eq!(beams.commands(vp, 0.0).count(), 0);
        assert_eq!(beams.commands(vp, 0.5).count(), 4);
    }
}
