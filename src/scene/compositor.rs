//! Frame compositor.
//!
//! Records one [`Frame`] per tick in a fixed order:
//!
//! 1. sky gradient by day phase, tint (multiply), aurora band (screen)
//! 2. ground: puddles scaled by puddle level, snow drift
//! 3. grass blades, bent by the wind and whitened by snow
//! 4. plants, far to near, with shadow, glow, filters and growth layers
//! 5. weather particles
//! 6. overlays: tint, fog, night darkness with light beams, lightning
//! 7. hover name tag in screen space

use rand::Rng;

use crate::atmosphere::{AtmosphereState, PuddleMap, WeatherPreset};
use crate::core::{Affine2, Color, Millis, Rect, Vec2, Viewport, clamp01};
use crate::garden::{Plant, PlantId, PlantPose, TextureCache, TextureStatus};
use crate::grass::{GrassConfig, GrassField};
use crate::particles::{Particle, ParticleKind};
use crate::scene::config::SceneConfig;
use crate::scene::overlay::LightBeams;
use crate::scene::surface::{BlendMode, DrawCommand, Frame, ImageFilter, Layer, Paint};

const RAIN_COLOR: Color = Color::rgba(174.0 / 255.0, 194.0 / 255.0, 224.0 / 255.0, 0.4);
const HOVER_GLOW: Color = Color::rgba(1.0, 1.0, 1.0, 0.35);
const PROTECT_GLOW: Color = Color::rgba(1.0, 0.84, 0.3, 0.3);
const FROST: Color = Color::rgba(0.92, 0.96, 1.0, 1.0);
const ASH: Color = Color::rgba(0.35, 0.33, 0.32, 1.0);
const TAG_BACKGROUND: Color = Color::rgba(0.0, 0.0, 0.0, 0.7);

/// Approximate advance of a bold 20px glyph.
const TAG_GLYPH_WIDTH: f32 = 11.0;
const TAG_HEIGHT: f32 = 40.0;
/// Tag top edge above the plant base.
const TAG_RISE: f32 = 180.0;

/// Everything the compositor reads for one frame.
pub struct SceneInput<'a> {
    pub viewport: Viewport,
    pub atmosphere: &'a AtmosphereState,
    pub preset: &'a WeatherPreset,
    pub grass: &'a GrassField,
    pub grass_config: &'a GrassConfig,
    pub puddles: &'a PuddleMap,
    pub particles: &'a [Particle],
    /// Plants with their poses for this tick, index-aligned.
    pub plants: &'a [Plant],
    pub poses: &'a [PlantPose],
    pub hovered: Option<PlantId>,
    pub now_ms: Millis,
}

/// Owns the compositor's own decorations and records frames.
pub struct Compositor {
    config: SceneConfig,
    beams: LightBeams,
}

impl Compositor {
    pub fn new(config: SceneConfig, viewport: Viewport, rng: &mut impl Rng) -> Self {
        let beams = LightBeams::generate(config.light_beams, viewport, rng);
        Self { config, beams }
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Regenerate viewport-dependent decorations.
    pub fn resize(&mut self, viewport: Viewport, rng: &mut impl Rng) {
        self.beams = LightBeams::generate(self.config.light_beams, viewport, rng);
    }

    /// Record the frame. Textures that are not decoded yet are skipped.
    pub fn compose(&mut self, input: &SceneInput<'_>, textures: &mut TextureCache) -> Frame {
        let mut frame = Frame::new(input.viewport);
        if input.viewport.is_empty() {
            return frame;
        }
        self.beams.update(input.viewport);

        self.draw_sky(&mut frame, input);
        self.draw_ground(&mut frame, input);
        self.draw_grass(&mut frame, input);
        self.draw_plants(&mut frame, input, textures);
        self.draw_particles(&mut frame, input);
        self.draw_overlays(&mut frame, input);
        self.draw_hover_tag(&mut frame, input);
        frame
    }

    fn draw_sky(&self, frame: &mut Frame, input: &SceneInput<'_>) {
        let atmo = input.atmosphere;
        let bounds = input.viewport.bounds();
        let sky = self.config.sky.for_phase(atmo.phase);
        let (mut top, mut bottom) = (sky.top, sky.bottom);
        if atmo.dark {
            top = top.mix(&Color::BLACK, self.config.dark_weather_dim);
            bottom = bottom.mix(&Color::BLACK, self.config.dark_weather_dim);
        }
        frame.push(
            Layer::Sky,
            DrawCommand::FillRect {
                rect: bounds,
                paint: Paint::vertical(top, bottom),
                blend: BlendMode::SourceOver,
            },
        );
        if let Some(tint) = atmo.tint {
            frame.push(
                Layer::Sky,
                DrawCommand::FillRect {
                    rect: bounds,
                    paint: Paint::Solid(tint.with_alpha(self.config.sky_tint_strength)),
                    blend: BlendMode::Multiply,
                },
            );
        }

        if atmo.aurora > 0.0 {
            let bands = [
                Color::rgba(0.2, 1.0, 0.6, 0.25),
                Color::rgba(0.4, 0.9, 1.0, 0.2),
                Color::rgba(0.7, 0.4, 1.0, 0.15),
            ];
            let w = input.viewport.width;
            let h = input.viewport.height;
            for (i, color) in bands.iter().enumerate() {
                let offset = i as f32;
                let top_y = h * (0.12 + 0.06 * offset);
                let thickness = h * 0.08;
                let edge: Vec<Vec2> = (0..=16)
                    .map(|s| {
                        let x = w * s as f32 / 16.0;
                        let wave = (x * 0.01 + atmo.aurora_phase + offset).sin() * 20.0;
                        Vec2::new(x, top_y + wave)
                    })
                    .collect();
                let mut points = edge.clone();
                points.extend(edge.iter().rev().map(|p| *p + Vec2::new(0.0, thickness)));
                frame.push(
                    Layer::Aurora,
                    DrawCommand::Polygon {
                        points,
                        color: color.with_alpha(color.a * atmo.aurora),
                        blend: BlendMode::Screen,
                    },
                );
            }
        }
    }

    fn draw_ground(&self, frame: &mut Frame, input: &SceneInput<'_>) {
        let ground = &input.atmosphere.ground;
        if ground.puddle_level > 0.01 {
            let color = self.config.puddle_color;
            for puddle in input.puddles.puddles() {
                frame.push(
                    Layer::Ground,
                    DrawCommand::Ellipse {
                        center: Vec2::new(puddle.x, puddle.y),
                        radii: Vec2::new(puddle.radius_x, puddle.radius_y) * ground.puddle_level,
                        color: color.with_alpha(color.a * ground.puddle_level),
                        blend: BlendMode::SourceOver,
                    },
                );
            }
        }

        if ground.snow_level > self.config.snow_drift_threshold {
            let vp = input.viewport;
            let depth = vp.height * 0.25 * ground.snow_level;
            frame.push(
                Layer::Ground,
                DrawCommand::FillRect {
                    rect: Rect::new(0.0, vp.height - depth, vp.width, depth),
                    paint: Paint::vertical(
                        Color::WHITE.with_alpha(0.0),
                        Color::WHITE.with_alpha(0.8 * ground.snow_level),
                    ),
                    blend: BlendMode::SourceOver,
                },
            );
        }
    }

    fn draw_grass(&self, frame: &mut Frame, input: &SceneInput<'_>) {
        let wind_value = input.atmosphere.wind.value;
        let snow = input.atmosphere.ground.snow_level * 0.7;
        let gain = input.grass_config.wind_gain;
        let width = input.grass_config.stroke_width;
        for blade in input.grass.blades() {
            let (control, tip) = blade.curve(blade.angle(wind_value, gain));
            let color = if snow > 0.0 { blade.color.mix(&Color::WHITE, snow) } else { blade.color };
            frame.push(
                Layer::Grass,
                DrawCommand::QuadCurve {
                    from: blade.pos,
                    control,
                    to: tip,
                    width,
                    color,
                },
            );
        }
    }

    fn draw_plants(&self, frame: &mut Frame, input: &SceneInput<'_>, textures: &mut TextureCache) {
        let size = self.config.layer_size;
        let snow = input.atmosphere.ground.snow_level;
        let ashfall = input.preset.ash_rate.is_some();

        // Far (small y) to near
        let mut order: Vec<usize> = (0..input.plants.len().min(input.poses.len())).collect();
        order.sort_by(|&a, &b| input.poses[a].base.y.total_cmp(&input.poses[b].base.y));

        for i in order {
            let plant = &input.plants[i];
            let pose = &input.poses[i];
            let growth = &pose.growth;
            let dead = plant.is_dead();

            frame.push(
                Layer::Plants,
                DrawCommand::Ellipse {
                    center: pose.base,
                    radii: Vec2::new(size * 0.2 * growth.stem.max(0.3), 6.0),
                    color: Color::BLACK.with_alpha(0.3),
                    blend: BlendMode::Multiply,
                },
            );

            let glow = if input.hovered == Some(plant.id) {
                Some(HOVER_GLOW)
            } else if plant.is_protected(input.now_ms) {
                Some(PROTECT_GLOW)
            } else {
                None
            };
            if let Some(color) = glow {
                frame.push(
                    Layer::Plants,
                    DrawCommand::Ellipse {
                        center: pose.base - Vec2::new(0.0, size * 0.5 * growth.stem.max(0.3)),
                        radii: Vec2::new(size * 0.4, size * 0.6),
                        color,
                        blend: BlendMode::Screen,
                    },
                );
            }

            let mut filter = ImageFilter::default();
            let mut alpha = 1.0;
            if dead {
                filter.desaturate = 1.0;
                alpha = 0.5;
            }
            if ashfall {
                filter.wash = Some(ASH);
                filter.wash_amount = 0.4;
            } else if snow > self.config.snow_drift_threshold {
                filter.wash = Some(FROST);
                filter.wash_amount = snow * 0.5;
            }

            let base_tf = Affine2::from_translation(pose.base) * Affine2::from_angle(pose.rotation);

            if growth.stem > 0.0 {
                if let Some(image) = ready(textures, &plant.stem_tex) {
                    let (iw, ih) = (image.width() as f32, image.height() as f32);
                    let h = size * growth.stem;
                    frame.push(
                        Layer::Plants,
                        DrawCommand::Image {
                            image,
                            src: Rect::new(0.0, ih * (1.0 - growth.stem), iw, ih * growth.stem),
                            dst: Rect::new(-size * 0.5, -h, size, h),
                            transform: base_tf,
                            alpha,
                            filter,
                        },
                    );
                }
            }

            let layers = [
                (&plant.leaf_tex, growth.leaf_scale(), self.config.leaf_anchor),
                (&plant.flower_tex, growth.flower_scale(), self.config.flower_anchor),
            ];
            for (payload, scale, anchor) in layers {
                if scale <= 0.0 {
                    continue;
                }
                let Some(image) = ready(textures, payload) else { continue };
                let pivot = Vec2::new(0.0, -anchor);
                let transform = base_tf
                    * Affine2::from_translation(pivot)
                    * Affine2::from_scale(Vec2::splat(scale))
                    * Affine2::from_translation(-pivot);
                let (iw, ih) = (image.width() as f32, image.height() as f32);
                frame.push(
                    Layer::Plants,
                    DrawCommand::Image {
                        image,
                        src: Rect::new(0.0, 0.0, iw, ih),
                        dst: Rect::new(-size * 0.5, -size, size, size),
                        transform,
                        alpha,
                        filter,
                    },
                );
            }
        }
    }

    fn draw_particles(&self, frame: &mut Frame, input: &SceneInput<'_>) {
        let push = input.atmosphere.wind.signed_force();
        for p in input.particles {
            let command = match p.kind {
                ParticleKind::Rain { length } => DrawCommand::Line {
                    from: p.pos,
                    to: p.pos + Vec2::new(push * 10.0, length),
                    width: 1.0,
                    color: RAIN_COLOR,
                },
                ParticleKind::Snow { .. } => DrawCommand::Circle {
                    center: p.pos,
                    radius: 1.0 + 2.0 * p.z,
                    color: Color::WHITE.with_alpha(0.5 + 0.4 * p.z),
                },
                ParticleKind::Hail => {
                    let side = 2.0 + 2.0 * p.z;
                    DrawCommand::FillRect {
                        rect: Rect::new(p.pos.x - side * 0.5, p.pos.y - side * 0.5, side, side),
                        paint: Paint::Solid(Color::rgba(0.85, 0.92, 1.0, 0.9)),
                        blend: BlendMode::SourceOver,
                    }
                }
                ParticleKind::Ash { .. } => DrawCommand::Circle {
                    center: p.pos,
                    radius: 1.0 + 1.5 * p.z,
                    color: Color::rgba(0.35, 0.35, 0.35, 0.7),
                },
                ParticleKind::Debris { rotation, .. } => {
                    let half = 2.0 + 3.0 * p.z;
                    let tf = Affine2::from_angle_translation(rotation, p.pos);
                    let points = [(-half, -half * 0.5), (half, -half * 0.5), (half, half * 0.5), (-half, half * 0.5)]
                        .iter()
                        .map(|&(x, y)| tf.transform_point2(Vec2::new(x, y)))
                        .collect();
                    DrawCommand::Polygon {
                        points,
                        color: Color::rgba(0.45, 0.33, 0.2, 0.9),
                        blend: BlendMode::SourceOver,
                    }
                }
                ParticleKind::Meteor { velocity, life } => DrawCommand::Trail {
                    from: p.pos,
                    to: p.pos - velocity * 6.0,
                    width: 2.0,
                    from_color: Color::WHITE.with_alpha(clamp01(life)),
                    to_color: Color::TRANSPARENT,
                },
            };
            frame.push(Layer::Particles, command);
        }
    }

    fn draw_overlays(&self, frame: &mut Frame, input: &SceneInput<'_>) {
        let atmo = input.atmosphere;
        let bounds = input.viewport.bounds();
        let fill = |color: Color| DrawCommand::FillRect {
            rect: bounds,
            paint: Paint::Solid(color),
            blend: BlendMode::SourceOver,
        };

        if let Some(tint) = atmo.tint {
            frame.push(Layer::Overlay, fill(tint.with_alpha(self.config.overlay_tint_strength)));
        }
        let fog = clamp01(1.0 - atmo.visibility) * self.config.fog_strength;
        if fog > 0.0 {
            frame.push(Layer::Overlay, fill(self.config.fog_color.with_alpha(fog)));
        }
        if atmo.darkness > 0.0 {
            frame.push(Layer::Overlay, fill(self.config.night_color.with_alpha(atmo.darkness)));
            for beam in self.beams.commands(input.viewport, atmo.darkness) {
                frame.push(Layer::Overlay, beam);
            }
        }
        if atmo.lightning > 0.0 {
            frame.push(Layer::Overlay, fill(Color::WHITE.with_alpha(atmo.lightning)));
        }
    }

    fn draw_hover_tag(&self, frame: &mut Frame, input: &SceneInput<'_>) {
        let Some(id) = input.hovered else { return };
        let Some(plant) = input.plants.iter().find(|p| p.id == id) else { return };
        frame.push(Layer::HoverTag, name_tag(plant));
    }
}

/// "Gardener: {author}" box centered above the plant's base.
pub fn name_tag(plant: &Plant) -> DrawCommand {
    let text = format!("Gardener: {}", plant.author);
    let w = text.chars().count() as f32 * TAG_GLYPH_WIDTH + 20.0;
    DrawCommand::Label {
        rect: Rect::new(plant.x - w * 0.5, plant.y - TAG_RISE, w, TAG_HEIGHT),
        radius: 8.0,
        background: TAG_BACKGROUND,
        text,
        text_color: Color::WHITE,
    }
}

fn ready(textures: &mut TextureCache, payload: &str) -> Option<std::sync::Arc<image::RgbaImage>> {
    match textures.lookup(payload) {
        TextureStatus::Ready(image) => Some(image),
        _ => None,
    }
}
