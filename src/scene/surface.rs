//! Display list and drawing surface abstraction.
//!
//! The compositor never draws directly. It records a [`Frame`]: an ordered
//! list of [`DrawCommand`]s, each tagged with the [`Layer`] that produced it.
//! A [`Surface`] then presents the whole frame in one go, so a host can back
//! it with a canvas, a GPU pass or the software [`RasterSurface`].
//!
//! [`RasterSurface`]: super::raster::RasterSurface

use std::sync::Arc;

use image::RgbaImage;

use crate::core::{Affine2, Color, Rect, Result, Vec2, Viewport};

/// Compositing pass a command belongs to, in draw order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Sky,
    Aurora,
    Ground,
    Grass,
    Plants,
    Particles,
    Overlay,
    HoverTag,
}

/// How a command's color combines with what is already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
    Screen,
    Lighter,
}

/// Fill style for rectangles.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    /// Vertical gradient over the filled rect, stops at `t` in `[0, 1]`.
    Vertical(Vec<(f32, Color)>),
}

impl Paint {
    pub fn vertical(top: Color, bottom: Color) -> Self {
        Self::Vertical(vec![(0.0, top), (1.0, bottom)])
    }

    /// Color at normalized height `t`.
    pub fn sample(&self, t: f32) -> Color {
        match self {
            Paint::Solid(c) => *c,
            Paint::Vertical(stops) => sample_stops(stops, t),
        }
    }
}

fn sample_stops(stops: &[(f32, Color)], t: f32) -> Color {
    let Some(first) = stops.first() else { return Color::TRANSPARENT };
    if t <= first.0 {
        return first.1;
    }
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let span = (t1 - t0).max(f32::EPSILON);
            return c0.mix(&c1, (t - t0) / span);
        }
    }
    stops[stops.len() - 1].1
}

/// Per-image color treatment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ImageFilter {
    /// `0` keeps the original colors, `1` is fully grey.
    pub desaturate: f32,
    /// Color washed over opaque pixels (frost, ash).
    pub wash: Option<Color>,
    pub wash_amount: f32,
}

impl ImageFilter {
    pub fn is_identity(&self) -> bool {
        self.desaturate <= 0.0 && (self.wash.is_none() || self.wash_amount <= 0.0)
    }

    pub fn apply(&self, c: Color) -> Color {
        let mut out = if self.desaturate > 0.0 { c.desaturate(self.desaturate) } else { c };
        if let Some(wash) = self.wash {
            out = out.mix(&wash.with_alpha(out.a), self.wash_amount);
        }
        out
    }
}

/// One drawing primitive.
#[derive(Clone, Debug)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        paint: Paint,
        blend: BlendMode,
    },
    Ellipse {
        center: Vec2,
        radii: Vec2,
        color: Color,
        blend: BlendMode,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    QuadCurve {
        from: Vec2,
        control: Vec2,
        to: Vec2,
        width: f32,
        color: Color,
    },
    Polygon {
        points: Vec<Vec2>,
        color: Color,
        blend: BlendMode,
    },
    /// Line whose color fades from `from_color` to `to_color`.
    Trail {
        from: Vec2,
        to: Vec2,
        width: f32,
        from_color: Color,
        to_color: Color,
    },
    /// Draw the `src` region of `image` into `dst` (local coordinates),
    /// then map through `transform` into screen space.
    Image {
        image: Arc<RgbaImage>,
        src: Rect,
        dst: Rect,
        transform: Affine2,
        alpha: f32,
        filter: ImageFilter,
    },
    /// Rounded label box in screen space.
    Label {
        rect: Rect,
        radius: f32,
        background: Color,
        text: String,
        text_color: Color,
    },
}

/// A recorded frame, ready to present.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub viewport: Viewport,
    pub commands: Vec<(Layer, DrawCommand)>,
}

impl Frame {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, layer: Layer, command: DrawCommand) {
        self.commands.push((layer, command));
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands recorded for one layer, in order.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |(l, _)| *l == layer).map(|(_, c)| c)
    }

    /// Layers in the order they first appear, without repeats.
    pub fn layer_sequence(&self) -> Vec<Layer> {
        let mut seq: Vec<Layer> = Vec::new();
        for (layer, _) in &self.commands {
            if seq.last() != Some(layer) {
                seq.push(*layer);
            }
        }
        seq
    }
}

/// Something a frame can be presented to.
pub trait Surface {
    fn viewport(&self) -> Viewport;

    /// Draw a complete frame. Errors are reported to the driver, which logs
    /// them and carries on with the next tick.
    fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Adapt to a new viewport size.
    fn resize(&mut self, _viewport: Viewport) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_paint_sampling() {
        let paint = Paint::vertical(Color::BLACK, Color::WHITE);
        assert_eq!(paint.sample(0.0), Color::BLACK);
        assert_eq!(paint.sample(1.0), Color::WHITE);
        let mid = paint.sample(0.5);
        assert!((mid.r - 0.5).abs() < 1e-6);
        assert_eq!(Paint::Vertical(Vec::new()).sample(0.5), Color::TRANSPARENT);
    }

    #[test]
    fn test_layer_sequence_collapses_runs() {
        let mut frame = Frame::new(Viewport::new(10.0, 10.0));
        let dot = || DrawCommand::Circle {
            center: Vec2::ZERO,
            radius: 1.0,
            color: Color::WHITE,
        };
        frame.push(Layer::Sky, dot());
        frame.push(Layer::Sky, dot());
        frame.push(Layer::Grass, dot());
        frame.push(Layer::Overlay, dot());
        assert_eq!(frame.layer_sequence(), vec![Layer::Sky, Layer::Grass, Layer::Overlay]);
        assert_eq!(frame.layer(Layer::Sky).count(), 2);
    }

    #[test]
    fn test_filter_identity() {
        let f = ImageFilter::default();
        assert!(f.is_identity());
        let c = Color::rgb8(200, 10, 10);
        assert_eq!(f.apply(c), c);
        let grey = ImageFilter { desaturate: 1.0, ..Default::default() }.apply(c);
        assert!((grey.r - grey.g).abs() < 1e-6);
    }
}
