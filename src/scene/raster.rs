//! Software raster surface.
//!
//! Rasterizes a [`Frame`] into an `image::RgbaImage` on the CPU. Used by the
//! headless renderer, the debug server's screenshots and tests. Shapes are
//! sampled at pixel centers without anti-aliasing; text in labels is drawn
//! as one block per glyph.

use std::path::Path;

use base64::Engine;
use image::{ImageEncoder, Rgba, RgbaImage};

use crate::core::{Affine2, Color, Error, Rect, Result, Vec2, Viewport};
use crate::scene::surface::{BlendMode, DrawCommand, Frame, ImageFilter, Paint, Surface};

/// Segments used to flatten quadratic curves.
const CURVE_SEGMENTS: usize = 8;

/// CPU-backed [`Surface`].
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Allocate a surface. Fails when either dimension is zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Surface(format!("cannot allocate a {}x{} raster", width, height)));
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.pixels.width() && y < self.pixels.height() {
            Some(self.pixels.get_pixel(x, y).0)
        } else {
            None
        }
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.pixels.save(path)?;
        Ok(())
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut png_data = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_data).write_image(
            self.pixels.as_raw(),
            self.pixels.width(),
            self.pixels.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(png_data)
    }

    pub fn png_base64(&self) -> Result<String> {
        Ok(base64::engine::general_purpose::STANDARD.encode(self.encode_png()?))
    }

    fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = Rgba([0, 0, 0, 255]);
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::FillRect { rect, paint, blend } => self.fill_rect(*rect, paint, *blend),
            DrawCommand::Ellipse {
                center,
                radii,
                color,
                blend,
            } => self.fill_ellipse(*center, *radii, *color, *blend),
            DrawCommand::Circle { center, radius, color } => {
                self.fill_ellipse(*center, Vec2::splat(*radius), *color, BlendMode::SourceOver)
            }
            DrawCommand::Line { from, to, width, color } => {
                self.stroke_segment(*from, *to, *width, |_| *color)
            }
            DrawCommand::QuadCurve {
                from,
                control,
                to,
                width,
                color,
            } => {
                let mut prev = *from;
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    let u = 1.0 - t;
                    let p = *from * (u * u) + *control * (2.0 * u * t) + *to * (t * t);
                    self.stroke_segment(prev, p, *width, |_| *color);
                    prev = p;
                }
            }
            DrawCommand::Polygon { points, color, blend } => self.fill_polygon(points, *color, *blend),
            DrawCommand::Trail {
                from,
                to,
                width,
                from_color,
                to_color,
            } => self.stroke_segment(*from, *to, *width, |t| from_color.mix(to_color, t)),
            DrawCommand::Image {
                image,
                src,
                dst,
                transform,
                alpha,
                filter,
            } => self.draw_image(image, *src, *dst, *transform, *alpha, filter),
            DrawCommand::Label {
                rect,
                radius,
                background,
                text,
                text_color,
            } => self.draw_label(*rect, *radius, *background, text, *text_color),
        }
    }

    /// Pixel index range covering `[min, max]`, clipped to the surface.
    fn span(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let w = self.pixels.width() as f32;
        let h = self.pixels.height() as f32;
        if !(max.x >= 0.0 && max.y >= 0.0 && min.x < w && min.y < h) {
            return None;
        }
        let x0 = min.x.max(0.0).floor() as u32;
        let y0 = min.y.max(0.0).floor() as u32;
        let x1 = max.x.min(w - 1.0).ceil() as u32;
        let y1 = max.y.min(h - 1.0).ceil() as u32;
        Some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, mode: BlendMode) {
        if color.a <= 0.0 || x >= self.pixels.width() || y >= self.pixels.height() {
            return;
        }
        let px = self.pixels.get_pixel_mut(x, y);
        let dst = Color::from_rgba8(px.0);
        let a = color.a.clamp(0.0, 1.0);
        let channel = |s: f32, d: f32| -> f32 {
            let mixed = match mode {
                BlendMode::SourceOver => s,
                BlendMode::Multiply => s * d,
                BlendMode::Screen => 1.0 - (1.0 - s) * (1.0 - d),
                BlendMode::Lighter => (s + d).min(1.0),
            };
            d + (mixed - d) * a
        };
        let out = Color::rgba(
            channel(color.r, dst.r),
            channel(color.g, dst.g),
            channel(color.b, dst.b),
            (dst.a + a * (1.0 - dst.a)).min(1.0),
        );
        *px = Rgba(out.to_rgba8());
    }

    fn fill_rect(&mut self, rect: Rect, paint: &Paint, mode: BlendMode) {
        let max = Vec2::new(rect.x + rect.w, rect.y + rect.h);
        let Some((x0, y0, x1, y1)) = self.span(Vec2::new(rect.x, rect.y), max) else { return };
        for y in y0..=y1 {
            let cy = y as f32 + 0.5;
            if cy < rect.y || cy >= max.y {
                continue;
            }
            let color = paint.sample((cy - rect.y) / rect.h.max(f32::EPSILON));
            for x in x0..=x1 {
                let cx = x as f32 + 0.5;
                if cx >= rect.x && cx < max.x {
                    self.blend(x, y, color, mode);
                }
            }
        }
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color, mode: BlendMode) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.span(center - radii, center + radii) else { return };
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center) / radii;
                if d.length_squared() <= 1.0 {
                    self.blend(x, y, color, mode);
                }
            }
        }
    }

    /// Stroke a segment; `shade` maps position along it (0..1) to a color.
    fn stroke_segment(&mut self, a: Vec2, b: Vec2, width: f32, shade: impl Fn(f32) -> Color) {
        let half = (width * 0.5).max(0.5);
        let pad = Vec2::splat(half);
        let Some((x0, y0, x1, y1)) = self.span(a.min(b) - pad, a.max(b) + pad) else { return };
        let ab = b - a;
        let len_sq = ab.length_squared();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 { ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0) } else { 0.0 };
                if p.distance_squared(a + ab * t) <= half * half {
                    self.blend(x, y, shade(t), BlendMode::SourceOver);
                }
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color, mode: BlendMode) {
        if points.len() < 3 {
            return;
        }
        let (min, max) = points
            .iter()
            .fold((points[0], points[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        let Some((x0, y0, x1, y1)) = self.span(min, max) else { return };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if point_in_polygon(Vec2::new(x as f32 + 0.5, y as f32 + 0.5), points) {
                    self.blend(x, y, color, mode);
                }
            }
        }
    }

    fn draw_image(
        &mut self,
        image: &RgbaImage,
        src: Rect,
        dst: Rect,
        transform: Affine2,
        alpha: f32,
        filter: &ImageFilter,
    ) {
        if alpha <= 0.0 || dst.w <= 0.0 || dst.h <= 0.0 || src.w <= 0.0 || src.h <= 0.0 {
            return;
        }
        let corners = [
            Vec2::new(dst.x, dst.y),
            Vec2::new(dst.x + dst.w, dst.y),
            Vec2::new(dst.x, dst.y + dst.h),
            Vec2::new(dst.x + dst.w, dst.y + dst.h),
        ]
        .map(|c| transform.transform_point2(c));
        let (min, max) = corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        let Some((x0, y0, x1, y1)) = self.span(min, max) else { return };

        let inverse = transform.inverse();
        let (iw, ih) = (image.width(), image.height());
        for y in y0..=y1 {
            for x in x0..=x1 {
                let local = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if !dst.contains(local) {
                    continue;
                }
                let u = src.x + (local.x - dst.x) / dst.w * src.w;
                let v = src.y + (local.y - dst.y) / dst.h * src.h;
                if u < 0.0 || v < 0.0 {
                    continue;
                }
                let (sx, sy) = (u as u32, v as u32);
                if sx >= iw || sy >= ih {
                    continue;
                }
                let texel = Color::from_rgba8(image.get_pixel(sx, sy).0);
                let texel = if filter.is_identity() { texel } else { filter.apply(texel) };
                self.blend(x, y, texel.with_alpha(texel.a * alpha), BlendMode::SourceOver);
            }
        }
    }

    fn draw_label(&mut self, rect: Rect, radius: f32, background: Color, text: &str, text_color: Color) {
        let max = Vec2::new(rect.x + rect.w, rect.y + rect.h);
        if let Some((x0, y0, x1, y1)) = self.span(Vec2::new(rect.x, rect.y), max) {
            let r = radius.min(rect.w * 0.5).min(rect.h * 0.5).max(0.0);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    if in_rounded_rect(p, rect, r) {
                        self.blend(x, y, background, BlendMode::SourceOver);
                    }
                }
            }
        }

        // Glyph blocks, vertically centered, left padded
        let glyph_h = rect.h * 0.5;
        let advance = glyph_h * 0.6;
        let top = rect.y + (rect.h - glyph_h) * 0.5;
        let mut pen = rect.x + 10.0;
        for ch in text.chars() {
            if !ch.is_whitespace() {
                let glyph = Rect::new(pen, top, advance * 0.75, glyph_h);
                self.fill_rect(glyph, &Paint::Solid(text_color), BlendMode::SourceOver);
            }
            pen += advance;
        }
    }
}

fn in_rounded_rect(p: Vec2, rect: Rect, r: f32) -> bool {
    if !rect.contains(p) {
        return false;
    }
    let inner_min = Vec2::new(rect.x + r, rect.y + r);
    let inner_max = Vec2::new(rect.x + rect.w - r, rect.y + rect.h - r);
    let nearest = p.clamp(inner_min, inner_max);
    p.distance_squared(nearest) <= r * r
}

/// Even-odd rule.
fn point_in_polygon(p: Vec2, points: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl Surface for RasterSurface {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.pixels.width() as f32, self.pixels.height() as f32)
    }

    fn present(&mut self, frame: &Frame) -> Result<()> {
        self.clear();
        for (_, command) in &frame.commands {
            self.draw(command);
        }
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<()> {
        let (w, h) = (viewport.width.max(0.0) as u32, viewport.height.max(0.0) as u32);
        if w == 0 || h == 0 {
            return Err(Error::Surface(format!("cannot resize raster to {}x{}", w, h)));
        }
        self.pixels = RgbaImage::new(w, h);
        Ok(())
    }
}
