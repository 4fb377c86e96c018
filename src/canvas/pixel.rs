use tiny_skia::{
    Color as SkiaColor, FillRule, GradientStop, LinearGradient, LineCap, Paint, Path, PathBuilder,
    Pixmap, PixmapPaint, Rect, SpreadMode, Stroke, Transform,
};

use super::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use super::{text_width_scaled, Canvas, Color, Point, TextAlign};

/// RGBA8 software surface backed by a tiny-skia pixmap.
///
/// Pixels are stored premultiplied, rows tightly packed, which is exactly
/// what the GPU layer uploads.
#[derive(Clone, Debug)]
pub struct PixelCanvas {
    /// `None` while either dimension is zero
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
}

fn to_skia_color(c: Color) -> SkiaColor {
    SkiaColor::from_rgba8(c.r, c.g, c.b, (c.a.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn solid(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = anti_alias;
    paint
}

fn polyline_path(points: &[Point], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

impl PixelCanvas {
    /// A zero dimension gives an empty surface on which every draw is a no-op
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
            width,
            height,
        }
    }

    /// Reallocate for a new size; contents are cleared to transparent
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    /// Premultiplied RGBA bytes
    pub fn as_rgba(&self) -> &[u8] {
        match &self.pixmap {
            Some(pixmap) => pixmap.data(),
            None => &[],
        }
    }

    /// Straight (demultiplied) RGBA at a pixel
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Source-over composite of `src` with its top-left at (x, y)
    pub fn blit(&mut self, src: &PixelCanvas, x: i32, y: i32) {
        if let (Some(dst), Some(src)) = (self.pixmap.as_mut(), src.pixmap.as_ref()) {
            dst.draw_pixmap(x, y, src.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
        }
    }

    fn fill_path(&mut self, path: &Path, paint: &Paint) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill_path(path, paint, FillRule::EvenOdd, Transform::identity(), None);
        }
    }

    fn stroke_path(&mut self, path: &Path, width: f32, color: Color) {
        // Width 0 means hairline to tiny-skia; here it means nothing to draw
        if width <= 0.0 {
            return;
        }
        if let Some(pixmap) = self.pixmap.as_mut() {
            let stroke = Stroke {
                width,
                line_cap: LineCap::Butt,
                ..Default::default()
            };
            pixmap.stroke_path(path, &solid(color, true), &stroke, Transform::identity(), None);
        }
    }
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Color) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(to_skia_color(color));
        }
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let (Some(pixmap), Some(rect)) = (self.pixmap.as_mut(), Rect::from_xywh(x, y, w, h)) else {
            return;
        };
        pixmap.fill_rect(rect, &solid(color, false), Transform::identity(), None);
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        self.stroke_polyline(&[from, to], width, color);
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        if points.len() < 2 {
            return;
        }
        if let Some(path) = polyline_path(points, false) {
            self.stroke_path(&path, width, color);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.fill_path(&path, &solid(color, true));
        }
    }

    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            self.stroke_path(&path, width, color);
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        if let Some(path) = polyline_path(points, true) {
            self.fill_path(&path, &solid(color, true));
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], width: f32, color: Color) {
        if points.len() < 2 {
            return;
        }
        if let Some(path) = polyline_path(points, true) {
            self.stroke_path(&path, width, color);
        }
    }

    fn fill_text_scaled(&mut self, text: &str, at: Point, align: TextAlign, scale: u32, color: Color) {
        let scale = scale.max(1);
        let cell = scale as f32;
        let left = match align {
            TextAlign::Left => at.x,
            TextAlign::Center => at.x - text_width_scaled(text, scale) * 0.5,
        };
        let mut x = left.round();
        let top = at.y.round() - (GLYPH_HEIGHT as u32 * scale) as f32;

        // Every lit cell becomes one square; the whole string fills in one pass
        let mut pb = PathBuilder::new();
        for ch in text.chars() {
            for (row, bits) in font::glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                        let cx = x + col as f32 * cell;
                        let cy = top + row as f32 * cell;
                        if let Some(rect) = Rect::from_xywh(cx, cy, cell, cell) {
                            pb.push_rect(rect);
                        }
                    }
                }
            }
            x += (font::ADVANCE as u32 * scale) as f32;
        }
        if let Some(path) = pb.finish() {
            self.fill_path(&path, &solid(color, false));
        }
    }

    fn fill_vertical_band(&mut self, center_y: f32, half_height: f32, peak: Color) {
        if half_height <= 0.0 {
            return;
        }
        let (top, bottom) = (center_y - half_height, center_y + half_height);
        let edge = Color::rgba(peak.r, peak.g, peak.b, 0.0);
        let shader = LinearGradient::new(
            tiny_skia::Point::from_xy(0.0, top),
            tiny_skia::Point::from_xy(0.0, bottom),
            vec![
                GradientStop::new(0.0, to_skia_color(edge)),
                GradientStop::new(0.5, to_skia_color(peak)),
                GradientStop::new(1.0, to_skia_color(edge)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        );
        let (Some(shader), Some(rect), Some(pixmap)) = (
            shader,
            Rect::from_xywh(0.0, top, self.width as f32, bottom - top),
            self.pixmap.as_mut(),
        ) else {
            return;
        };
        let paint = Paint {
            shader,
            anti_alias: false,
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }
}
