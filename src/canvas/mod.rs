mod font;
mod pixel;

pub use pixel::PixelCanvas;

/// Straight (non-premultiplied) colour. Alpha outside [0, 1] is clamped at draw time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 1.0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// White at the given opacity, the only hue the HUD uses
    pub const fn white(alpha: f32) -> Self {
        Self::rgba(255, 255, 255, alpha)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Narrowing constructor for simulation-space coordinates
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(x as f32, y as f32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Immediate-mode 2D drawing surface.
///
/// Renderers only ever see `&mut dyn Canvas`, so the same frame code drives the
/// software rasterizer in the app and a recording double in tests. Anything
/// drawn outside the surface is clipped; nothing here can fail.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn clear(&mut self, color: Color);

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);

    fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color);

    fn stroke_polyline(&mut self, points: &[Point], width: f32, color: Color) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], width, color);
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);

    fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Color);

    fn fill_polygon(&mut self, points: &[Point], color: Color);

    fn stroke_polygon(&mut self, points: &[Point], width: f32, color: Color) {
        if points.len() < 2 {
            return;
        }
        self.stroke_polyline(points, width, color);
        self.stroke_line(points[points.len() - 1], points[0], width, color);
    }

    /// Bitmap text with each font cell drawn as a `scale` x `scale` block;
    /// `at.y` is the baseline
    fn fill_text_scaled(&mut self, text: &str, at: Point, align: TextAlign, scale: u32, color: Color);

    fn fill_text(&mut self, text: &str, at: Point, align: TextAlign, color: Color) {
        self.fill_text_scaled(text, at, align, 1, color);
    }

    /// Full-width horizontal band, `peak` opacity on the centre row fading
    /// linearly to transparent `half_height` above and below
    fn fill_vertical_band(&mut self, center_y: f32, half_height: f32, peak: Color);
}

/// Pixel width of `text` in the built-in 5x7 face
pub fn text_width(text: &str) -> f32 {
    text_width_scaled(text, 1)
}

pub fn text_width_scaled(text: &str, scale: u32) -> f32 {
    let n = text.chars().count();
    if n == 0 {
        0.0
    } else {
        ((n * font::ADVANCE - 1) * scale.max(1) as usize) as f32
    }
}

/// Pixel height of one line of the 5x7 face at `scale`
pub fn text_height(scale: u32) -> f32 {
    (font::GLYPH_HEIGHT * scale.max(1) as usize) as f32
}

#[cfg(test)]
pub mod recording {
    //! Canvas double that records primitives instead of rasterizing them.

    use super::{Canvas, Color, Point, TextAlign};

    #[derive(Clone, Debug, PartialEq)]
    pub enum Op {
        Clear(Color),
        Rect { x: f32, y: f32, w: f32, h: f32, color: Color },
        Line { from: Point, to: Point, width: f32, color: Color },
        Circle { center: Point, radius: f32, color: Color },
        Ring { center: Point, radius: f32, width: f32, color: Color },
        Polygon { points: Vec<Point>, color: Color },
        Text { text: String, at: Point, scale: u32, color: Color },
        Band { center_y: f32, half_height: f32, peak: Color },
    }

    pub struct RecordingCanvas {
        pub width: u32,
        pub height: u32,
        pub ops: Vec<Op>,
    }

    impl RecordingCanvas {
        pub fn new(width: u32, height: u32) -> Self {
            Self { width, height, ops: Vec::new() }
        }

        pub fn lines(&self) -> impl Iterator<Item = (&Point, &Point, &Color)> {
            self.ops.iter().filter_map(|op| match op {
                Op::Line { from, to, color, .. } => Some((from, to, color)),
                _ => None,
            })
        }

        pub fn circles(&self) -> impl Iterator<Item = (&Point, f32, &Color)> {
            self.ops.iter().filter_map(|op| match op {
                Op::Circle { center, radius, color } => Some((center, *radius, color)),
                _ => None,
            })
        }

        pub fn rects(&self) -> impl Iterator<Item = (f32, f32, f32, f32, &Color)> {
            self.ops.iter().filter_map(|op| match op {
                Op::Rect { x, y, w, h, color } => Some((*x, *y, *w, *h, color)),
                _ => None,
            })
        }

        pub fn texts(&self) -> impl Iterator<Item = &str> {
            self.ops.iter().filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
        }
    }

    impl Canvas for RecordingCanvas {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn clear(&mut self, color: Color) {
            self.ops.push(Op::Clear(color));
        }

        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
            self.ops.push(Op::Rect { x, y, w, h, color });
        }

        fn stroke_line(&mut self, from: Point, to: Point, width: f32, color: Color) {
            self.ops.push(Op::Line { from, to, width, color });
        }

        fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
            self.ops.push(Op::Circle { center, radius, color });
        }

        fn stroke_circle(&mut self, center: Point, radius: f32, width: f32, color: Color) {
            self.ops.push(Op::Ring { center, radius, width, color });
        }

        fn fill_polygon(&mut self, points: &[Point], color: Color) {
            self.ops.push(Op::Polygon { points: points.to_vec(), color });
        }

        fn fill_text_scaled(&mut self, text: &str, at: Point, _align: TextAlign, scale: u32, color: Color) {
            self.ops.push(Op::Text { text: text.to_string(), at, scale, color });
        }

        fn fill_vertical_band(&mut self, center_y: f32, half_height: f32, peak: Color) {
            self.ops.push(Op::Band { center_y, half_height, peak });
        }
    }
}
