use std::time::Duration;

use crate::canvas::{text_height, text_width_scaled, Canvas, Color, Point, TextAlign};
use crate::config::{CORNER_FADE_MS, CORNER_LABELS, CORNER_SCALE, HUD_INSET};
use crate::hud::{ramp, GlitchArtifacts, Headline};

/// Full-window layer drawn above the field and the panel: corner labels,
/// the headline column and the glitch artifacts on top of everything.
pub struct HudOverlay {
    elapsed: Duration,
    headline: Headline,
    artifacts: GlitchArtifacts,
}

impl HudOverlay {
    pub fn new() -> Self {
        Self::with_parts(Headline::new(), GlitchArtifacts::new())
    }

    pub fn with_parts(headline: Headline, artifacts: GlitchArtifacts) -> Self {
        Self {
            elapsed: Duration::ZERO,
            headline,
            artifacts,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
        self.headline.advance(dt);
        self.artifacts.advance(dt);
    }

    /// Opacity of the label in `CORNER_LABELS[index]`
    pub fn corner_opacity(&self, index: usize) -> f32 {
        CORNER_LABELS
            .get(index)
            .map_or(0.0, |&(_, delay, target)| ramp(self.elapsed, delay, CORNER_FADE_MS) * target)
    }

    /// Redraw the whole overlay over a transparent clear
    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::rgba(0, 0, 0, 0.0));
        self.draw_corners(canvas);
        self.headline.draw(canvas);
        self.artifacts.draw(canvas);
    }

    fn draw_corners(&self, canvas: &mut dyn Canvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let top = HUD_INSET + text_height(CORNER_SCALE);
        let bottom = h - HUD_INSET;

        for (i, (text, _, _)) in CORNER_LABELS.iter().enumerate() {
            let alpha = self.corner_opacity(i);
            if alpha <= 0.0 {
                continue;
            }
            let right = w - HUD_INSET - text_width_scaled(text, CORNER_SCALE);
            let at = match i {
                0 => Point::new(HUD_INSET, top),
                1 => Point::new(right, top),
                2 => Point::new(HUD_INSET, bottom),
                _ => Point::new(right, bottom),
            };
            canvas.fill_text_scaled(text, at, TextAlign::Left, CORNER_SCALE, Color::white(alpha));
        }
    }
}
