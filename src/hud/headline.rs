use std::time::Duration;

use crate::canvas::{text_height, text_width, text_width_scaled, Canvas, Color, Point, TextAlign};
use crate::config::{
    CHANNEL_CYCLE_MS, CHANNEL_OFFSETS_X, CHANNEL_OFFSETS_Y, HEADLINE_GLITCH_MS, HEADLINE_LINES,
    HEADLINE_MAX_SCALE, HEADLINE_MIN_SCALE, HUD_INSET, MISSION_LOGS_DELAY_MS, SLICE_BAND,
    SLICE_CYCLE_MS, SLICE_OFFSETS_X, SUBTEXT_FADE_MS, SUBTEXT_LINES, VERSION_DELAY_MS,
    VERSION_FADE_MS, VERSION_OPACITY, VERSION_TAG,
};
use crate::hud::{ramp, MissionLogs};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlitchPhase {
    Hidden,
    Glitching,
    Settled,
}

/// Per-frame displacement of the glitch copies
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlitchOffsets {
    pub red: Point,
    pub cyan: Point,
    pub slice_x: f32,
}

/// Position within a repeating cycle, in [0, 1)
fn cycle_position(t: Duration, cycle_ms: u64) -> f32 {
    let cycle = u128::from(cycle_ms.max(1)) * 1000;
    (t.as_micros() % cycle) as f32 / cycle as f32
}

/// Evenly spaced keyframes, linearly interpolated at `t` in [0, 1]
fn keyframe(frames: &[f32], t: f32) -> f32 {
    match frames {
        [] => 0.0,
        [only] => *only,
        _ => {
            let pos = t.clamp(0.0, 1.0) * (frames.len() - 1) as f32;
            let i = (pos.floor() as usize).min(frames.len() - 2);
            let f = pos - i as f32;
            frames[i] + (frames[i + 1] - frames[i]) * f
        }
    }
}

/// A line of text that appears after a delay with a short chromatic glitch:
/// red and cyan copies jitter around it and a horizontal slice shears
/// sideways, then it settles.
pub struct GlitchText {
    text: &'static str,
    delay: Duration,
    glitch: Duration,
    elapsed: Duration,
    settled: bool,
}

impl GlitchText {
    pub fn new(text: &'static str, delay: Duration) -> Self {
        Self {
            text,
            delay,
            glitch: Duration::from_millis(HEADLINE_GLITCH_MS),
            elapsed: Duration::ZERO,
            settled: false,
        }
    }

    pub fn phase(&self) -> GlitchPhase {
        if self.elapsed < self.delay {
            GlitchPhase::Hidden
        } else if self.elapsed < self.delay + self.glitch {
            GlitchPhase::Glitching
        } else {
            GlitchPhase::Settled
        }
    }

    /// Returns `true` exactly once, on the call during which the glitch ended
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if !self.settled && self.phase() == GlitchPhase::Settled {
            self.settled = true;
            return true;
        }
        false
    }

    pub fn offsets(&self) -> Option<GlitchOffsets> {
        if self.phase() != GlitchPhase::Glitching {
            return None;
        }
        let t = self.elapsed - self.delay;
        let channel = cycle_position(t, CHANNEL_CYCLE_MS);
        let dx = keyframe(&CHANNEL_OFFSETS_X, channel);
        let dy = keyframe(&CHANNEL_OFFSETS_Y, channel);
        Some(GlitchOffsets {
            red: Point::new(dx, dy),
            cyan: Point::new(-dx, -dy),
            slice_x: keyframe(&SLICE_OFFSETS_X, cycle_position(t, SLICE_CYCLE_MS)),
        })
    }

    /// Draw with the baseline at `at`
    pub fn draw(&self, canvas: &mut dyn Canvas, at: Point, scale: u32, color: Color) {
        if self.phase() == GlitchPhase::Hidden {
            return;
        }
        let offsets = self.offsets();

        if let Some(o) = offsets {
            let red = Color::rgba(255, 0, 0, 0.7 * color.a);
            let cyan = Color::rgba(0, 255, 255, 0.7 * color.a);
            let shifted = |d: Point| Point::new(at.x + d.x, at.y + d.y);
            canvas.fill_text_scaled(self.text, shifted(o.red), TextAlign::Left, scale, red);
            canvas.fill_text_scaled(self.text, shifted(o.cyan), TextAlign::Left, scale, cyan);
        }

        canvas.fill_text_scaled(self.text, at, TextAlign::Left, scale, color);

        if let Some(o) = offsets {
            let height = text_height(scale);
            let top = at.y - height + SLICE_BAND[0] * height;
            let band = (SLICE_BAND[1] - SLICE_BAND[0]) * height;
            let width = text_width_scaled(self.text, scale);
            canvas.fill_rect(at.x + o.slice_x, top, width, band, Color::white(0.15 * color.a));
        }
    }
}

/// Left-column copy: the two glitching headline lines, their subtext, the
/// mission logs under them and the version tag near the bottom.
pub struct Headline {
    lines: [GlitchText; 2],
    elapsed: Duration,
    first_done_at: Option<Duration>,
    second_done_at: Option<Duration>,
    logs: MissionLogs,
}

impl Headline {
    pub fn new() -> Self {
        Self::with_logs(MissionLogs::new())
    }

    pub fn with_logs(logs: MissionLogs) -> Self {
        let line = |i: usize| GlitchText::new(HEADLINE_LINES[i].0, Duration::from_millis(HEADLINE_LINES[i].1));
        Self {
            lines: [line(0), line(1)],
            elapsed: Duration::ZERO,
            first_done_at: None,
            second_done_at: None,
            logs,
        }
    }

    /// Largest glyph scale that keeps the headline inside the left half
    pub fn scale_for(width: u32) -> u32 {
        let widest = HEADLINE_LINES
            .iter()
            .map(|(text, _, _)| text_width(text))
            .fold(1.0_f32, f32::max);
        let available = (width as f32 * 0.5 - HUD_INSET).max(0.0);
        ((available / widest).floor() as u32).clamp(HEADLINE_MIN_SCALE, HEADLINE_MAX_SCALE)
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
        if self.lines[0].advance(dt) {
            self.first_done_at = Some(self.elapsed);
            log::debug!("Headline line 1 settled");
        }
        let second_done = self.lines[1].advance(dt);

        self.logs.advance(dt);
        if second_done {
            self.second_done_at = Some(self.elapsed);
            self.logs.arm(Duration::from_millis(MISSION_LOGS_DELAY_MS));
            log::debug!("Headline settled, mission logs armed");
        }
    }

    pub fn subtext_opacity(&self) -> f32 {
        self.second_done_at
            .map_or(0.0, |at| ramp(self.elapsed - at, 0, SUBTEXT_FADE_MS))
    }

    pub fn version_opacity(&self) -> f32 {
        self.first_done_at.map_or(0.0, |at| {
            ramp(self.elapsed - at, VERSION_DELAY_MS, VERSION_FADE_MS) * VERSION_OPACITY
        })
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let (w, h) = (canvas.width(), canvas.height() as f32);
        let scale = Self::scale_for(w);
        let x = HUD_INSET;
        let mut y = h * 0.3 + text_height(scale);

        for (line, (_, _, brightness)) in self.lines.iter().zip(HEADLINE_LINES) {
            line.draw(canvas, Point::new(x, y), scale, Color::white(brightness));
            y += text_height(scale) * 1.4;
        }

        let subtext = self.subtext_opacity();
        y += 8.0;
        if subtext > 0.0 {
            for (i, text) in SUBTEXT_LINES.iter().enumerate() {
                let line_y = y + i as f32 * 14.0;
                canvas.fill_text(text, Point::new(x, line_y), TextAlign::Left, Color::white(0.55 * subtext));
            }
        }
        y += SUBTEXT_LINES.len() as f32 * 14.0 + 40.0;

        self.logs.draw(canvas, Point::new(x, y));

        let version = self.version_opacity();
        if version > 0.0 {
            let vy = h - HUD_INSET - 40.0;
            let color = Color::white(version);
            canvas.stroke_line(Point::new(x, vy - 3.0), Point::new(x + 32.0, vy - 3.0), 1.0, color);
            canvas.fill_text(VERSION_TAG, Point::new(x + 40.0, vy), TextAlign::Left, color);
        }
    }
}
