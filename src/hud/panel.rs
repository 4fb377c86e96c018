use std::time::Duration;

use crate::animation::AnimationTask;
#[cfg(test)]
use crate::animation::TaskState;
use crate::canvas::{text_width, Canvas, Color, PixelCanvas, Point, TextAlign};
use crate::config::{
    HEADER_SPEED_MS, HEADER_TEXT, PANEL_FADE_MS, PANEL_HEADER_HEIGHT, PANEL_MAX_SIDE,
    PANEL_MIN_SIDE, PANEL_READOUT_HEIGHT, PANEL_START_DELAY_MS, PANEL_START_SCALE,
    READOUTS, READOUT_DELAY_MS, READOUT_FADE_MS,
};
use crate::hud::DecodeText;
use crate::simulation::SchematicSimulator;

const PADDING: f32 = 16.0;

fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// "COMPROMISED" readout panel.
///
/// Appears after a start delay, decodes its header, and only then starts the
/// schematic animation inside it. The schematic task never runs before the
/// header completes and is stopped by [`shutdown`](Self::shutdown).
pub struct CompromisedPanel {
    start_delay: Duration,
    elapsed: Duration,
    visible_at: Option<Duration>,
    header_done_at: Option<Duration>,
    header: DecodeText,
    schematic: AnimationTask<SchematicSimulator>,
    schematic_canvas: PixelCanvas,
    canvas: PixelCanvas,
    side: u32,
}

impl CompromisedPanel {
    pub fn new() -> Self {
        Self::with_parts(
            DecodeText::new(HEADER_TEXT, Duration::ZERO, Duration::from_millis(HEADER_SPEED_MS)),
            SchematicSimulator::new(),
            Duration::from_millis(PANEL_START_DELAY_MS),
        )
    }

    pub fn with_parts(header: DecodeText, schematic: SchematicSimulator, start_delay: Duration) -> Self {
        Self {
            start_delay,
            elapsed: Duration::ZERO,
            visible_at: None,
            header_done_at: None,
            header,
            schematic: AnimationTask::new(schematic),
            schematic_canvas: PixelCanvas::new(0, 0),
            canvas: PixelCanvas::new(0, 0),
            side: 0,
        }
    }

    /// Square side of the schematic area for the space on offer
    pub fn side_for(available_width: u32) -> u32 {
        available_width.clamp(PANEL_MIN_SIDE, PANEL_MAX_SIDE)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.side, PANEL_HEADER_HEIGHT + self.side + PANEL_READOUT_HEIGHT)
    }

    pub fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    #[cfg(test)]
    pub fn schematic_state(&self) -> TaskState {
        self.schematic.state()
    }

    pub fn is_visible(&self) -> bool {
        self.visible_at.is_some()
    }

    /// Resize for the space on offer; the schematic regenerates for its new square
    pub fn resize(&mut self, available_width: u32) {
        self.side = Self::side_for(available_width);
        let (w, h) = self.size();
        self.canvas.resize(w, h);
        self.schematic_canvas.resize(self.side, self.side);
        self.schematic.resize(self.side, self.side);
    }

    /// Fade-in progress in [0, 1]
    pub fn opacity(&self) -> f32 {
        match self.visible_at {
            Some(at) => {
                let since = (self.elapsed - at).as_secs_f32();
                ease_out(since / Duration::from_millis(PANEL_FADE_MS).as_secs_f32())
            }
            None => 0.0,
        }
    }

    /// Zoom-in factor, from `PANEL_START_SCALE` up to 1
    pub fn scale(&self) -> f32 {
        PANEL_START_SCALE + (1.0 - PANEL_START_SCALE) * self.opacity()
    }

    pub fn readout_opacity(&self) -> f32 {
        match self.header_done_at {
            Some(at) => {
                let since = (self.elapsed - at).as_millis() as f32 - READOUT_DELAY_MS as f32;
                (since / READOUT_FADE_MS as f32).clamp(0.0, 1.0)
            }
            None => 0.0,
        }
    }

    /// Advance the reveal timers
    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;

        let header_dt = match self.visible_at {
            Some(_) => dt,
            None if self.elapsed >= self.start_delay => {
                self.visible_at = Some(self.start_delay);
                log::info!("Compromised panel visible");
                self.elapsed - self.start_delay
            }
            None => return,
        };

        if self.header.advance(header_dt) {
            self.header_done_at = Some(self.elapsed);
            if self.schematic.start().is_some() {
                log::info!("Header decoded, schematic online");
            }
        }
    }

    /// Run the schematic frame (if started) and recompose the panel.
    /// Returns whether the schematic wants another frame.
    pub fn tick(&mut self) -> bool {
        if self.visible_at.is_none() || self.canvas.is_empty() {
            return false;
        }
        let running = self.schematic.tick(Some(&mut self.schematic_canvas));
        self.compose();
        running
    }

    fn compose(&mut self) {
        let readout_alpha = self.readout_opacity();
        let header = self.header.text();
        let decoding = self.header.is_decoding();
        let (w, h) = (self.canvas.width() as f32, self.canvas.height() as f32);
        let top = PANEL_HEADER_HEIGHT as f32;
        let bottom = top + self.side as f32;
        let canvas = &mut self.canvas;

        canvas.clear(Color::rgba(0, 0, 0, 0.5));

        let baseline = top * 0.5 + 4.0;
        canvas.fill_text(&header, Point::new(PADDING, baseline), TextAlign::Left, Color::white(1.0));
        if decoding {
            let x = PADDING + text_width(&header) + 4.0;
            canvas.fill_rect(x, baseline - 8.0, 2.0, 9.0, Color::white(0.8));
        }

        canvas.blit(&self.schematic_canvas, 0, PANEL_HEADER_HEIGHT as i32);

        let divider = Color::white(0.2);
        canvas.stroke_line(Point::new(0.0, top), Point::new(w, top), 1.0, divider);
        canvas.stroke_line(Point::new(0.0, bottom), Point::new(w, bottom), 1.0, divider);

        if readout_alpha > 0.0 {
            for (i, (key, value)) in READOUTS.iter().enumerate() {
                let y = bottom + 20.0 + i as f32 * 16.0;
                canvas.fill_text(key, Point::new(PADDING, y), TextAlign::Left, Color::white(0.55 * readout_alpha));
                let x = w - PADDING - text_width(value);
                canvas.fill_text(value, Point::new(x, y), TextAlign::Left, Color::white(readout_alpha));
            }
        }

        let frame = [
            Point::new(0.5, 0.5),
            Point::new(w - 0.5, 0.5),
            Point::new(w - 0.5, h - 0.5),
            Point::new(0.5, h - 0.5),
        ];
        canvas.stroke_polygon(&frame, 1.0, Color::white(0.3));
    }

    /// Tear down the schematic; no frame runs after this
    pub fn shutdown(&mut self) {
        self.schematic.stop();
    }

    /// Rebuild the schematic for its current square
    pub fn regenerate(&mut self) {
        self.schematic.resize(self.side, self.side);
    }

    pub fn schematic_frames(&self) -> u64 {
        self.schematic.frames()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchematicParams;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn panel() -> CompromisedPanel {
        let mut panel = CompromisedPanel::with_parts(
            DecodeText::with_rng(
                HEADER_TEXT,
                Duration::ZERO,
                Duration::from_millis(HEADER_SPEED_MS),
                StdRng::seed_from_u64(1),
            ),
            SchematicSimulator::with_rng(StdRng::seed_from_u64(2), SchematicParams::default()),
            Duration::from_millis(100),
        );
        panel.resize(260);
        panel
    }

    #[test]
    fn test_side_is_clamped() {
        assert_eq!(CompromisedPanel::side_for(100), PANEL_MIN_SIDE);
        assert_eq!(CompromisedPanel::side_for(250), 250);
        assert_eq!(CompromisedPanel::side_for(4000), PANEL_MAX_SIDE);

        let mut panel = panel();
        panel.resize(4000);
        assert_eq!(panel.size(), (300, PANEL_HEADER_HEIGHT + 300 + PANEL_READOUT_HEIGHT));
        assert_eq!(panel.canvas().width(), 300);
    }

    #[test]
    fn test_hidden_before_start_delay() {
        let mut panel = panel();
        panel.advance(Duration::from_millis(99));
        assert!(!panel.is_visible());
        assert!(!panel.tick());
        assert_eq!(panel.opacity(), 0.0);
        assert_eq!(panel.schematic_state(), TaskState::Idle);
    }

    #[test]
    fn test_schematic_waits_for_header() {
        let mut panel = panel();
        panel.advance(Duration::from_millis(100));
        assert!(panel.is_visible());

        // 11 chars x 3 ticks x 40 ms = 1320 ms of decoding
        panel.advance(Duration::from_millis(1319));
        assert_eq!(panel.schematic_state(), TaskState::Idle);
        assert!(!panel.tick());
        assert_eq!(panel.schematic_frames(), 0);

        panel.advance(Duration::from_millis(1));
        assert_eq!(panel.schematic_state(), TaskState::Running);
        assert!(panel.tick());
        assert!(panel.tick());
        assert_eq!(panel.schematic_frames(), 2);
    }

    #[test]
    fn test_shutdown_stops_schematic() {
        let mut panel = panel();
        panel.advance(Duration::from_secs(3));
        assert_eq!(panel.schematic_state(), TaskState::Running);
        panel.tick();
        panel.shutdown();
        assert_eq!(panel.schematic_state(), TaskState::Stopped);
        assert!(!panel.tick());
        assert_eq!(panel.schematic_frames(), 1);
    }

    #[test]
    fn test_fade_and_scale_in() {
        let mut panel = panel();
        panel.advance(Duration::from_millis(100));
        assert_eq!(panel.opacity(), 0.0);
        assert!((panel.scale() - PANEL_START_SCALE).abs() < 1e-6);

        panel.advance(Duration::from_millis(250));
        let mid = panel.opacity();
        assert!(mid > 0.5 && mid < 1.0);

        panel.advance(Duration::from_millis(250));
        assert_eq!(panel.opacity(), 1.0);
        assert_eq!(panel.scale(), 1.0);
    }

    #[test]
    fn test_readouts_fade_in_after_header() {
        let mut panel = panel();
        panel.advance(Duration::from_millis(100 + 1320));
        assert_eq!(panel.readout_opacity(), 0.0);
        panel.advance(Duration::from_millis(200));
        assert_eq!(panel.readout_opacity(), 0.0);
        panel.advance(Duration::from_millis(300));
        assert_eq!(panel.readout_opacity(), 1.0);
    }

    #[test]
    fn test_composed_panel_has_frame_and_backdrop() {
        let mut panel = panel();
        panel.advance(Duration::from_secs(3));
        panel.tick();
        let canvas = panel.canvas();
        // Border pixel is lit, interior backdrop is translucent or covered by the schematic
        let corner = canvas.pixel(0, 0).unwrap();
        assert!(corner[0] > 0 && corner[3] > 0);
        let schematic_px = canvas.pixel(130, PANEL_HEADER_HEIGHT + 130).unwrap();
        assert_eq!(schematic_px[3], 255);
    }
}
