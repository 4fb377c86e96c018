use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{text_height, text_width_scaled, Canvas, Color, Point, TextAlign};
use crate::config::{
    MISSION_LOGS_FADE_MS, MISSION_LOGS_HEADER, MISSION_LOGS_HEADER_SPEED_MS, MISSION_LOG_ENTRIES,
    MISSION_LOG_FADE_MS, MISSION_LOG_SCALE, MISSION_LOG_SLIDE, MISSION_LOG_SPEED_MS,
    MISSION_LOG_STAGGER_MS,
};
use crate::hud::{ramp, DecodeText};

struct LogEntry<R: Rng> {
    permissions: &'static str,
    operation: DecodeText<R>,
    target: &'static str,
    status: &'static str,
    revealed_at: Option<Duration>,
}

/// Portion of the last `dt` that fell at or after `start`
fn live_for(now: Duration, start: Duration, dt: Duration) -> Option<Duration> {
    (now >= start).then(|| (now - start).min(dt))
}

/// "MISSION_LOGS" listing under the headline.
///
/// Stays dark until [`arm`](Self::arm)ed. Once shown, the header decodes and
/// then each entry slides in on a fixed stagger, decoding its operation name.
pub struct MissionLogs<R: Rng = StdRng> {
    elapsed: Duration,
    shown_at: Option<Duration>,
    header: DecodeText<R>,
    header_done_at: Option<Duration>,
    entries: Vec<LogEntry<R>>,
}

impl MissionLogs<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl<R: Rng + SeedableRng> MissionLogs<R> {
    /// Every decode effect gets its own generator seeded from `rng`
    pub fn with_rng(mut rng: R) -> Self {
        let header = DecodeText::with_rng(
            MISSION_LOGS_HEADER,
            Duration::ZERO,
            Duration::from_millis(MISSION_LOGS_HEADER_SPEED_MS),
            R::seed_from_u64(rng.gen()),
        );
        let entries = MISSION_LOG_ENTRIES
            .iter()
            .map(|&(permissions, operation, target, status)| LogEntry {
                permissions,
                operation: DecodeText::with_rng(
                    operation,
                    Duration::ZERO,
                    Duration::from_millis(MISSION_LOG_SPEED_MS),
                    R::seed_from_u64(rng.gen()),
                ),
                target,
                status,
                revealed_at: None,
            })
            .collect();

        Self {
            elapsed: Duration::ZERO,
            shown_at: None,
            header,
            header_done_at: None,
            entries,
        }
    }
}

impl<R: Rng> MissionLogs<R> {
    /// Schedule the reveal `delay` from now. Only the first call counts.
    pub fn arm(&mut self, delay: Duration) {
        if self.shown_at.is_none() {
            self.shown_at = Some(self.elapsed + delay);
            log::debug!("Mission logs armed, showing in {:?}", delay);
        }
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.shown_at.is_some_and(|at| self.elapsed >= at)
    }

    pub fn opacity(&self) -> f32 {
        match self.shown_at {
            Some(at) if self.elapsed >= at => ramp(self.elapsed - at, 0, MISSION_LOGS_FADE_MS),
            _ => 0.0,
        }
    }

    /// Number of entries that have started sliding in
    #[cfg(test)]
    pub fn revealed(&self) -> usize {
        self.entries.iter().filter(|e| e.revealed_at.is_some()).count()
    }

    pub fn entry_opacity(&self, index: usize) -> f32 {
        match self.entries.get(index).and_then(|e| e.revealed_at) {
            Some(at) => ramp(self.elapsed - at, 0, MISSION_LOG_FADE_MS),
            None => 0.0,
        }
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed += dt;
        let Some(live) = self.shown_at.and_then(|at| live_for(self.elapsed, at, dt)) else {
            return;
        };

        if self.header.advance(live) {
            self.header_done_at = Some(self.elapsed);
        }
        let Some(done) = self.header_done_at else {
            return;
        };

        for (i, entry) in self.entries.iter_mut().enumerate() {
            let at = done + Duration::from_millis(MISSION_LOG_STAGGER_MS * i as u64);
            if let Some(live) = live_for(self.elapsed, at, dt) {
                if entry.revealed_at.is_none() {
                    entry.revealed_at = Some(at);
                    log::debug!("Mission log entry {} revealed", i);
                }
                entry.operation.advance(live);
            }
        }
    }

    /// Draw with the header baseline at `origin`. Each entry takes two rows.
    pub fn draw(&self, canvas: &mut dyn Canvas, origin: Point) {
        let alpha = self.opacity();
        if alpha <= 0.0 {
            return;
        }
        let scale = MISSION_LOG_SCALE;
        let row = text_height(scale) + 8.0;
        let gap = text_width_scaled("  ", scale);

        let header = self.header.text();
        canvas.fill_text_scaled(&header, origin, TextAlign::Left, scale, Color::white(0.55 * alpha));
        let rule_y = origin.y + 6.0;
        let rule_end = origin.x + text_width_scaled(MISSION_LOGS_HEADER, scale);
        canvas.stroke_line(Point::new(origin.x, rule_y), Point::new(rule_end, rule_y), 1.0, Color::white(0.2 * alpha));

        for (i, entry) in self.entries.iter().enumerate() {
            let op = self.entry_opacity(i) * alpha;
            if op <= 0.0 {
                continue;
            }
            let x = origin.x - MISSION_LOG_SLIDE * (1.0 - self.entry_opacity(i));
            let y = origin.y + row * (1.5 + 2.0 * i as f32);

            let operation = entry.operation.text();
            canvas.fill_text_scaled(entry.permissions, Point::new(x, y), TextAlign::Left, scale, Color::white(0.4 * op));
            let op_x = x + text_width_scaled(entry.permissions, scale) + gap;
            canvas.fill_text_scaled(&operation, Point::new(op_x, y), TextAlign::Left, scale, Color::white(op));

            let y = y + row;
            canvas.fill_text_scaled(entry.target, Point::new(op_x, y), TextAlign::Left, scale, Color::white(0.55 * op));
            let status_x = op_x + text_width_scaled(entry.target, scale) + gap;
            canvas.fill_text_scaled(entry.status, Point::new(status_x, y), TextAlign::Left, scale, Color::white(0.7 * op));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::RecordingCanvas;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn logs() -> MissionLogs<StdRng> {
        MissionLogs::with_rng(StdRng::seed_from_u64(9))
    }

    // 12 chars x 3 ticks x 30 ms
    const HEADER_MS: u64 = 1080;

    #[test]
    fn test_dark_until_armed() {
        let mut logs = logs();
        logs.advance(Duration::from_secs(10));
        assert!(!logs.is_visible());
        assert_eq!(logs.opacity(), 0.0);
        assert_eq!(logs.revealed(), 0);

        let mut canvas = RecordingCanvas::new(400, 300);
        logs.draw(&mut canvas, Point::new(10.0, 10.0));
        assert!(canvas.ops.is_empty());
    }

    #[test]
    fn test_arm_delay_and_header_fade() {
        let mut logs = logs();
        logs.advance(ms(500));
        logs.arm(ms(300));
        // A second arm does not push the reveal back
        logs.arm(ms(5000));

        logs.advance(ms(299));
        assert!(!logs.is_visible());
        logs.advance(ms(1));
        assert!(logs.is_visible());
        assert_eq!(logs.opacity(), 0.0);
        assert!(!logs.header.is_complete());

        logs.advance(ms(100));
        assert!((logs.opacity() - 0.5).abs() < 1e-4);
        logs.advance(ms(100));
        assert_eq!(logs.opacity(), 1.0);
    }

    #[test]
    fn test_entries_follow_header_on_a_stagger() {
        let mut logs = logs();
        logs.arm(Duration::ZERO);
        logs.advance(ms(HEADER_MS - 1));
        assert!(!logs.header.is_complete());
        assert_eq!(logs.revealed(), 0);

        logs.advance(ms(1));
        assert!(logs.header.is_complete());
        assert_eq!(logs.revealed(), 1);
        assert_eq!(logs.entry_opacity(0), 0.0);
        assert_eq!(logs.entry_opacity(1), 0.0);

        logs.advance(ms(150));
        assert!((logs.entry_opacity(0) - 0.5).abs() < 1e-4);
        logs.advance(ms(249));
        assert_eq!(logs.revealed(), 1);
        logs.advance(ms(1));
        assert_eq!(logs.revealed(), 2);
        assert_eq!(logs.entry_opacity(0), 1.0);
    }

    #[test]
    fn test_operation_names_decode() {
        let mut logs = logs();
        logs.arm(Duration::ZERO);
        for _ in 0..400 {
            logs.advance(ms(16));
        }
        assert!(logs.entries.iter().all(|e| e.operation.is_complete()));

        let mut canvas = RecordingCanvas::new(800, 600);
        logs.draw(&mut canvas, Point::new(32.0, 100.0));
        let texts: Vec<&str> = canvas.texts().collect();
        for expected in [
            MISSION_LOGS_HEADER,
            "drwx-----",
            "OP_SILENT_CITADEL",
            "(Critical Infrastructure)",
            "OP_GLASS_CEILING",
            "(Fortune 100 Finance)",
            "[REDACTED]",
        ] {
            assert!(texts.contains(&expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_entry_slides_in_from_the_left() {
        let mut logs = logs();
        logs.arm(Duration::ZERO);
        logs.advance(ms(HEADER_MS));
        logs.advance(ms(150));

        let mut canvas = RecordingCanvas::new(800, 600);
        logs.draw(&mut canvas, Point::new(32.0, 100.0));
        let permissions_x = canvas.ops.iter().find_map(|op| match op {
            crate::canvas::recording::Op::Text { text, at, .. } if text == "drwx-----" => Some(at.x),
            _ => None,
        });
        let x = permissions_x.unwrap();
        assert!((x - (32.0 - MISSION_LOG_SLIDE * 0.5)).abs() < 1e-3, "x = {}", x);
    }
}
