use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{Canvas, Color};
use crate::config::{
    ARTIFACT_DURATION_SPREAD_MS, ARTIFACT_HEIGHT_SPREAD, ARTIFACT_MAX_OFFSET,
    ARTIFACT_MIN_DURATION_MS, ARTIFACT_MIN_HEIGHT, ARTIFACT_SPAWN_PROBABILITY, ARTIFACT_TICK_MS,
    NOISE_LEFT_RANGE, NOISE_MAX_SPECKLES, NOISE_MIN_WIDTH, NOISE_WIDTH_SPREAD,
};

const RED: Color = Color::rgba(255, 0, 0, 0.1);
const CYAN: Color = Color::rgba(0, 255, 255, 0.1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Full-width horizontal tear
    Tear,
    /// Speckled block somewhere in the middle of the screen
    Noise,
    /// Red and cyan bars pulled apart
    Rgb,
}

impl ArtifactKind {
    const ALL: [Self; 3] = [Self::Tear, Self::Noise, Self::Rgb];
}

#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    pub id: u64,
    pub kind: ArtifactKind,
    /// Top edge as a fraction of the surface height
    pub y: f32,
    pub height: f32,
    pub offset_x: f32,
    /// Noise bursts only: left edge as a fraction of the width, and pixel width
    pub left: f32,
    pub width: f32,
    pub duration: Duration,
    pub age: Duration,
}

impl Artifact {
    pub fn is_expired(&self) -> bool {
        self.age >= self.duration
    }

    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.age.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    /// Entrance opacity; noise settles at 0.8 by half its life
    pub fn opacity(&self) -> f32 {
        match self.kind {
            ArtifactKind::Noise => (self.progress() * 2.0).min(1.0) * 0.8,
            ArtifactKind::Tear | ArtifactKind::Rgb => self.progress(),
        }
    }
}

/// Short-lived screen glitches layered over the whole HUD.
///
/// Every tick there is a small chance of a new artifact; each one lives for a
/// few hundred milliseconds and is then dropped. Ids come from a counter owned
/// by this instance.
pub struct GlitchArtifacts<R: Rng = StdRng> {
    rng: R,
    spawn_probability: f64,
    tick: Duration,
    pending: Duration,
    next_id: u64,
    artifacts: Vec<Artifact>,
}

impl GlitchArtifacts<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), ARTIFACT_SPAWN_PROBABILITY)
    }
}

impl<R: Rng> GlitchArtifacts<R> {
    pub fn with_rng(rng: R, spawn_probability: f64) -> Self {
        Self {
            rng,
            spawn_probability: spawn_probability.clamp(0.0, 1.0),
            tick: Duration::from_millis(ARTIFACT_TICK_MS),
            pending: Duration::ZERO,
            next_id: 0,
            artifacts: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Add one random artifact and return its id
    pub fn spawn(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        let kind = ArtifactKind::ALL[self.rng.gen_range(0..ArtifactKind::ALL.len())];
        let duration = ARTIFACT_MIN_DURATION_MS + self.rng.gen_range(0..ARTIFACT_DURATION_SPREAD_MS);
        let artifact = Artifact {
            id,
            kind,
            y: self.rng.gen::<f32>(),
            height: ARTIFACT_MIN_HEIGHT + self.rng.gen::<f32>() * ARTIFACT_HEIGHT_SPREAD,
            offset_x: self.rng.gen_range(-ARTIFACT_MAX_OFFSET..=ARTIFACT_MAX_OFFSET),
            left: self.rng.gen_range(NOISE_LEFT_RANGE[0]..NOISE_LEFT_RANGE[1]),
            width: NOISE_MIN_WIDTH + self.rng.gen::<f32>() * NOISE_WIDTH_SPREAD,
            duration: Duration::from_millis(duration),
            age: Duration::ZERO,
        };
        log::trace!("Glitch artifact {} ({:?}) for {:?}", artifact.id, kind, artifact.duration);
        self.artifacts.push(artifact);
        id
    }

    /// Age live artifacts, drop the finished ones, then roll once per
    /// elapsed tick for a new one
    pub fn advance(&mut self, dt: Duration) {
        for artifact in &mut self.artifacts {
            artifact.age += dt;
        }
        self.artifacts.retain(|a| !a.is_expired());

        self.pending += dt;
        while self.pending >= self.tick {
            self.pending -= self.tick;
            if self.rng.gen_bool(self.spawn_probability) {
                self.spawn();
            }
        }
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        for i in 0..self.artifacts.len() {
            let artifact = self.artifacts[i].clone();
            let opacity = artifact.opacity();
            let top = artifact.y * h;

            match artifact.kind {
                ArtifactKind::Tear => {
                    // Grows outwards from the centre line
                    let span = w * artifact.progress();
                    let x = (w - span) * 0.5 + artifact.offset_x;
                    canvas.fill_rect(x, top, span, artifact.height, Color::white(0.05 * opacity));
                }
                ArtifactKind::Noise => {
                    let (x, bh) = (artifact.left * w, artifact.height * 2.0);
                    canvas.fill_rect(x, top, artifact.width, bh, Color::white(0.1 * opacity));
                    let speckles = ((artifact.width * bh) as usize / 16).min(NOISE_MAX_SPECKLES);
                    for _ in 0..speckles {
                        let sx = x + self.rng.gen::<f32>() * artifact.width;
                        let sy = top + self.rng.gen::<f32>() * bh;
                        let alpha = self.rng.gen::<f32>() * opacity;
                        canvas.fill_rect(sx, sy, 1.0, 1.0, Color::white(alpha));
                    }
                }
                ArtifactKind::Rgb => {
                    let bh = artifact.height * 3.0;
                    let red = Color { a: RED.a * opacity, ..RED };
                    let cyan = Color { a: CYAN.a * opacity, ..CYAN };
                    canvas.fill_rect(-artifact.offset_x, top, w, bh, red);
                    canvas.fill_rect(artifact.offset_x, top, w, bh, cyan);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::recording::RecordingCanvas;

    fn seeded(probability: f64) -> GlitchArtifacts<StdRng> {
        GlitchArtifacts::with_rng(StdRng::seed_from_u64(5), probability)
    }

    fn artifact(kind: ArtifactKind) -> Artifact {
        Artifact {
            id: 0,
            kind,
            y: 0.5,
            height: 4.0,
            offset_x: 6.0,
            left: 0.25,
            width: 100.0,
            duration: Duration::from_millis(200),
            age: Duration::from_millis(100),
        }
    }

    #[test]
    fn test_ids_count_up_per_instance() {
        let mut a = seeded(0.0);
        let mut b = seeded(0.0);
        assert_eq!(a.spawn(), 0);
        assert_eq!(a.spawn(), 1);
        assert_eq!(a.spawn(), 2);
        // A second instance has its own counter
        assert_eq!(b.spawn(), 0);

        let ids: Vec<u64> = a.artifacts().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_spawned_artifacts_stay_in_range() {
        let mut glitches = seeded(0.0);
        for _ in 0..200 {
            glitches.spawn();
        }
        for a in glitches.artifacts() {
            assert!((0.0..1.0).contains(&a.y));
            assert!(a.height >= ARTIFACT_MIN_HEIGHT && a.height <= ARTIFACT_MIN_HEIGHT + ARTIFACT_HEIGHT_SPREAD);
            assert!(a.offset_x.abs() <= ARTIFACT_MAX_OFFSET);
            assert!(a.duration >= Duration::from_millis(100) && a.duration < Duration::from_millis(300));
            assert!(a.left >= 0.2 && a.left < 0.8);
            assert!(a.width >= 50.0 && a.width <= 250.0);
        }
        for kind in ArtifactKind::ALL {
            assert!(glitches.artifacts().iter().any(|a| a.kind == kind));
        }
    }

    #[test]
    fn test_expired_artifacts_are_dropped() {
        let mut glitches = seeded(0.0);
        glitches.spawn();
        let life = glitches.artifacts()[0].duration;

        glitches.advance(life - Duration::from_millis(1));
        assert_eq!(glitches.artifacts().len(), 1);
        glitches.advance(Duration::from_millis(1));
        assert!(glitches.artifacts().is_empty());
    }

    #[test]
    fn test_one_roll_per_tick() {
        let mut glitches = seeded(1.0);
        glitches.advance(Duration::from_millis(99));
        assert!(glitches.artifacts().is_empty());
        glitches.advance(Duration::from_millis(1));
        assert_eq!(glitches.artifacts().len(), 1);

        // A long frame catches up on every tick it covered
        let mut glitches = seeded(1.0);
        glitches.advance(Duration::from_secs(1));
        assert_eq!(glitches.artifacts().len(), 10);
    }

    #[test]
    fn test_spawn_rate_is_low() {
        let mut glitches = seeded(ARTIFACT_SPAWN_PROBABILITY);
        for _ in 0..600 {
            glitches.advance(Duration::from_millis(ARTIFACT_TICK_MS));
        }
        // 600 rolls at 5%: about 30 spawns
        assert!(glitches.next_id > 5 && glitches.next_id < 80, "spawned {}", glitches.next_id);
        // Nothing outlives 300 ms, so at most three ticks' worth are live
        assert!(glitches.artifacts().len() <= 3);
    }

    #[test]
    fn test_opacity_ramps() {
        let mut tear = artifact(ArtifactKind::Tear);
        assert!((tear.opacity() - 0.5).abs() < 1e-6);
        tear.age = Duration::ZERO;
        assert_eq!(tear.opacity(), 0.0);

        let noise = artifact(ArtifactKind::Noise);
        assert!((noise.opacity() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_each_kind_draws() {
        let mut glitches = seeded(0.0);
        glitches.artifacts = vec![artifact(ArtifactKind::Tear)];
        let mut canvas = RecordingCanvas::new(400, 300);
        glitches.draw(&mut canvas);
        let rects: Vec<_> = canvas.rects().collect();
        assert_eq!(rects.len(), 1);
        let (x, y, w, h, _) = rects[0];
        // Half grown, centred, then shifted
        assert_eq!((x, y, w, h), (106.0, 150.0, 200.0, 4.0));

        glitches.artifacts = vec![artifact(ArtifactKind::Noise)];
        let mut canvas = RecordingCanvas::new(400, 300);
        glitches.draw(&mut canvas);
        let rects: Vec<_> = canvas.rects().collect();
        assert_eq!((rects[0].0, rects[0].2, rects[0].3), (100.0, 100.0, 8.0));
        assert_eq!(rects.len(), 1 + 50);
        assert!(rects[1..].iter().all(|r| r.0 >= 100.0 && r.0 <= 200.0));

        glitches.artifacts = vec![artifact(ArtifactKind::Rgb)];
        let mut canvas = RecordingCanvas::new(400, 300);
        glitches.draw(&mut canvas);
        let rects: Vec<_> = canvas.rects().collect();
        assert_eq!(rects.len(), 2);
        assert_eq!((rects[0].0, rects[0].4.r, rects[0].4.g), (-6.0, 255, 0));
        assert_eq!((rects[1].0, rects[1].4.r, rects[1].4.g), (6.0, 0, 255));
        assert_eq!(rects[1].3, 12.0);
    }
}
