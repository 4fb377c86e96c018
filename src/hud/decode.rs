use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{DECODE_ALPHABET, DECODE_SCRAMBLE_WIDTH, DECODE_TICKS_PER_CHAR};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Waiting,
    Decoding { cursor: usize, ticks: u32 },
    Done,
}

/// Left-to-right "decrypt" reveal of a fixed string.
///
/// Every `interval` the characters behind the cursor settle to their target
/// and a short window ahead of it re-scrambles; the cursor moves one place
/// every few ticks. Whitespace is never scrambled.
pub struct DecodeText<R: Rng = StdRng> {
    target: Vec<char>,
    display: Vec<char>,
    alphabet: Vec<char>,
    rng: R,
    delay: Duration,
    interval: Duration,
    elapsed: Duration,
    pending: Duration,
    phase: Phase,
}

impl DecodeText<StdRng> {
    pub fn new(text: &str, delay: Duration, interval: Duration) -> Self {
        Self::with_rng(text, delay, interval, StdRng::from_entropy())
    }
}

impl<R: Rng> DecodeText<R> {
    pub fn with_rng(text: &str, delay: Duration, interval: Duration, rng: R) -> Self {
        let target: Vec<char> = text.chars().collect();
        let display = target
            .iter()
            .map(|&c| if c.is_whitespace() { c } else { '_' })
            .collect();
        Self {
            target,
            display,
            alphabet: DECODE_ALPHABET.chars().collect(),
            rng,
            delay,
            // A zero interval would never let time drain
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            pending: Duration::ZERO,
            phase: Phase::Waiting,
        }
    }

    /// Current display string; placeholders before the start delay
    pub fn text(&self) -> String {
        self.display.iter().collect()
    }

    pub fn is_decoding(&self) -> bool {
        matches!(self.phase, Phase::Decoding { .. })
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Done
    }

    fn random_char(&mut self) -> char {
        self.alphabet[self.rng.gen_range(0..self.alphabet.len())]
    }

    fn begin(&mut self) {
        for i in 0..self.target.len() {
            if !self.target[i].is_whitespace() {
                self.display[i] = self.random_char();
            }
        }
        self.phase = Phase::Decoding { cursor: 0, ticks: 0 };
    }

    fn finish(&mut self) {
        self.display.clone_from(&self.target);
        self.phase = Phase::Done;
    }

    /// One scramble step; returns true when this step completed the reveal
    fn step(&mut self) -> bool {
        let Phase::Decoding { mut cursor, mut ticks } = self.phase else {
            return false;
        };

        for i in 0..self.target.len() {
            if self.target[i].is_whitespace() || i < cursor {
                self.display[i] = self.target[i];
            } else if i < cursor + DECODE_SCRAMBLE_WIDTH {
                self.display[i] = self.random_char();
            }
        }

        ticks += 1;
        if ticks >= DECODE_TICKS_PER_CHAR {
            ticks = 0;
            cursor += 1;
            if cursor >= self.target.len() {
                self.finish();
                return true;
            }
        }
        self.phase = Phase::Decoding { cursor, ticks };
        false
    }

    /// Advance the effect clock. Returns `true` exactly once: on the call
    /// during which the reveal completed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.phase == Phase::Done {
            return false;
        }
        self.elapsed += dt;

        if self.phase == Phase::Waiting {
            if self.elapsed < self.delay {
                return false;
            }
            self.pending = self.elapsed - self.delay;
            if self.target.is_empty() {
                self.finish();
                return true;
            }
            self.begin();
        } else {
            self.pending += dt;
        }

        while self.pending >= self.interval {
            self.pending -= self.interval;
            if self.step() {
                return true;
            }
        }
        false
    }
}
