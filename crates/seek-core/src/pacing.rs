//! Randomized pacing and offsets.
//!
//! Randomness always comes from a caller-supplied RNG so a seeded `StdRng`
//! makes every delay and offset reproducible.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;

/// Inclusive range of delays in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl PacingRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// No delay at all.
    pub const fn none() -> Self {
        Self::new(0, 0)
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let ms = if self.min_ms >= self.max_ms {
            self.min_ms
        } else {
            rng.gen_range(self.min_ms..=self.max_ms)
        };
        Duration::from_millis(ms)
    }

    /// Sleep a random duration from the range. Returns the slept duration.
    pub fn pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let delay = self.sample(rng);
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        delay
    }
}

impl Default for PacingRange {
    fn default() -> Self {
        Self::new(50, 400)
    }
}

/// Inclusive range of pixel offsets used when parking the pointer after a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetRange {
    pub min: i32,
    pub max: i32,
}

impl OffsetRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        if self.min >= self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl Default for OffsetRange {
    fn default() -> Self {
        Self::new(50, 300)
    }
}
