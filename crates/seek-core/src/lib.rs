//! seek-core: target acquisition engine.
//!
//! Decides *when* and *where* to probe the screen and what to do with a probe
//! result:
//! - a poll-act-retry loop over a pluggable finder (`poll`)
//! - a tolerant parser for the finder's `"<id>|<x>|<y>"` encoding (`codec`)
//! - four search trajectories swept while watching the cursor shape
//!   (`trajectory`, `probe`)
//!
//! Design goal: keep this crate platform-agnostic. Input injection, cursor
//! shape and pixel access live in `seek-platform`.

mod action;
mod backend;
mod budget;
mod cancel;
pub mod codec;
mod config;
mod engine;
mod error;
mod pacing;
mod poll;
mod probe;
mod trajectory;

#[cfg(test)]
mod testing;

pub use action::ActionExecutor;
pub use backend::{
    Capability, CursorShapeSource, Finder, FinderChain, InputBackend, Target, TargetKind,
};
pub use budget::Budget;
pub use cancel::CancelToken;
pub use config::{default_config_path, EngineConfig};
pub use engine::Seeker;
pub use error::{ConfigError, ConfigResult, EngineError, EngineResult};
pub use pacing::{OffsetRange, PacingRange};
pub use poll::{Acquisition, Outcome, PollConfig, PollLoop};
pub use probe::{CursorProbe, SweepOutcome};
pub use trajectory::{
    CircularInvolute, Elliptical, ScatterInvolute, SquareSpiral, Trajectory,
    SAMPLES_PER_REVOLUTION,
};

use serde::{Deserialize, Serialize};

/// Screen coordinate in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a fractional amount, rounded to the nearest pixel.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: (f64::from(self.x) + dx).round() as i32,
            y: (f64::from(self.y) + dy).round() as i32,
        }
    }
}

/// Axis-aligned search rectangle. `x1 <= x2 && y1 <= y2` is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRegion {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl SearchRegion {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        (self.x1..=self.x2).contains(&x) && (self.y1..=self.y2).contains(&y)
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub found: bool,
    pub x: i32,
    pub y: i32,
}

impl ProbeResult {
    /// Nothing found.
    pub const NONE: ProbeResult = ProbeResult {
        found: false,
        x: 0,
        y: 0,
    };

    pub const fn found(x: i32, y: i32) -> Self {
        Self { found: true, x, y }
    }

    /// Only the x coordinate was reported.
    pub const fn partial(x: i32) -> Self {
        Self { found: false, x, y: 0 }
    }

    /// A usable on-screen hit: both coordinates strictly positive.
    pub fn is_hit(&self) -> bool {
        self.x > 0 && self.y > 0
    }
}

/// OS cursor shape handle, compared by exact equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CursorSignature(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
