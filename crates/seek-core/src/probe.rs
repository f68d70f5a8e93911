//! Cursor-shape probing along a trajectory.

use crate::{
    CancelToken, CursorShapeSource, CursorSignature, EngineResult, InputBackend, MouseButton,
    Point,
};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Result of a cursor sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepOutcome {
    /// The signature matched at `at` and the point was clicked.
    Found { at: Point, samples: u32 },
    /// The trajectory ran out without a match.
    Exhausted { samples: u32 },
    Cancelled { samples: u32 },
}

impl SweepOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SweepOutcome::Found { .. })
    }

    pub fn samples(&self) -> u32 {
        match *self {
            SweepOutcome::Found { samples, .. }
            | SweepOutcome::Exhausted { samples }
            | SweepOutcome::Cancelled { samples } => samples,
        }
    }
}

/// Moves the pointer along a trajectory and compares the live cursor shape
/// with a signature after every move.
pub struct CursorProbe<'a> {
    input: &'a dyn InputBackend,
    cursor: &'a dyn CursorShapeSource,
    sample_pause: Duration,
    cancel: &'a CancelToken,
}

impl<'a> CursorProbe<'a> {
    pub fn new(
        input: &'a dyn InputBackend,
        cursor: &'a dyn CursorShapeSource,
        sample_pause: Duration,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            input,
            cursor,
            sample_pause,
            cancel,
        }
    }

    /// Stops and left-clicks at the first point whose cursor shape equals
    /// `signature`.
    pub fn sweep<I>(&self, points: I, signature: CursorSignature) -> EngineResult<SweepOutcome>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut samples = 0u32;
        for point in points {
            if self.cancel.is_cancelled() {
                info!(samples, "sweep cancelled");
                return Ok(SweepOutcome::Cancelled { samples });
            }

            self.input.move_to(point.x, point.y)?;
            let shape = self.cursor.cursor_shape()?;
            samples += 1;
            debug!(x = point.x, y = point.y, shape = shape.0, "cursor sample");

            if shape == signature {
                self.input.click(MouseButton::Left)?;
                info!(x = point.x, y = point.y, samples, "cursor signature matched");
                return Ok(SweepOutcome::Found { at: point, samples });
            }

            if !self.sample_pause.is_zero() {
                thread::sleep(self.sample_pause);
            }
        }

        info!(samples, "sweep exhausted");
        Ok(SweepOutcome::Exhausted { samples })
    }
}
