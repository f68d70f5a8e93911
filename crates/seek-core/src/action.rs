//! Click actions performed on an acquired coordinate.

use crate::{EngineResult, InputBackend, MouseButton, OffsetRange, PacingRange};
use rand::Rng;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Moves and clicks through an [`InputBackend`].
pub struct ActionExecutor<'a> {
    input: &'a dyn InputBackend,
    reset_offset: OffsetRange,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(input: &'a dyn InputBackend, reset_offset: OffsetRange) -> Self {
        Self {
            input,
            reset_offset,
        }
    }

    /// Move to (x, y) and left-click. With `reset_position`, park the pointer
    /// at a random offset down-right of the click point afterwards.
    pub fn act<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        x: i32,
        y: i32,
        reset_position: bool,
    ) -> EngineResult<()> {
        debug!(x, y, reset_position, "click");
        self.input.move_to(x, y)?;
        self.input.click(MouseButton::Left)?;
        if reset_position {
            self.park_near(rng, x, y)?;
        }
        Ok(())
    }

    /// Click at (x, y), then pause a jittered `pause`. With `reset_position`,
    /// return near where the pointer was before the click.
    pub fn safe_click<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        x: i32,
        y: i32,
        reset_position: bool,
        pause: PacingRange,
    ) -> EngineResult<()> {
        let origin = self.input.cursor_position()?;
        debug!(x, y, ?origin, "safe click");
        self.input.move_to(x, y)?;
        self.input.click(MouseButton::Left)?;
        pause.pause(rng);
        if reset_position {
            self.park_near(rng, origin.x, origin.y)?;
        }
        Ok(())
    }

    /// Press `button` at (x, y), hold it for `hold`, release.
    pub fn hold_click(
        &self,
        x: i32,
        y: i32,
        button: MouseButton,
        hold: Duration,
    ) -> EngineResult<()> {
        debug!(x, y, ?button, hold_ms = hold.as_millis() as u64, "hold click");
        self.input.move_to(x, y)?;
        self.input.press(button)?;
        thread::sleep(hold);
        self.input.release(button)
    }

    fn park_near<R: Rng + ?Sized>(&self, rng: &mut R, x: i32, y: i32) -> EngineResult<()> {
        let dx = self.reset_offset.sample(rng);
        let dy = self.reset_offset.sample(rng);
        self.input.move_to(x.saturating_add(dx), y.saturating_add(dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InputEvent, RecordingInput};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_act_without_reset() {
        let input = RecordingInput::default();
        let mut rng = StdRng::seed_from_u64(0);
        ActionExecutor::new(&input, OffsetRange::default())
            .act(&mut rng, 120, 80, false)
            .unwrap();

        assert_eq!(
            input.events(),
            vec![InputEvent::Move(120, 80), InputEvent::Click(MouseButton::Left)]
        );
    }

    #[test]
    fn test_act_with_reset_parks_in_offset_window() {
        let input = RecordingInput::default();
        let mut rng = StdRng::seed_from_u64(9);
        ActionExecutor::new(&input, OffsetRange::default())
            .act(&mut rng, 100, 200, true)
            .unwrap();

        let moves = input.moves();
        assert_eq!(moves.len(), 2);
        let parked = moves[1];
        assert!((150..=400).contains(&parked.x), "x = {}", parked.x);
        assert!((250..=500).contains(&parked.y), "y = {}", parked.y);
    }

    #[test]
    fn test_safe_click_returns_near_origin() {
        let input = RecordingInput::at(10, 10);
        let mut rng = StdRng::seed_from_u64(5);
        ActionExecutor::new(&input, OffsetRange::new(50, 50))
            .safe_click(&mut rng, 500, 600, true, PacingRange::none())
            .unwrap();

        assert_eq!(
            input.events(),
            vec![
                InputEvent::Move(500, 600),
                InputEvent::Click(MouseButton::Left),
                InputEvent::Move(60, 60),
            ]
        );
    }

    #[test]
    fn test_hold_click_presses_and_releases() {
        let input = RecordingInput::default();
        ActionExecutor::new(&input, OffsetRange::default())
            .hold_click(3, 4, MouseButton::Right, Duration::from_millis(1))
            .unwrap();

        assert_eq!(
            input.events(),
            vec![
                InputEvent::Move(3, 4),
                InputEvent::Press(MouseButton::Right),
                InputEvent::Release(MouseButton::Right),
            ]
        );
    }

    #[test]
    fn test_backend_failure_propagates() {
        let input = RecordingInput::failing_clicks();
        let mut rng = StdRng::seed_from_u64(0);
        let err = ActionExecutor::new(&input, OffsetRange::default())
            .act(&mut rng, 1, 1, true)
            .unwrap_err();
        assert_eq!(err.to_string(), "backend failure: click rejected");
        assert_eq!(input.moves().len(), 1);
    }
}
