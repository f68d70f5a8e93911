//! Input injection implementations.

use crate::{PlatformError, PlatformResult};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use seek_core::{EngineResult, InputBackend, MouseButton, Point};
use std::sync::Mutex;
use tracing::debug;

/// No-op input backend for dry runs and tests. Tracks the pointer position
/// without touching the OS.
#[derive(Default)]
pub struct NoopInput {
    position: Mutex<Point>,
}

impl NoopInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputBackend for NoopInput {
    fn move_to(&self, x: i32, y: i32) -> EngineResult<()> {
        debug!(x, y, "NoopInput: would move");
        *lock(&self.position)? = Point::new(x, y);
        Ok(())
    }

    fn click(&self, button: MouseButton) -> EngineResult<()> {
        debug!(?button, "NoopInput: would click");
        Ok(())
    }

    fn press(&self, button: MouseButton) -> EngineResult<()> {
        debug!(?button, "NoopInput: would press");
        Ok(())
    }

    fn release(&self, button: MouseButton) -> EngineResult<()> {
        debug!(?button, "NoopInput: would release");
        Ok(())
    }

    fn cursor_position(&self) -> EngineResult<Point> {
        Ok(*lock(&self.position)?)
    }
}

/// Real input backend using the `enigo` crate.
pub struct EnigoInput {
    enigo: Mutex<Enigo>,
}

impl EnigoInput {
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn with_enigo<T>(
        &self,
        f: impl FnOnce(&mut Enigo) -> Result<T, enigo::InputError>,
    ) -> EngineResult<T> {
        let mut enigo = lock(&self.enigo)?;
        f(&mut *enigo).map_err(|e| PlatformError::InjectionFailed(e.to_string()).into())
    }

    fn button(&self, button: MouseButton, direction: Direction) -> EngineResult<()> {
        self.with_enigo(|enigo| enigo.button(mouse_button_to_enigo(button), direction))
    }
}

impl InputBackend for EnigoInput {
    fn move_to(&self, x: i32, y: i32) -> EngineResult<()> {
        debug!(x, y, "injecting mouse move");
        self.with_enigo(|enigo| enigo.move_mouse(x, y, Coordinate::Abs))
    }

    fn click(&self, button: MouseButton) -> EngineResult<()> {
        debug!(?button, "injecting click");
        self.button(button, Direction::Click)
    }

    fn press(&self, button: MouseButton) -> EngineResult<()> {
        debug!(?button, "injecting mouse down");
        self.button(button, Direction::Press)
    }

    fn release(&self, button: MouseButton) -> EngineResult<()> {
        debug!(?button, "injecting mouse up");
        self.button(button, Direction::Release)
    }

    fn cursor_position(&self) -> EngineResult<Point> {
        let (x, y) = self.with_enigo(|enigo| enigo.location())?;
        Ok(Point::new(x, y))
    }
}

fn mouse_button_to_enigo(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> PlatformResult<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| PlatformError::InjectionFailed("input backend lock poisoned".into()))
}
