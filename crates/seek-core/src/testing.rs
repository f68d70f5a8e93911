//! Test doubles shared by the unit tests of this crate.

use crate::{
    CursorShapeSource, CursorSignature, EngineError, EngineResult, InputBackend, MouseButton,
    Point,
};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Move(i32, i32),
    Click(MouseButton),
    Press(MouseButton),
    Release(MouseButton),
}

/// Records every call; tracks the pointer position.
#[derive(Default)]
pub struct RecordingInput {
    events: Mutex<Vec<InputEvent>>,
    position: Mutex<Point>,
    fail_clicks: bool,
}

impl RecordingInput {
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            position: Mutex::new(Point::new(x, y)),
            ..Self::default()
        }
    }

    pub fn failing_clicks() -> Self {
        Self {
            fail_clicks: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<Point> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                InputEvent::Move(x, y) => Some(Point::new(x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn clicks(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, InputEvent::Click(_)))
            .count()
    }

    fn record(&self, event: InputEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl InputBackend for RecordingInput {
    fn move_to(&self, x: i32, y: i32) -> EngineResult<()> {
        *self.position.lock().unwrap() = Point::new(x, y);
        self.record(InputEvent::Move(x, y));
        Ok(())
    }

    fn click(&self, button: MouseButton) -> EngineResult<()> {
        if self.fail_clicks {
            return Err(EngineError::backend("click rejected"));
        }
        self.record(InputEvent::Click(button));
        Ok(())
    }

    fn press(&self, button: MouseButton) -> EngineResult<()> {
        self.record(InputEvent::Press(button));
        Ok(())
    }

    fn release(&self, button: MouseButton) -> EngineResult<()> {
        self.record(InputEvent::Release(button));
        Ok(())
    }

    fn cursor_position(&self) -> EngineResult<Point> {
        Ok(*self.position.lock().unwrap())
    }
}

/// Reports `hit` once the n-th query is reached (1-based), `miss` otherwise.
pub struct ScriptedCursor {
    shapes: Mutex<VecDeque<i64>>,
    fallback: i64,
}

impl ScriptedCursor {
    pub fn constant(shape: i64) -> Self {
        Self {
            shapes: Mutex::new(VecDeque::new()),
            fallback: shape,
        }
    }

    pub fn matching_at(query: usize, hit: i64, miss: i64) -> Self {
        let mut shapes: VecDeque<i64> = std::iter::repeat(miss).take(query - 1).collect();
        shapes.push_back(hit);
        Self {
            shapes: Mutex::new(shapes),
            fallback: miss,
        }
    }
}

impl CursorShapeSource for ScriptedCursor {
    fn cursor_shape(&self) -> EngineResult<CursorSignature> {
        let next = self.shapes.lock().unwrap().pop_front();
        Ok(CursorSignature(next.unwrap_or(self.fallback)))
    }
}
