//! Search trajectories expanding outward from a start point.
//!
//! Each generator is a lazy, finite iterator of screen points. Generators are
//! not restartable: build a fresh one per search.

use crate::Point;
use serde::{Deserialize, Serialize};

/// Angular step between samples on the circular and elliptical spirals.
pub const ANGLE_STEP_DEG: u32 = 10;
/// The radius grows after samples whose angle is a multiple of this.
pub const GROWTH_EVERY_DEG: u32 = 20;
/// Samples per revolution (360 / 10).
pub const SAMPLES_PER_REVOLUTION: u32 = 360 / ANGLE_STEP_DEG;
/// Extra length of the vertical legs of the square spiral.
pub const SQUARE_VERTICAL_EXTRA: u32 = 6;

/// Trajectory selection with its parameters, as found in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trajectory {
    Circular {
        radius: f64,
        step: f64,
        max_circles: u32,
    },
    Scatter {
        radius: f64,
        step: f64,
        max_iterations: u32,
    },
    Elliptical {
        width_radius: f64,
        height_radius: f64,
        step: f64,
        max_circles: u32,
    },
    Square {
        step: u32,
        max_circles: u32,
    },
}

impl Trajectory {
    pub fn circular() -> Self {
        Self::Circular {
            radius: 1.0,
            step: 1.0,
            max_circles: 6,
        }
    }

    pub fn scatter() -> Self {
        Self::Scatter {
            radius: 2.0,
            step: 0.6,
            max_iterations: 80,
        }
    }

    pub fn elliptical() -> Self {
        Self::Elliptical {
            width_radius: 0.5,
            height_radius: 8.0,
            step: 0.5,
            max_circles: 6,
        }
    }

    pub fn square() -> Self {
        Self::Square {
            step: 10,
            max_circles: 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Trajectory::Circular { .. } => "circular",
            Trajectory::Scatter { .. } => "scatter",
            Trajectory::Elliptical { .. } => "elliptical",
            Trajectory::Square { .. } => "square",
        }
    }

    /// Build a fresh generator around `origin`.
    pub fn points(&self, origin: Point) -> Box<dyn Iterator<Item = Point> + Send> {
        match *self {
            Trajectory::Circular {
                radius,
                step,
                max_circles,
            } => Box::new(CircularInvolute::new(origin, radius, step, max_circles)),
            Trajectory::Scatter {
                radius,
                step,
                max_iterations,
            } => Box::new(ScatterInvolute::new(origin, radius, step, max_iterations)),
            Trajectory::Elliptical {
                width_radius,
                height_radius,
                step,
                max_circles,
            } => Box::new(Elliptical::new(
                origin,
                width_radius,
                height_radius,
                step,
                max_circles,
            )),
            Trajectory::Square { step, max_circles } => {
                Box::new(SquareSpiral::new(origin, step, max_circles))
            }
        }
    }
}

impl Default for Trajectory {
    fn default() -> Self {
        Self::circular()
    }
}

/// Angle counter shared by the circular and elliptical spirals: 0°, 10°, …,
/// 350° for a fixed number of revolutions.
#[derive(Debug, Clone)]
struct Revolutions {
    angle: u32,
    remaining: u32,
}

impl Revolutions {
    fn new(count: u32) -> Self {
        Self {
            angle: 0,
            remaining: count,
        }
    }

    /// Next angle in degrees, or `None` once every revolution is done.
    fn next_angle(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let angle = self.angle;
        self.angle += ANGLE_STEP_DEG;
        if self.angle == 360 {
            self.angle = 0;
            self.remaining -= 1;
        }
        Some(angle)
    }
}

fn grows_at(angle: u32) -> bool {
    angle % GROWTH_EVERY_DEG == 0
}

/// Circle whose radius grows by `step` every 20°.
#[derive(Debug, Clone)]
pub struct CircularInvolute {
    origin: Point,
    radius: f64,
    step: f64,
    revolutions: Revolutions,
}

impl CircularInvolute {
    pub fn new(origin: Point, radius: f64, step: f64, max_circles: u32) -> Self {
        Self {
            origin,
            radius,
            step,
            revolutions: Revolutions::new(max_circles),
        }
    }

    /// Radius that the next sample will use.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Iterator for CircularInvolute {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let angle = self.revolutions.next_angle()?;
        let theta = f64::from(angle).to_radians();
        let point = self
            .origin
            .offset(self.radius * theta.cos(), self.radius * theta.sin());
        if grows_at(angle) {
            self.radius += self.step;
        }
        Some(point)
    }
}

/// Involute of a circle, `r` advancing by `step` per sample:
/// `x = ox + cos r + r·sin r`, `y = oy + sin r − r·cos r`.
#[derive(Debug, Clone)]
pub struct ScatterInvolute {
    origin: Point,
    r: f64,
    step: f64,
    remaining: u32,
}

impl ScatterInvolute {
    pub fn new(origin: Point, radius: f64, step: f64, max_iterations: u32) -> Self {
        Self {
            origin,
            r: radius,
            step,
            remaining: max_iterations,
        }
    }
}

impl Iterator for ScatterInvolute {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let r = self.r;
        let point = self
            .origin
            .offset(r.cos() + r * r.sin(), r.sin() - r * r.cos());
        self.r += self.step;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

/// Like [`CircularInvolute`] with independent horizontal and vertical radii.
#[derive(Debug, Clone)]
pub struct Elliptical {
    origin: Point,
    width_radius: f64,
    height_radius: f64,
    step: f64,
    revolutions: Revolutions,
}

impl Elliptical {
    pub fn new(
        origin: Point,
        width_radius: f64,
        height_radius: f64,
        step: f64,
        max_circles: u32,
    ) -> Self {
        Self {
            origin,
            width_radius,
            height_radius,
            step,
            revolutions: Revolutions::new(max_circles),
        }
    }

    pub fn radii(&self) -> (f64, f64) {
        (self.width_radius, self.height_radius)
    }
}

impl Iterator for Elliptical {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let angle = self.revolutions.next_angle()?;
        let theta = f64::from(angle).to_radians();
        let point = self.origin.offset(
            self.width_radius * theta.cos(),
            self.height_radius * theta.sin(),
        );
        if grows_at(angle) {
            self.width_radius += self.step;
            self.height_radius += self.step;
        }
        Some(point)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leg {
    Right,
    Up,
    Left,
    Down,
}

impl Leg {
    const ORDER: [Leg; 4] = [Leg::Right, Leg::Up, Leg::Left, Leg::Down];

    /// Unit direction in screen coordinates (y grows downward).
    fn direction(self) -> (i32, i32) {
        match self {
            Leg::Right => (1, 0),
            Leg::Up => (0, -1),
            Leg::Left => (-1, 0),
            Leg::Down => (0, 1),
        }
    }
}

/// Rectangular walk: right, up, left, down, each unit step `step` pixels.
///
/// With turn counter `m` (starting at 0): right `m`, up `m + 6`, then `m`
/// advances, left `m`, down `m + 6`, then `m` advances again.
#[derive(Debug, Clone)]
pub struct SquareSpiral {
    position: Point,
    step: u32,
    m: u32,
    circles_left: u32,
    leg: usize,
    leg_remaining: u32,
}

impl SquareSpiral {
    pub fn new(origin: Point, step: u32, max_circles: u32) -> Self {
        Self {
            position: origin,
            step,
            m: 0,
            circles_left: max_circles,
            leg: 0,
            leg_remaining: 0,
        }
    }

    /// Leg lengths `[right, up, left, down]` of the circle that starts with
    /// turn counter `m`.
    pub fn legs(m: u32) -> [u32; 4] {
        let next = m + 1;
        [
            m,
            m + SQUARE_VERTICAL_EXTRA,
            next,
            next + SQUARE_VERTICAL_EXTRA,
        ]
    }

    fn load_leg(&mut self) {
        self.leg_remaining = Self::legs(self.m)[self.leg];
    }
}

impl Iterator for SquareSpiral {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.circles_left > 0 {
            if self.leg_remaining > 0 {
                self.leg_remaining -= 1;
                let (dx, dy) = Leg::ORDER[self.leg].direction();
                self.position = Point::new(
                    advance(self.position.x, dx, self.step),
                    advance(self.position.y, dy, self.step),
                );
                return Some(self.position);
            }

            // Leg finished (or empty): turn the corner.
            self.leg += 1;
            if self.leg == Leg::ORDER.len() {
                self.leg = 0;
                self.m += 2;
                self.circles_left -= 1;
                if self.circles_left == 0 {
                    return None;
                }
            }
            self.load_leg();
        }
        None
    }
}

/// `coord + dir * step`, clamped to the `i32` range.
fn advance(coord: i32, dir: i32, step: u32) -> i32 {
    let next = i64::from(coord) + i64::from(dir) * i64::from(step);
    next.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
