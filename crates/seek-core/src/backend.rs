//! Boundaries to the outside world: input injection, cursor shape, finders.
//!
//! Implementations live in `seek-platform` (or in tests). Every call is
//! synchronous and side-effecting; the engine never buffers or batches them.

use crate::{CursorSignature, EngineError, EngineResult, MouseButton, Point, SearchRegion};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Mouse control used by the action executor and cursor probe.
pub trait InputBackend: Send + Sync {
    /// Move the pointer to absolute screen coordinates.
    fn move_to(&self, x: i32, y: i32) -> EngineResult<()>;
    /// Press and release `button` at the current position.
    fn click(&self, button: MouseButton) -> EngineResult<()>;
    fn press(&self, button: MouseButton) -> EngineResult<()>;
    fn release(&self, button: MouseButton) -> EngineResult<()>;
    /// Current pointer position.
    fn cursor_position(&self) -> EngineResult<Point>;
}

/// Source of the live cursor shape.
pub trait CursorShapeSource: Send + Sync {
    fn cursor_shape(&self) -> EngineResult<CursorSignature>;
}

/// What kind of pattern a finder matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Image,
    Text,
    Color,
}

/// An operation a finder provider may or may not handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Find(TargetKind),
    ReadText,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Find(kind) => write!(f, "find({kind:?})"),
            Capability::ReadText => write!(f, "read_text"),
        }
    }
}

/// What to look for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub kind: TargetKind,
    /// Image name, text, or hex color depending on `kind`.
    pub pattern: String,
    /// Foreground color filter for text matching (e.g. `"FFFFFF"`).
    #[serde(default)]
    pub color: Option<String>,
    pub similarity: f64,
}

impl Target {
    pub fn image(name: impl Into<String>, similarity: f64) -> Self {
        Self {
            kind: TargetKind::Image,
            pattern: name.into(),
            color: None,
            similarity,
        }
    }

    pub fn text(text: impl Into<String>, color: impl Into<String>, similarity: f64) -> Self {
        Self {
            kind: TargetKind::Text,
            pattern: text.into(),
            color: Some(color.into()),
            similarity,
        }
    }

    pub fn color(hex: impl Into<String>, similarity: f64) -> Self {
        Self {
            kind: TargetKind::Color,
            pattern: hex.into(),
            color: None,
            similarity,
        }
    }
}

/// A recognition backend.
///
/// `find` returns the raw `"<id>|<x>|<y>"` encoding; it is decoded by
/// [`codec::parse`](crate::codec::parse), so a provider may return anything,
/// including an empty string for "no match".
pub trait Finder: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    fn supports(&self, capability: Capability) -> bool;

    fn find(&self, region: SearchRegion, target: &Target) -> EngineResult<String>;

    /// Read text in `region`. `None` or an empty string means nothing was read.
    fn read_text(
        &self,
        region: SearchRegion,
        color: &str,
        similarity: f64,
    ) -> EngineResult<Option<String>> {
        let _ = (region, color, similarity);
        Err(EngineError::NoProvider(Capability::ReadText))
    }
}

/// Finder providers in fixed priority order.
///
/// The order is set at construction; the first provider that supports a
/// capability handles it.
#[derive(Default)]
pub struct FinderChain {
    providers: Vec<Box<dyn Finder>>,
}

impl FinderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider with lower priority than all existing ones.
    pub fn with(mut self, provider: Box<dyn Finder>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// First provider supporting `capability`.
    pub fn resolve(&self, capability: Capability) -> EngineResult<&dyn Finder> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.supports(capability))
            .ok_or(EngineError::NoProvider(capability))?;
        debug!(provider = provider.name(), %capability, "resolved finder");
        Ok(provider.as_ref())
    }

    pub fn find(&self, region: SearchRegion, target: &Target) -> EngineResult<String> {
        self.resolve(Capability::Find(target.kind))?
            .find(region, target)
    }

    pub fn read_text(
        &self,
        region: SearchRegion,
        color: &str,
        similarity: f64,
    ) -> EngineResult<Option<String>> {
        self.resolve(Capability::ReadText)?
            .read_text(region, color, similarity)
    }
}
