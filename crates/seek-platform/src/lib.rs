//! seek-platform: platform-specific I/O boundary for seek.
//!
//! This crate provides the implementations of the `seek-core` backend traits:
//! - Input injection (mouse simulation) via `enigo`
//! - Cursor shape reading (Windows cursor handle)
//! - Screen capture, pixel colors and a color-matching finder
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `injector` - Input injection (shared implementation using enigo)
//! - `cursor` - Live cursor shape
//! - `pixel` - Pixel color reading, `PixelFinder`

mod cursor;
mod error;
mod injector;
mod pixel;

pub use cursor::SystemCursor;
pub use error::{PlatformError, PlatformResult};
pub use injector::{EnigoInput, NoopInput};
pub use pixel::{
    get_pixel_color, Color, PixelBuffer, PixelFinder, PixelSource, ScreenPixels, MAX_DIFFERENCE,
};
