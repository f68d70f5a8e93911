//! Screen capture, pixel colors and a color-matching finder.

use crate::{PlatformError, PlatformResult};
use seek_core::{codec, Capability, EngineResult, Finder, SearchRegion, Target, TargetKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Largest possible [`Color::difference`].
pub const MAX_DIFFERENCE: u32 = 3 * 255;

/// RGB color value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create color from hex string (e.g., "#FF0000" or "FF0000").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self { r, g, b })
    }

    /// Convert to hex string (e.g., "#FF0000").
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Sum of absolute per-channel differences.
    pub fn difference(&self, other: &Color) -> u32 {
        let dr = (self.r as i32 - other.r as i32).unsigned_abs();
        let dg = (self.g as i32 - other.g as i32).unsigned_abs();
        let db = (self.b as i32 - other.b as i32).unsigned_abs();
        dr + dg + db
    }

    pub fn matches(&self, other: &Color, tolerance: u32) -> bool {
        self.difference(other) <= tolerance
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Width and height of a region in pixels, or `None` if it is empty or too
/// large to address.
fn dimensions(region: SearchRegion) -> Option<(usize, usize)> {
    let width = i64::from(region.x2) - i64::from(region.x1) + 1;
    let height = i64::from(region.y2) - i64::from(region.y1) + 1;
    if width <= 0 || height <= 0 || width > i64::from(i32::MAX) || height > i64::from(i32::MAX) {
        return None;
    }
    Some((width as usize, height as usize))
}

/// Row-major pixels of a captured screen rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    region: SearchRegion,
    width: usize,
    pixels: Vec<Color>,
}

impl PixelBuffer {
    /// Wrap captured pixels. Fails unless there is exactly one pixel per
    /// point of `region`.
    pub fn new(region: SearchRegion, pixels: Vec<Color>) -> PlatformResult<Self> {
        let (width, height) = dimensions(region)
            .ok_or_else(|| PlatformError::CaptureFailed(format!("empty region {region:?}")))?;
        if pixels.len() != width * height {
            return Err(PlatformError::CaptureFailed(format!(
                "expected {} pixels for {width}x{height}, got {}",
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            region,
            width,
            pixels,
        })
    }

    /// Build a buffer by asking `color_at` for every screen coordinate.
    pub fn from_fn(
        region: SearchRegion,
        mut color_at: impl FnMut(i32, i32) -> Color,
    ) -> PlatformResult<Self> {
        let mut pixels = Vec::new();
        if dimensions(region).is_some() {
            for y in region.y1..=region.y2 {
                for x in region.x1..=region.x2 {
                    pixels.push(color_at(x, y));
                }
            }
        }
        Self::new(region, pixels)
    }

    pub fn region(&self) -> SearchRegion {
        self.region
    }

    /// Color at screen coordinate (x, y), `None` outside the captured region.
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if !self.region.contains(x, y) {
            return None;
        }
        let col = (i64::from(x) - i64::from(self.region.x1)) as usize;
        let row = (i64::from(y) - i64::from(self.region.y1)) as usize;
        self.pixels.get(row * self.width + col).copied()
    }
}

/// Captures screen rectangles.
pub trait PixelSource: Send + Sync {
    /// Grab every pixel of `region` at once. A region that cannot be read is
    /// an error, never an empty or partial buffer.
    fn capture(&self, region: SearchRegion) -> PlatformResult<PixelBuffer>;
}

/// The live desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScreenPixels;

impl PixelSource for ScreenPixels {
    fn capture(&self, region: SearchRegion) -> PlatformResult<PixelBuffer> {
        #[cfg(windows)]
        {
            windows_impl::capture_region(region)
        }
        #[cfg(not(windows))]
        {
            let _ = region;
            Err(PlatformError::NotImplemented("screen capture"))
        }
    }
}

/// Get the color of a pixel at the given screen coordinates.
pub fn get_pixel_color(x: i32, y: i32) -> Option<Color> {
    ScreenPixels
        .capture(SearchRegion::new(x, y, x, y))
        .ok()?
        .get(x, y)
}

/// Finder that captures a region and scans it row by row for the first
/// pixel matching a color target.
///
/// Handles only [`Capability::Find`] for [`TargetKind::Color`]; the target's
/// `pattern` is a hex color.
pub struct PixelFinder<S = ScreenPixels> {
    source: S,
    /// Distance between sampled pixels on both axes. Clamped to at least 1.
    stride: i32,
    /// Fixed tolerance. `None` derives it from the target's similarity.
    tolerance: Option<u32>,
}

impl PixelFinder<ScreenPixels> {
    pub fn screen() -> Self {
        Self::new(ScreenPixels)
    }
}

impl<S: PixelSource> PixelFinder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            stride: 1,
            tolerance: None,
        }
    }

    pub fn with_stride(mut self, stride: i32) -> Self {
        self.stride = stride.max(1);
        self
    }

    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    fn tolerance_for(&self, similarity: f64) -> u32 {
        self.tolerance.unwrap_or_else(|| {
            let slack = (1.0 - similarity.clamp(0.0, 1.0)) * MAX_DIFFERENCE as f64;
            slack.round() as u32
        })
    }
}

impl<S: PixelSource> Finder for PixelFinder<S> {
    fn name(&self) -> &str {
        "pixel"
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::Find(TargetKind::Color)
    }

    fn find(&self, region: SearchRegion, target: &Target) -> EngineResult<String> {
        let expected = Color::from_hex(&target.pattern)
            .ok_or_else(|| PlatformError::InvalidColor(target.pattern.clone()))?;
        let tolerance = self.tolerance_for(target.similarity);
        let buffer = self.source.capture(region)?;
        trace!(%expected, tolerance, ?region, "scanning capture");

        let stride = self.stride as usize;
        for y in (region.y1..=region.y2).step_by(stride) {
            for x in (region.x1..=region.x2).step_by(stride) {
                let Some(color) = buffer.get(x, y) else {
                    continue;
                };
                if color.matches(&expected, tolerance) {
                    debug!(x, y, %color, "pixel matched");
                    return Ok(codec::encode(0, x, y));
                }
            }
        }
        Ok(String::new())
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::{dimensions, Color, PixelBuffer};
    use crate::{PlatformError, PlatformResult};
    use seek_core::SearchRegion;
    use std::ptr;
    use windows_sys::Win32::Graphics::Gdi::{
        BitBlt, CreateCompatibleBitmap, CreateCompatibleDC, DeleteDC, DeleteObject, GetDC,
        GetDIBits, ReleaseDC, SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB,
        DIB_RGB_COLORS, RGBQUAD, SRCCOPY,
    };

    fn failed(step: &str) -> PlatformError {
        PlatformError::CaptureFailed(format!("{step} failed"))
    }

    /// Copy `region` of the desktop into a 32-bit top-down DIB.
    pub fn capture_region(region: SearchRegion) -> PlatformResult<PixelBuffer> {
        let (w, h) = dimensions(region)
            .ok_or_else(|| PlatformError::CaptureFailed(format!("empty region {region:?}")))?;
        let (width, height) = (w as i32, h as i32);

        unsafe {
            let hdc_screen = GetDC(ptr::null_mut()); // null = entire screen
            if hdc_screen.is_null() {
                return Err(failed("GetDC"));
            }

            let hdc_mem = CreateCompatibleDC(hdc_screen);
            if hdc_mem.is_null() {
                ReleaseDC(ptr::null_mut(), hdc_screen);
                return Err(failed("CreateCompatibleDC"));
            }

            let hbitmap = CreateCompatibleBitmap(hdc_screen, width, height);
            if hbitmap.is_null() {
                DeleteDC(hdc_mem);
                ReleaseDC(ptr::null_mut(), hdc_screen);
                return Err(failed("CreateCompatibleBitmap"));
            }

            let old_bitmap = SelectObject(hdc_mem, hbitmap);
            let copied = BitBlt(
                hdc_mem, 0, 0, width, height, hdc_screen, region.x1, region.y1, SRCCOPY,
            );
            // GetDIBits needs the bitmap deselected
            SelectObject(hdc_mem, old_bitmap);

            let mut bmi = BITMAPINFO {
                bmiHeader: BITMAPINFOHEADER {
                    biSize: std::mem::size_of::<BITMAPINFOHEADER>() as u32,
                    biWidth: width,
                    biHeight: -height, // Top-down
                    biPlanes: 1,
                    biBitCount: 32,
                    biCompression: BI_RGB,
                    biSizeImage: 0,
                    biXPelsPerMeter: 0,
                    biYPelsPerMeter: 0,
                    biClrUsed: 0,
                    biClrImportant: 0,
                },
                bmiColors: [RGBQUAD {
                    rgbBlue: 0,
                    rgbGreen: 0,
                    rgbRed: 0,
                    rgbReserved: 0,
                }],
            };

            let mut raw = vec![0u8; w * h * 4]; // BGRA
            let lines = if copied != 0 {
                GetDIBits(
                    hdc_mem,
                    hbitmap,
                    0,
                    height as u32,
                    raw.as_mut_ptr() as *mut _,
                    &mut bmi,
                    DIB_RGB_COLORS,
                )
            } else {
                0
            };

            DeleteObject(hbitmap);
            DeleteDC(hdc_mem);
            ReleaseDC(ptr::null_mut(), hdc_screen);

            if copied == 0 {
                return Err(failed("BitBlt"));
            }
            if lines != height {
                return Err(PlatformError::CaptureFailed(format!(
                    "GetDIBits copied {lines} of {height} lines"
                )));
            }

            let pixels = raw
                .chunks_exact(4)
                .map(|p| Color::new(p[2], p[1], p[0]))
                .collect();
            PixelBuffer::new(region, pixels)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seek_core::EngineError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Solid background with a single colored pixel.
    struct Canvas {
        background: Color,
        spot: (i32, i32, Color),
        captures: AtomicUsize,
    }

    impl PixelSource for Canvas {
        fn capture(&self, region: SearchRegion) -> PlatformResult<PixelBuffer> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            let (sx, sy, spot) = self.spot;
            PixelBuffer::from_fn(region, |x, y| {
                if (x, y) == (sx, sy) {
                    spot
                } else {
                    self.background
                }
            })
        }
    }

    /// A display that cannot be read.
    struct Unreadable;

    impl PixelSource for Unreadable {
        fn capture(&self, _region: SearchRegion) -> PlatformResult<PixelBuffer> {
            Err(PlatformError::CaptureFailed("BitBlt failed".into()))
        }
    }

    fn canvas() -> Canvas {
        Canvas {
            background: Color::new(0, 0, 0),
            spot: (12, 7, Color::new(250, 10, 10)),
            captures: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_color_from_hex() {
        assert_eq!(Color::from_hex("#FF8000"), Some(Color::new(255, 128, 0)));
        assert_eq!(Color::from_hex("00ff00"), Some(Color::new(0, 255, 0)));
        assert_eq!(Color::from_hex("FFF"), None);
        assert_eq!(Color::from_hex("GG0000"), None);
        assert_eq!(Color::new(1, 2, 171).to_string(), "#0102AB");
    }

    #[test]
    fn test_color_tolerance() {
        let red = Color::new(255, 0, 0);
        let near = Color::new(250, 3, 0);
        assert_eq!(red.difference(&near), 8);
        assert!(red.matches(&near, 8));
        assert!(!red.matches(&near, 7));
    }

    #[test]
    fn test_buffer_indexing() {
        let region = SearchRegion::new(10, 20, 12, 21);
        let buffer =
            PixelBuffer::from_fn(region, |x, y| Color::new(x as u8, y as u8, 0)).unwrap();
        assert_eq!(buffer.get(10, 20), Some(Color::new(10, 20, 0)));
        assert_eq!(buffer.get(12, 21), Some(Color::new(12, 21, 0)));
        assert_eq!(buffer.get(13, 21), None);
        assert_eq!(buffer.get(10, 19), None);
    }

    #[test]
    fn test_buffer_rejects_wrong_size() {
        let region = SearchRegion::new(0, 0, 1, 1);
        assert!(PixelBuffer::new(region, vec![Color::default(); 3]).is_err());
        assert!(PixelBuffer::new(SearchRegion::new(5, 0, 4, 0), Vec::new()).is_err());
    }

    #[test]
    fn test_finds_first_matching_pixel() {
        let finder = PixelFinder::new(canvas());
        let target = Target::color("FF0000", 0.95);
        let raw = finder.find(SearchRegion::new(0, 0, 20, 20), &target).unwrap();
        assert_eq!(raw, "0|12|7");
        assert!(codec::parse(&raw).is_hit());
    }

    #[test]
    fn test_large_region_captured_once() {
        let finder = PixelFinder::new(canvas());
        let target = Target::color("00FF00", 0.95);
        let raw = finder.find(SearchRegion::new(0, 0, 800, 600), &target).unwrap();
        assert_eq!(raw, "");
        assert_eq!(finder.source.captures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unreadable_screen_is_error_not_miss() {
        let finder = PixelFinder::new(Unreadable);
        let err = finder
            .find(SearchRegion::new(0, 0, 800, 600), &Target::color("FF0000", 0.9))
            .unwrap_err();
        assert!(matches!(err, EngineError::Backend(msg) if msg.contains("capture failed")));
    }

    #[test]
    fn test_strict_tolerance_misses() {
        let finder = PixelFinder::new(canvas()).with_tolerance(5);
        let target = Target::color("FF0000", 0.0);
        let raw = finder.find(SearchRegion::new(0, 0, 20, 20), &target).unwrap();
        assert_eq!(raw, "");
    }

    #[test]
    fn test_stride_skips_pixels() {
        let finder = PixelFinder::new(canvas()).with_stride(5);
        let target = Target::color("FF0000", 0.95);
        // 12 is not on the 0, 5, 10, 15, 20 grid
        let raw = finder.find(SearchRegion::new(0, 0, 20, 20), &target).unwrap();
        assert_eq!(raw, "");
    }

    #[test]
    fn test_similarity_drives_tolerance() {
        let finder = PixelFinder::new(canvas());
        assert_eq!(finder.tolerance_for(1.0), 0);
        assert_eq!(finder.tolerance_for(0.0), MAX_DIFFERENCE);
        assert_eq!(finder.with_tolerance(3).tolerance_for(0.0), 3);
    }

    #[test]
    fn test_invalid_color_is_backend_error() {
        let finder = PixelFinder::new(canvas());
        let err = finder
            .find(SearchRegion::new(0, 0, 1, 1), &Target::color("red", 0.9))
            .unwrap_err();
        assert!(matches!(err, EngineError::Backend(_)));
        assert_eq!(finder.source.captures.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_only_color_capability() {
        let finder = PixelFinder::new(canvas());
        assert!(finder.supports(Capability::Find(TargetKind::Color)));
        assert!(!finder.supports(Capability::Find(TargetKind::Image)));
        assert!(!finder.supports(Capability::ReadText));
    }
}
