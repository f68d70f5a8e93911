//! Live cursor shape.

use crate::{PlatformError, PlatformResult};
use seek_core::{CursorShapeSource, CursorSignature, EngineResult};

/// Reads the OS cursor handle. Two positions showing the same cursor shape
/// report the same signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCursor;

impl SystemCursor {
    pub fn new() -> Self {
        Self
    }

    pub fn current(&self) -> PlatformResult<CursorSignature> {
        #[cfg(windows)]
        {
            windows_impl::current_cursor()
        }
        #[cfg(not(windows))]
        {
            Err(PlatformError::NotImplemented("cursor shape query"))
        }
    }
}

impl CursorShapeSource for SystemCursor {
    fn cursor_shape(&self) -> EngineResult<CursorSignature> {
        Ok(self.current()?)
    }
}

#[cfg(windows)]
mod windows_impl {
    use super::{PlatformError, PlatformResult};
    use seek_core::CursorSignature;
    use windows_sys::Win32::UI::WindowsAndMessaging::{GetCursorInfo, CURSORINFO};

    pub fn current_cursor() -> PlatformResult<CursorSignature> {
        unsafe {
            let mut info: CURSORINFO = std::mem::zeroed();
            info.cbSize = std::mem::size_of::<CURSORINFO>() as u32;
            if GetCursorInfo(&mut info) == 0 {
                return Err(PlatformError::CursorQueryFailed(
                    "GetCursorInfo returned FALSE".into(),
                ));
            }
            // hidden cursor yields a null handle, i.e. signature 0
            Ok(CursorSignature(info.hCursor as isize as i64))
        }
    }
}
