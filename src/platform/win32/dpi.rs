#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    UI::HiDpi::{
        GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    },
};

/// Settings store sizes at this DPI.
pub(crate) const BASE_DPI: u32 = 96;

/// Scale a pixel value defined at 96 DPI to `dpi`.
pub(crate) fn scale(px: i32, dpi: u32) -> i32 {
    clamp_i32(i64::from(px) * i64::from(dpi) / i64::from(BASE_DPI))
}

/// Inverse of [`scale`]: device pixels back to 96-DPI pixels.
pub(crate) fn unscale(px: i32, dpi: u32) -> i32 {
    clamp_i32(i64::from(px) * i64::from(BASE_DPI) / i64::from(dpi.max(1)))
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// Return the DPI for `hwnd`. Falls back to BASE_DPI (96) on failure.
pub(crate) fn for_window(hwnd: HWND) -> u32 {
    // SAFETY: hwnd is a valid window handle provided by the caller.
    match unsafe { GetDpiForWindow(hwnd) } {
        0 => BASE_DPI,
        v => v,
    }
}

/// Return the primary-monitor system DPI. Used before window creation.
pub(crate) fn system() -> u32 {
    // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
    match unsafe { GetDpiForSystem() } {
        0 => BASE_DPI,
        v => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_follows_dpi() {
        assert_eq!(scale(100, 96), 100);
        assert_eq!(scale(100, 144), 150);
        assert_eq!(unscale(150, 144), 100);
        assert_eq!(unscale(100, 0), 9600);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(scale(2_000_000_000, 144), i32::MAX);
        assert_eq!(scale(i32::MIN, 192), i32::MIN);
        assert_eq!(unscale(i32::MAX, 1), i32::MAX);
    }
}
