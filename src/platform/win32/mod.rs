// ── Win32 platform implementation ─────────────────────────────────────────────
//
// The only module in the codebase where `unsafe` code is permitted.  Every
// `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub(crate) mod dialogs; // common open/save dialogs, message boxes
pub(crate) mod shell; // `Shell` implementation over the main window
pub(crate) mod window; // main window, WndProc, message loop

pub(crate) mod dpi; // per-monitor DPI v2 helpers

/// Encode `s` as a null-terminated UTF-16 string.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
