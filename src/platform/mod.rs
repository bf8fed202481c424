// ── Platform abstraction layer ────────────────────────────────────────────────
//
// This module defines the interface the entry point uses to talk to the OS.
// No `unsafe` lives here; all Win32 FFI is confined to the `win32` sub-module
// and never leaks outward.

#[cfg(windows)]
pub(crate) mod win32;

#[cfg(windows)]
pub(crate) use win32::window::{run, show_fatal_error};

#[cfg(not(windows))]
use crate::{error::NotepadError, error::Result, settings::Settings};

/// No windowing shell exists for this target.
#[cfg(not(windows))]
pub(crate) fn run(_settings: Settings) -> Result<()> {
    Err(NotepadError::UnsupportedPlatform(std::env::consts::OS))
}

/// Without a desktop the message goes to stderr.
#[cfg(not(windows))]
pub(crate) fn show_fatal_error(message: &str) {
    eprintln!("simple-notepad: {message}");
}

/// Normalise every line break to `\r\n`, which the Win32 edit control needs
/// to display line breaks at all.
pub(crate) fn to_crlf(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 32);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lf_becomes_crlf() {
        assert_eq!(to_crlf("a\nb\n"), "a\r\nb\r\n");
    }

    #[test]
    fn crlf_is_left_alone() {
        assert_eq!(to_crlf("a\r\nb"), "a\r\nb");
    }

    #[test]
    fn lone_cr_becomes_crlf() {
        assert_eq!(to_crlf("a\rb\r"), "a\r\nb\r\n");
    }

    #[test]
    fn mixed_endings() {
        assert_eq!(to_crlf("1\n2\r\n3\r4"), "1\r\n2\r\n3\r\n4");
    }
}
