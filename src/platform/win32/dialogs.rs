// ── Common dialogs ─────────────────────────────────────────────────────────────
//
// Thin wrappers around the Win32 common-dialog and message-box APIs.  The file
// pickers return `Some(path)` on user confirmation and `None` on cancel or
// error.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::path::PathBuf;

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::HWND,
        UI::{
            Controls::Dialogs::{
                GetOpenFileNameW, GetSaveFileNameW, OFN_FILEMUSTEXIST, OFN_HIDEREADONLY,
                OFN_OVERWRITEPROMPT, OFN_PATHMUSTEXIST, OPENFILENAMEW,
            },
            WindowsAndMessaging::{
                MessageBoxW, IDNO, IDYES, MB_ICONERROR, MB_ICONINFORMATION, MB_ICONWARNING,
                MB_OK, MB_YESNOCANCEL, MESSAGEBOX_STYLE,
            },
        },
    },
};

use super::wide;
use crate::shell::Choice;

// ── Buffer size ───────────────────────────────────────────────────────────────

/// Maximum path length in `WCHAR`s, including the null terminator.
/// `MAX_PATH` (260) is too short for modern Windows paths; use 32 768 which
/// is the documented maximum for `\\?\` extended paths.
const PATH_BUF_LEN: usize = 32_768;

/// Null-separated display/pattern pairs ending with a double null.
const FILTER: &str = "Text Files (*.txt)\0*.txt\0All Files (*.*)\0*.*\0\0";

// ── Open dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Open" dialog.
pub(crate) fn show_open_dialog(hwnd_owner: HWND) -> Option<PathBuf> {
    let mut buf = vec![0u16; PATH_BUF_LEN];
    let filter: Vec<u16> = FILTER.encode_utf16().collect();

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: hwnd_owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        Flags: OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY,
        ..Default::default()
    };

    // SAFETY: `ofn` is fully initialised; `buf` and `filter` outlive this
    // call.  GetOpenFileNameW reads and writes only within the buffers we
    // provided.  The function is called on the UI thread (required for modal
    // dialogs).
    let ok = unsafe { GetOpenFileNameW(&mut ofn) };
    ok.as_bool().then(|| path_from_buf(&buf))
}

// ── Save dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Save As" dialog with `default_name` in the name field.
///
/// No default extension is set here; the document core appends `.txt`.
pub(crate) fn show_save_dialog(hwnd_owner: HWND, default_name: &str) -> Option<PathBuf> {
    let mut buf: Vec<u16> = default_name
        .encode_utf16()
        .take(PATH_BUF_LEN - 1)
        .chain(std::iter::repeat(0))
        .take(PATH_BUF_LEN)
        .collect();
    let filter: Vec<u16> = FILTER.encode_utf16().collect();

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: hwnd_owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        Flags: OFN_OVERWRITEPROMPT | OFN_PATHMUSTEXIST,
        ..Default::default()
    };

    // SAFETY: same invariants as show_open_dialog above.
    let ok = unsafe { GetSaveFileNameW(&mut ofn) };
    ok.as_bool().then(|| path_from_buf(&buf))
}

// ── Message boxes ─────────────────────────────────────────────────────────────

/// Yes / No / Cancel warning box.  Closing the box counts as Cancel.
pub(crate) fn confirm_three_way(hwnd_owner: HWND, message: &str, caption: &str) -> Choice {
    match message_box(hwnd_owner, message, caption, MB_YESNOCANCEL | MB_ICONWARNING) {
        r if r == IDYES.0 => Choice::Save,
        r if r == IDNO.0 => Choice::Discard,
        _ => Choice::Cancel,
    }
}

pub(crate) fn show_error(hwnd_owner: HWND, message: &str, caption: &str) {
    message_box(hwnd_owner, message, caption, MB_OK | MB_ICONERROR);
}

pub(crate) fn show_info(hwnd_owner: HWND, message: &str, caption: &str) {
    message_box(hwnd_owner, message, caption, MB_OK | MB_ICONINFORMATION);
}

/// Run a modal `MessageBoxW`; returns the raw button id.
fn message_box(hwnd_owner: HWND, message: &str, caption: &str, style: MESSAGEBOX_STYLE) -> i32 {
    let message = wide(message);
    let caption = wide(caption);
    // SAFETY: both buffers are valid null-terminated UTF-16 strings that stay
    // allocated for the duration of the call.  A null owner is allowed.
    unsafe {
        MessageBoxW(
            hwnd_owner,
            PCWSTR(message.as_ptr()),
            PCWSTR(caption.as_ptr()),
            style,
        )
    }
    .0
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Convert a null-terminated UTF-16 buffer to a `PathBuf`.
fn path_from_buf(buf: &[u16]) -> PathBuf {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    PathBuf::from(String::from_utf16_lossy(&buf[..len]))
}
