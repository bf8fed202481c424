// ── Shell capabilities over the main window ───────────────────────────────────
//
// Implements `crate::shell::Shell` with native dialogs, the title bar and the
// edit control.  Called from inside `App` intents, i.e. while the window state
// is mutably borrowed, so nothing here may route back into `App`.

#![allow(unsafe_code)]

use std::{cell::Cell, path::PathBuf, rc::Rc};

use tracing::warn;
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::HWND,
        UI::WindowsAndMessaging::{GetWindowTextLengthW, GetWindowTextW, SetWindowTextW},
    },
};

use super::{dialogs, wide};
use crate::{
    document::{window_title, APP_NAME},
    platform::to_crlf,
    shell::{Choice, Shell},
};

pub(crate) struct Win32Shell {
    /// Main window: owner of every dialog, holder of the title.
    hwnd: HWND,
    /// Multi-line edit control filling the client area.
    edit: HWND,
    /// Set while we replace the edit text ourselves, so the resulting
    /// `EN_CHANGE` is not mistaken for a user edit.
    muted: Rc<Cell<bool>>,
}

impl Win32Shell {
    pub(crate) fn new(hwnd: HWND, edit: HWND, muted: Rc<Cell<bool>>) -> Self {
        Self { hwnd, edit, muted }
    }
}

impl Shell for Win32Shell {
    fn pick_open_path(&mut self) -> Option<PathBuf> {
        dialogs::show_open_dialog(self.hwnd)
    }

    fn pick_save_path(&mut self, suggested_name: &str) -> Option<PathBuf> {
        dialogs::show_save_dialog(self.hwnd, suggested_name)
    }

    fn confirm_three_way(&mut self, message: &str) -> Choice {
        dialogs::confirm_three_way(self.hwnd, message, "Unsaved Changes")
    }

    fn report_error(&mut self, message: &str) {
        dialogs::show_error(self.hwnd, message, "Error");
    }

    fn render_title(&mut self, display_name: &str, modified: bool) {
        let title = wide(&window_title(display_name, modified));
        // SAFETY: hwnd is the live main window; `title` is null-terminated and
        // outlives the call.  Failure only leaves the old title in place.
        let _ = unsafe { SetWindowTextW(self.hwnd, PCWSTR(title.as_ptr())) };
    }

    fn show_text(&mut self, text: &str) {
        let text = wide(&to_crlf(text));
        self.muted.set(true);
        // SAFETY: edit is a live child of hwnd; `text` is null-terminated and
        // outlives the call.  EN_CHANGE is delivered synchronously while
        // `muted` is set.
        let result = unsafe { SetWindowTextW(self.edit, PCWSTR(text.as_ptr())) };
        self.muted.set(false);
        if let Err(e) = result {
            warn!(error = %e, "could not replace editor text");
            dialogs::show_error(self.hwnd, &display_failure_message(&e), APP_NAME);
        }
    }

    fn current_text(&mut self) -> String {
        // SAFETY: edit is a live window; the buffer is sized from the reported
        // length plus the terminator, and GetWindowTextW never writes past it.
        unsafe {
            let len = GetWindowTextLengthW(self.edit);
            if len <= 0 {
                return String::new();
            }
            let mut buf = vec![0u16; len as usize + 1];
            let copied = GetWindowTextW(self.edit, &mut buf).max(0) as usize;
            String::from_utf16_lossy(&buf[..copied])
        }
    }
}

/// Dialog text for a failed `SetWindowTextW` on the editor.
fn display_failure_message(error: &windows::core::Error) -> String {
    format!("Could not display the file:\n{}", error.message())
}

#[cfg(test)]
mod tests {
    use windows::Win32::Foundation::{E_ACCESSDENIED, E_OUTOFMEMORY};

    use super::*;

    #[test]
    fn display_failure_carries_the_system_reason() {
        let denied = windows::core::Error::from(E_ACCESSDENIED);
        let message = display_failure_message(&denied);
        assert!(message.starts_with("Could not display the file:\n"));
        assert!(!message.contains("too large"));
        assert_ne!(message, display_failure_message(&windows::core::Error::from(E_OUTOFMEMORY)));
    }
}
