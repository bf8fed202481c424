// ── UI capabilities ───────────────────────────────────────────────────────────
//
// The document core never talks to the OS directly.  Everything that needs a
// dialog, a window or the filesystem goes through the two traits below, which
// the platform layer implements (and tests replace with in-memory fakes).
// No `unsafe` here.

use std::{fs, io, path::Path, path::PathBuf};

/// The user's answer to the three-way "save changes?" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Choice {
    /// Save first, then continue.
    Save,
    /// Continue and throw the changes away.
    Discard,
    /// Abort the action.  A dismissed dialog maps here too.
    Cancel,
}

/// Dialogs and rendering supplied by the windowing layer.
///
/// Every method is modal: it returns only once the user has answered.
pub(crate) trait Shell {
    /// Native "Open" dialog.  `None` when the user cancels.
    fn pick_open_path(&mut self) -> Option<PathBuf>;

    /// Native "Save As" dialog pre-filled with `suggested_name`.
    fn pick_save_path(&mut self, suggested_name: &str) -> Option<PathBuf>;

    /// Yes / No / Cancel prompt.
    fn confirm_three_way(&mut self, message: &str) -> Choice;

    /// Show a user-visible error message.
    fn report_error(&mut self, message: &str);

    /// Redraw the window title; see [`crate::document::window_title`].
    fn render_title(&mut self, display_name: &str, modified: bool);

    /// Replace the contents of the editing surface after a load.
    fn show_text(&mut self, text: &str);

    /// Read the editing surface back.  Line breaks come back as `\r\n`.
    fn current_text(&mut self) -> String;
}

/// Whole-file reads and writes.
pub(crate) trait Disk {
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`Disk`] over the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FsDisk;

impl Disk for FsDisk {
    fn read_all(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        fs::write(path, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_disk_writes_then_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        FsDisk.write_all(&path, b"hello").expect("write");
        assert_eq!(FsDisk.read_all(&path).expect("read"), b"hello");
    }

    #[test]
    fn fs_disk_write_truncates_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        FsDisk.write_all(&path, b"a much longer first version").expect("write");
        FsDisk.write_all(&path, b"short").expect("rewrite");
        assert_eq!(FsDisk.read_all(&path).expect("read"), b"short");
    }

    #[test]
    fn fs_disk_read_missing_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = FsDisk.read_all(&dir.path().join("missing.txt")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
