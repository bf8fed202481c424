// ── Document lifecycle ────────────────────────────────────────────────────────
//
// The single open document: its text, the file it is bound to, and whether it
// has unsaved changes.  Pure state plus whole-file I/O through `Disk`; dialogs
// are the caller's business (see `app.rs`).

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    error::{NotepadError, Result},
    shell::Disk,
};

/// Product name shown in the title bar and the About box.
pub(crate) const APP_NAME: &str = "Simple Notepad";

/// Extension appended by Save As when the chosen name has none.
pub(crate) const DEFAULT_EXTENSION: &str = "txt";

/// Display name of a document that has never been saved.
const UNTITLED: &str = "Untitled";

/// Where the document sits in the dirty × bound state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
    CleanUnbound,
    DirtyUnbound,
    CleanBound,
    DirtyBound,
}

/// The end-of-line convention the document is written back with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum LineEnding {
    /// Windows-style `\r\n`; also the choice for untitled buffers.
    #[default]
    Crlf,
    /// Unix-style `\n`.
    Lf,
    /// Old Mac-style `\r`.
    Cr,
}

impl LineEnding {
    /// The dominant line ending in `text`; `Crlf` when there is none.
    pub(crate) fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    crlf += 1;
                    i += 2;
                }
                b'\r' => {
                    cr += 1;
                    i += 1;
                }
                b'\n' => {
                    lf += 1;
                    i += 1;
                }
                _ => i += 1,
            }
        }
        if crlf >= lf && crlf >= cr {
            Self::Crlf
        } else if lf >= cr {
            Self::Lf
        } else {
            Self::Cr
        }
    }

    /// Turn the `\r\n` breaks of an editing surface back into this ending.
    pub(crate) fn restore(self, text: String) -> String {
        match self {
            Self::Crlf => text,
            Self::Lf => text.replace("\r\n", "\n"),
            Self::Cr => text.replace("\r\n", "\r"),
        }
    }
}

/// State of the one open document.
#[derive(Debug, Default)]
pub(crate) struct DocumentState {
    /// Current buffer contents.
    text: String,
    /// File last loaded from or saved to, or `None` for an untitled buffer.
    path: Option<PathBuf>,
    /// `true` when the buffer contains changes not yet saved to disk.
    modified: bool,
    /// Line ending detected at load time.
    eol: LineEnding,
}

impl DocumentState {
    /// A fresh, empty, untitled document.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn line_ending(&self) -> LineEnding {
        self.eol
    }

    pub(crate) fn phase(&self) -> Phase {
        match (self.modified, self.path.is_some()) {
            (false, false) => Phase::CleanUnbound,
            (true, false) => Phase::DirtyUnbound,
            (false, true) => Phase::CleanBound,
            (true, true) => Phase::DirtyBound,
        }
    }

    /// The bare filename component, or `"Untitled"` if no path is set.
    pub(crate) fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_owned())
    }

    /// Name pre-filled in the Save As dialog: the current file name, if any.
    pub(crate) fn suggested_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Flag the buffer as changed.
    ///
    /// Returns `true` only on the clean → dirty transition, so callers can
    /// redraw the title once instead of on every keystroke.
    pub(crate) fn mark_modified(&mut self) -> bool {
        if self.modified {
            return false;
        }
        self.modified = true;
        debug!(phase = ?self.phase(), "document modified");
        true
    }

    /// Replace the buffer with the editing surface's contents.
    pub(crate) fn edit(&mut self, text: String) -> bool {
        self.text = text;
        self.mark_modified()
    }

    /// Adopt freshly read file contents.  Never prompts.
    pub(crate) fn load(&mut self, path: PathBuf, bytes: &[u8]) {
        self.text = decode(bytes);
        self.eol = LineEnding::detect(&self.text);
        self.path = Some(path);
        self.modified = false;
        debug!(path = %self.display_name(), "document loaded");
    }

    /// Write to the bound path, or ask `pick_path` for one when untitled.
    ///
    /// A cancelled picker yields [`NotepadError::Cancelled`] and changes
    /// nothing.
    pub(crate) fn save(
        &mut self,
        disk: &impl Disk,
        pick_path: impl FnOnce(&str) -> Option<PathBuf>,
    ) -> Result<()> {
        match self.path.clone() {
            Some(path) => self.write_to(&path, disk),
            None => {
                let path = pick_path(&self.suggested_name()).ok_or(NotepadError::Cancelled)?;
                self.save_as(path, disk)
            }
        }
    }

    /// Bind to `path` (with `.txt` added if it has no extension) and write.
    ///
    /// The binding sticks even when the write fails.
    pub(crate) fn save_as(&mut self, path: PathBuf, disk: &impl Disk) -> Result<()> {
        let path = normalize_save_path(path);
        self.path = Some(path.clone());
        self.write_to(&path, disk)
    }

    fn write_to(&mut self, path: &Path, disk: &impl Disk) -> Result<()> {
        disk.write_all(path, self.text.as_bytes())
            .map_err(|source| NotepadError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        self.modified = false;
        debug!(path = %path.display(), "document saved");
        Ok(())
    }
}

/// Decode file bytes as UTF-8, replacing malformed sequences with U+FFFD.
pub(crate) fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Append `.txt` when the file name contains no `.` at all.
pub(crate) fn normalize_save_path(path: PathBuf) -> PathBuf {
    let has_dot = match path.file_name() {
        Some(name) => name.to_string_lossy().contains('.'),
        // "..", "/" and friends: nothing sensible to append to.
        None => return path,
    };
    if has_dot {
        return path;
    }
    let mut raw = OsString::from(path);
    raw.push(".");
    raw.push(DEFAULT_EXTENSION);
    PathBuf::from(raw)
}

/// Compute the title string for the main window.
///
/// | State | Title |
/// |---|---|
/// | Untitled, clean | `"Untitled - Simple Notepad"` |
/// | Untitled, dirty | `"*Untitled - Simple Notepad"` |
/// | Path set, dirty | `"*todo.txt - Simple Notepad"` |
pub(crate) fn window_title(display_name: &str, modified: bool) -> String {
    let dirty = if modified { "*" } else { "" };
    format!("{dirty}{display_name} - {APP_NAME}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
