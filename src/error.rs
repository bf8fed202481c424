// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations return `error::Result<T>`.  Nothing in the document
// lifecycle is fatal: I/O failures surface as user-facing messages and
// `Cancelled` is a normal negative outcome.

use std::path::PathBuf;

use thiserror::Error;

/// Every error that Simple Notepad can produce.
#[derive(Debug, Error)]
pub(crate) enum NotepadError {
    /// Reading a document from disk failed.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a document to disk failed.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The user dismissed a file picker or a confirmation prompt.
    #[error("cancelled by user")]
    Cancelled,

    /// The settings file exists but is not valid JSON for `Settings`.
    #[error("invalid settings file {}: {source}", path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// This build has no windowing shell.
    #[cfg(not(windows))]
    #[error("Simple Notepad needs a Windows desktop (this build targets {0})")]
    UnsupportedPlatform(&'static str),

    /// A Win32 API call returned a failure code.
    #[cfg(windows)]
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },
}

impl NotepadError {
    /// `true` for the outcome that is never reported to the user.
    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The underlying reason, without the path prefix, for dialog text.
    pub(crate) fn reason(&self) -> String {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

// Convert a windows-crate error (HRESULT) directly into a NotepadError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for NotepadError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub(crate) type Result<T> = std::result::Result<T, NotepadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_error_mentions_path_and_cause() {
        let err = NotepadError::Write {
            path: PathBuf::from("notes.txt"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        };
        assert_eq!(err.to_string(), "cannot write notes.txt: access denied");
        assert_eq!(err.reason(), "access denied");
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancelled_is_flagged() {
        assert!(NotepadError::Cancelled.is_cancelled());
    }
}
