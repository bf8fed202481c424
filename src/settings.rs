// ── Settings persistence ──────────────────────────────────────────────────────
//
// Reads and writes `<config dir>/SimpleNotepad/settings.json`.
// No `unsafe` — pure safe Rust + serde_json.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{NotepadError, Result};

// ── Format version ────────────────────────────────────────────────────────────

const SETTINGS_VERSION: u32 = 1;

/// Largest window edge accepted from the file, in pixels.
const MAX_WINDOW_EDGE: i32 = 16_384;

// ── On-disk type ──────────────────────────────────────────────────────────────

/// Window and font preferences.
///
/// Every field carries a serde default so partial or older files still parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) version: u32,
    /// Outer window width in device pixels.
    pub(crate) window_width: i32,
    /// Outer window height in device pixels.
    pub(crate) window_height: i32,
    /// Face name of the (monospaced) editor font.
    pub(crate) font_face: String,
    /// Editor font height in pixels.
    pub(crate) font_size: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            window_width: 800,
            window_height: 600,
            font_face: "Consolas".to_owned(),
            font_size: 14,
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the settings file, or `None` when the platform has no
/// per-user config directory.
pub(crate) fn settings_path() -> Option<PathBuf> {
    let mut p = dirs::config_dir()?;
    p.push("SimpleNotepad");
    p.push("settings.json");
    Some(p)
}

impl Settings {
    /// Load from the default location, falling back to defaults on any error.
    pub(crate) fn load_or_default() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!(error = %e, "ignoring settings file");
                Self::default()
            }
        }
    }

    /// Parse `path`.
    ///
    /// `Ok(None)` when the file does not exist or was written by an
    /// unrecognised version.
    pub(crate) fn load_from(path: &Path) -> Result<Option<Self>> {
        let data = match fs::read(path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(NotepadError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let settings: Self =
            serde_json::from_slice(&data).map_err(|source| NotepadError::Settings {
                path: path.to_path_buf(),
                source,
            })?;
        if settings.version != SETTINGS_VERSION {
            debug!(version = settings.version, "unknown settings version");
            return Ok(None);
        }
        Ok(Some(settings.sanitized()))
    }

    /// Write to the default location.  The caller logs and ignores failures.
    pub(crate) fn save(&self) -> Result<()> {
        let path = settings_path().ok_or_else(|| NotepadError::Write {
            path: PathBuf::from("settings.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "no config directory"),
        })?;
        self.save_to(&path)
    }

    /// Write to `path`, creating the parent directory if needed.
    pub(crate) fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source| NotepadError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(|source| NotepadError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    /// Clamp values a hand-edited file could make unusable.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(200..=MAX_WINDOW_EDGE).contains(&self.window_width)
            || !(150..=MAX_WINDOW_EDGE).contains(&self.window_height)
        {
            self.window_width = defaults.window_width;
            self.window_height = defaults.window_height;
        }
        if !(6..=96).contains(&self.font_size) {
            self.font_size = defaults.font_size;
        }
        if self.font_face.trim().is_empty() {
            self.font_face = defaults.font_face;
        }
        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
