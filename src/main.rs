// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that tracing output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// Off Windows only the tests drive the document core.
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod document;
mod error;
mod platform;
mod settings;
mod shell;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string.
const LOG_ENV: &str = "SIMPLE_NOTEPAD_LOG";

fn main() {
    setup_tracing();

    let settings = settings::Settings::load_or_default();

    if let Err(e) = platform::run(settings) {
        tracing::error!(error = %e, "startup failed");
        platform::show_fatal_error(&e.to_string());
        std::process::exit(1);
    }
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("simple_notepad=info"));

    // A second initialisation can only happen in tests; ignore it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
