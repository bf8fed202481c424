// ── Application intents ───────────────────────────────────────────────────────
//
// A single `App` is created on startup and owned by the window for its whole
// lifetime.  Each public method is one user intent; all of them run on the UI
// thread and none of them can fail past this layer: errors are reported
// through the shell and turned into a "did not happen" outcome.

use tracing::{info, warn};

use crate::{
    document::{DocumentState, APP_NAME},
    error::{NotepadError, Result},
    shell::{Choice, Disk, Shell},
};

/// Prompt shown before an action that would drop unsaved changes.
pub(crate) const UNSAVED_CHANGES_PROMPT: &str =
    "There are unsaved changes. Do you want to save them?";

/// Body of the Help → About box.
pub(crate) fn about_text() -> String {
    format!("{APP_NAME}\nVersion: {}", env!("CARGO_PKG_VERSION"))
}

/// Top-level application state.
pub(crate) struct App<S, D> {
    /// State of the currently open document.
    pub(crate) doc: DocumentState,
    shell: S,
    disk: D,
    /// The editing surface changed since `doc.text` was last synced from it.
    surface_stale: bool,
}

impl<S: Shell, D: Disk> App<S, D> {
    /// Create an `App` with an untitled, empty document.
    pub(crate) fn new(shell: S, disk: D) -> Self {
        Self {
            doc: DocumentState::new(),
            shell,
            disk,
            surface_stale: false,
        }
    }

    /// Draw the initial title.
    pub(crate) fn start(&mut self) {
        self.render_title();
    }

    /// The editing surface changed under the user's hands.
    ///
    /// Only flags the document; the text itself is pulled from the surface
    /// when it is about to be written.
    pub(crate) fn surface_changed(&mut self) {
        self.surface_stale = true;
        if self.doc.mark_modified() {
            self.render_title();
        }
    }

    /// Copy the surface into the document, in the file's own line ending.
    fn sync_surface(&mut self) {
        if !std::mem::take(&mut self.surface_stale) {
            return;
        }
        let text = self.doc.line_ending().restore(self.shell.current_text());
        self.doc.edit(text);
    }

    // ── File open ─────────────────────────────────────────────────────────────

    /// File → Open.  Guarded by the unsaved-changes prompt.
    pub(crate) fn open(&mut self) {
        self.request_destructive_action(|app| {
            let Some(path) = app.shell.pick_open_path() else {
                return;
            };
            match app.disk.read_all(&path) {
                Ok(bytes) => {
                    info!(path = %path.display(), bytes = bytes.len(), "opened file");
                    app.doc.load(path, &bytes);
                    app.shell.show_text(app.doc.text());
                    app.surface_stale = false;
                    app.render_title();
                }
                Err(source) => {
                    let err = NotepadError::Read { path, source };
                    warn!(error = %err, "open failed");
                    app.shell
                        .report_error(&format!("Error opening file:\n{}", err.reason()));
                }
            }
        });
    }

    // ── File save ─────────────────────────────────────────────────────────────

    /// File → Save.  Falls back to Save As for an untitled document.
    ///
    /// Returns `true` when the document ended up on disk.
    pub(crate) fn save(&mut self) -> bool {
        self.sync_surface();
        let shell = &mut self.shell;
        let outcome = self
            .doc
            .save(&self.disk, |suggested| shell.pick_save_path(suggested));
        self.finish_save(outcome)
    }

    /// File → Save As.
    pub(crate) fn save_as(&mut self) -> bool {
        self.sync_surface();
        let suggested = self.doc.suggested_name();
        let outcome = match self.shell.pick_save_path(&suggested) {
            Some(path) => self.doc.save_as(path, &self.disk),
            None => Err(NotepadError::Cancelled),
        };
        self.finish_save(outcome)
    }

    fn finish_save(&mut self, outcome: Result<()>) -> bool {
        let saved = match outcome {
            Ok(()) => {
                info!(path = %self.doc.display_name(), "saved file");
                true
            }
            Err(err) if err.is_cancelled() => false,
            Err(err) => {
                warn!(error = %err, "save failed");
                self.shell
                    .report_error(&format!("Error saving file:\n{}", err.reason()));
                false
            }
        };
        // A failed Save As may still have rebound the document.
        self.render_title();
        saved
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// File → Exit or the window's close button.
    ///
    /// Returns `true` when the shell may tear the window down.
    pub(crate) fn exit(&mut self) -> bool {
        let proceed = self.request_destructive_action(|_| ());
        if proceed {
            info!("exiting");
        }
        proceed
    }

    /// Run `proceed` unless the user wants to keep unsaved changes.
    ///
    /// | modified | answer | outcome |
    /// |---|---|---|
    /// | no | not asked | proceed |
    /// | yes | Save | proceed only if the save succeeds |
    /// | yes | Discard | proceed |
    /// | yes | Cancel | stop |
    ///
    /// Returns whether `proceed` ran.
    pub(crate) fn request_destructive_action(&mut self, proceed: impl FnOnce(&mut Self)) -> bool {
        if self.doc.is_modified() {
            let go_ahead = match self.shell.confirm_three_way(UNSAVED_CHANGES_PROMPT) {
                Choice::Save => self.save(),
                Choice::Discard => true,
                Choice::Cancel => false,
            };
            if !go_ahead {
                return false;
            }
        }
        proceed(self);
        true
    }

    fn render_title(&mut self) {
        let name = self.doc.display_name();
        self.shell.render_title(&name, self.doc.is_modified());
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        path::{Path, PathBuf},
    };

    use super::*;
    use crate::{
        document::{window_title, Phase},
        platform::to_crlf,
        shell::FsDisk,
    };

    /// Scripted shell: answers come from queues, calls are recorded.
    #[derive(Default)]
    struct FakeShell {
        open_paths: VecDeque<Option<PathBuf>>,
        save_paths: VecDeque<Option<PathBuf>>,
        choices: VecDeque<Choice>,
        prompts: Vec<String>,
        errors: Vec<String>,
        titles: Vec<String>,
        shown: Vec<String>,
        /// What the editing surface currently holds.
        surface: String,
        surface_reads: usize,
    }

    impl Shell for FakeShell {
        fn pick_open_path(&mut self) -> Option<PathBuf> {
            self.open_paths.pop_front().expect("unexpected open dialog")
        }

        fn pick_save_path(&mut self, _suggested_name: &str) -> Option<PathBuf> {
            self.save_paths.pop_front().expect("unexpected save dialog")
        }

        fn confirm_three_way(&mut self, message: &str) -> Choice {
            self.prompts.push(message.to_owned());
            self.choices.pop_front().expect("unexpected prompt")
        }

        fn report_error(&mut self, message: &str) {
            self.errors.push(message.to_owned());
        }

        fn render_title(&mut self, display_name: &str, modified: bool) {
            self.titles.push(window_title(display_name, modified));
        }

        fn show_text(&mut self, text: &str) {
            self.shown.push(text.to_owned());
            self.surface = to_crlf(text);
        }

        fn current_text(&mut self) -> String {
            self.surface_reads += 1;
            self.surface.clone()
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        app: App<FakeShell, FsDisk>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().expect("tempdir"),
                app: App::new(FakeShell::default(), FsDisk),
            }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        /// Simulate the user typing until the surface reads `text`.
        fn type_text(&mut self, text: &str) {
            self.app.shell.surface = text.to_owned();
            self.app.surface_changed();
        }

        fn last_title(&self) -> &str {
            self.app.shell.titles.last().map(String::as_str).unwrap_or("")
        }
    }

    #[test]
    fn start_renders_untitled() {
        let mut fx = Fixture::new();
        fx.app.start();
        assert_eq!(fx.last_title(), "Untitled - Simple Notepad");
    }

    #[test]
    fn typing_redraws_title_once() {
        let mut fx = Fixture::new();
        fx.type_text("a");
        fx.type_text("ab");
        assert_eq!(fx.app.shell.titles, vec!["*Untitled - Simple Notepad"]);
        assert_eq!(fx.app.shell.surface_reads, 0);
    }

    #[test]
    fn clean_document_proceeds_without_prompt() {
        let mut fx = Fixture::new();
        let mut ran = false;
        assert!(fx.app.request_destructive_action(|_| ran = true));
        assert!(ran);
        assert!(fx.app.shell.prompts.is_empty());
    }

    #[test]
    fn cancel_never_runs_the_action() {
        let mut fx = Fixture::new();
        fx.type_text("draft");
        fx.app.shell.choices.push_back(Choice::Cancel);

        let mut ran = false;
        assert!(!fx.app.request_destructive_action(|_| ran = true));
        assert!(!ran);
        assert_eq!(fx.app.doc.phase(), Phase::DirtyUnbound);
        assert_eq!(fx.app.shell.surface, "draft");
        assert_eq!(fx.app.shell.prompts, vec![UNSAVED_CHANGES_PROMPT]);
    }

    #[test]
    fn discard_runs_the_action_without_saving() {
        let mut fx = Fixture::new();
        fx.type_text("draft");
        fx.app.shell.choices.push_back(Choice::Discard);

        let mut ran = false;
        assert!(fx.app.request_destructive_action(|_| ran = true));
        assert!(ran);
        assert!(fx.app.doc.is_modified());
    }

    #[test]
    fn save_choice_with_cancelled_picker_stops() {
        let mut fx = Fixture::new();
        fx.type_text("draft");
        fx.app.shell.choices.push_back(Choice::Save);
        fx.app.shell.save_paths.push_back(None);

        assert!(!fx.app.exit());
        assert!(fx.app.doc.is_modified());
        assert!(fx.app.shell.errors.is_empty());
    }

    #[test]
    fn save_choice_saves_then_proceeds() {
        let mut fx = Fixture::new();
        let target = fx.path("keep");
        fx.type_text("draft");
        fx.app.shell.choices.push_back(Choice::Save);
        fx.app.shell.save_paths.push_back(Some(target));

        assert!(fx.app.exit());
        assert_eq!(std::fs::read_to_string(fx.path("keep.txt")).unwrap(), "draft");
        assert_eq!(fx.app.doc.phase(), Phase::CleanBound);
    }

    #[test]
    fn save_choice_with_write_error_stops_and_reports() {
        let mut fx = Fixture::new();
        let target = fx.path("no-such-dir").join("file.txt");
        fx.type_text("draft");
        fx.app.shell.choices.push_back(Choice::Save);
        fx.app.shell.save_paths.push_back(Some(target));

        assert!(!fx.app.exit());
        assert!(fx.app.doc.is_modified());
        assert_eq!(fx.app.shell.errors.len(), 1);
        assert!(fx.app.shell.errors[0].starts_with("Error saving file:\n"));
    }

    #[test]
    fn type_then_save_as_binds_with_txt_extension() {
        let mut fx = Fixture::new();
        fx.app.start();
        fx.type_text("my notes");
        assert_eq!(fx.app.doc.phase(), Phase::DirtyUnbound);

        let notes = fx.path("notes");
        fx.app.shell.save_paths.push_back(Some(notes));
        assert!(fx.app.save_as());

        let expected = fx.path("notes.txt");
        assert_eq!(fx.app.doc.phase(), Phase::CleanBound);
        assert_eq!(fx.app.doc.path(), Some(expected.as_path()));
        assert_eq!(std::fs::read_to_string(&expected).unwrap(), "my notes");
        assert_eq!(fx.last_title(), "notes.txt - Simple Notepad");
    }

    #[test]
    fn open_edit_save_round_trip() {
        let mut fx = Fixture::new();
        let a = fx.path("a.txt");
        std::fs::write(&a, "hello").unwrap();

        fx.app.shell.open_paths.push_back(Some(a.clone()));
        fx.app.open();
        assert_eq!(fx.app.doc.text(), "hello");
        assert!(!fx.app.doc.is_modified());
        assert_eq!(fx.app.shell.shown, vec!["hello"]);
        assert_eq!(fx.last_title(), "a.txt - Simple Notepad");

        fx.type_text("hello, world");
        assert!(fx.app.doc.is_modified());
        assert_eq!(fx.last_title(), "*a.txt - Simple Notepad");

        assert!(fx.app.save());
        assert!(!fx.app.doc.is_modified());
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "hello, world");
        assert_eq!(fx.last_title(), "a.txt - Simple Notepad");
    }

    #[test]
    fn open_failure_keeps_previous_document() {
        let mut fx = Fixture::new();
        fx.type_text("keep me");
        fx.app.shell.choices.push_back(Choice::Discard);
        let missing = fx.path("missing.txt");
        fx.app.shell.open_paths.push_back(Some(missing));

        fx.app.open();
        assert!(fx.app.shell.shown.is_empty());
        assert_eq!(fx.app.shell.surface, "keep me");
        assert_eq!(fx.app.doc.phase(), Phase::DirtyUnbound);
        assert_eq!(fx.app.shell.errors.len(), 1);
        assert!(fx.app.shell.errors[0].starts_with("Error opening file:\n"));
    }

    #[test]
    fn open_cancelled_picker_is_a_no_op() {
        let mut fx = Fixture::new();
        fx.app.shell.open_paths.push_back(None);
        fx.app.open();
        assert_eq!(fx.app.doc.phase(), Phase::CleanUnbound);
        assert!(fx.app.shell.shown.is_empty());
        assert!(fx.app.shell.errors.is_empty());
    }

    #[test]
    fn open_on_dirty_document_cancelled_never_shows_picker() {
        let mut fx = Fixture::new();
        fx.type_text("draft");
        fx.app.shell.choices.push_back(Choice::Cancel);
        // An empty open_paths queue would panic if the picker were shown.
        fx.app.open();
        assert_eq!(fx.app.shell.surface, "draft");
        assert!(fx.app.doc.is_modified());
    }

    #[test]
    fn surface_is_read_once_per_save() {
        let mut fx = Fixture::new();
        let a = fx.path("a.txt");
        std::fs::write(&a, "").unwrap();
        fx.app.shell.open_paths.push_back(Some(a.clone()));
        fx.app.open();

        for typed in ["h", "he", "hel", "hell", "hello"] {
            fx.type_text(typed);
        }
        assert_eq!(fx.app.shell.surface_reads, 0);

        assert!(fx.app.save());
        assert_eq!(fx.app.shell.surface_reads, 1);
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "hello");

        // Nothing typed since: the next save writes the synced text as is.
        assert!(fx.app.save());
        assert_eq!(fx.app.shell.surface_reads, 1);
    }

    #[test]
    fn lf_file_keeps_its_line_endings_through_an_edit() {
        let mut fx = Fixture::new();
        let a = fx.path("unix.txt");
        std::fs::write(&a, "line1\nline2\n").unwrap();
        fx.app.shell.open_paths.push_back(Some(a.clone()));
        fx.app.open();
        assert_eq!(fx.app.shell.surface, "line1\r\nline2\r\n");

        let typed = format!("{}x", fx.app.shell.surface);
        fx.type_text(&typed);
        assert!(fx.app.save());
        assert_eq!(std::fs::read(&a).unwrap(), b"line1\nline2\nx");
    }

    #[test]
    fn crlf_file_is_written_back_unchanged() {
        let mut fx = Fixture::new();
        let a = fx.path("dos.txt");
        std::fs::write(&a, "a\r\nb").unwrap();
        fx.app.shell.open_paths.push_back(Some(a.clone()));
        fx.app.open();

        fx.type_text("a\r\nb\r\nc");
        assert!(fx.app.save());
        assert_eq!(std::fs::read(&a).unwrap(), b"a\r\nb\r\nc");
    }

    #[test]
    fn failed_save_as_leaves_document_bound_to_new_target() {
        let mut fx = Fixture::new();
        let target = fx.path("missing-dir").join("out.txt");
        fx.type_text("draft");
        fx.app.shell.save_paths.push_back(Some(target.clone()));

        assert!(!fx.app.save_as());
        assert_eq!(fx.app.doc.path(), Some(target.as_path()));
        assert_eq!(fx.app.doc.phase(), Phase::DirtyBound);
        assert_eq!(fx.last_title(), "*out.txt - Simple Notepad");
    }

    #[test]
    fn save_on_bound_document_skips_picker() {
        let mut fx = Fixture::new();
        let a = fx.path("a.txt");
        std::fs::write(&a, "x").unwrap();
        fx.app.shell.open_paths.push_back(Some(a.clone()));
        fx.app.open();
        fx.type_text("y");

        // An empty save_paths queue would panic if the picker were shown.
        assert!(fx.app.save());
        assert_eq!(std::fs::read_to_string(Path::new(&a)).unwrap(), "y");
    }

    #[test]
    fn exit_on_clean_document_is_immediate() {
        let mut fx = Fixture::new();
        assert!(fx.app.exit());
        assert!(fx.app.shell.prompts.is_empty());
    }

    #[test]
    fn about_text_names_the_product() {
        assert!(about_text().starts_with("Simple Notepad\nVersion: "));
    }
}
