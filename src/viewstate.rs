use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use tracing::{error, info, warn};

use crate::error::LoadError;
use crate::fileio::{FileIO, LoadResult};
use crate::progress::Progress;
use crate::table::tableview::TableView;
use crate::transaction::history::History;
use crate::ui::canvas::Canvas;
use crate::ui::style::Style;

/// Result from a background operation
pub enum BackgroundResult {
    Loaded {
        path: PathBuf,
        result: Result<LoadResult, LoadError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
}

/// Line shown under the status bar until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: MessageKind::Info }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: MessageKind::Warning }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: MessageKind::Error }
    }
}

/// What finishing a background load did
#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Installed { path: PathBuf },
    Failed,
}

pub struct ViewState {
    pub view: TableView,
    /// Scroll position of the diff pane
    pub diff_scroll: usize,
    pub show_diff: bool,
    pub style: Style,
    pub canvas: Canvas,
    pub progress: Option<(String, Progress)>,
    // Background task handling
    pub(crate) bg_receiver: Option<Receiver<BackgroundResult>>,
    pub(crate) bg_handle: Option<JoinHandle<()>>,

    pub message: Option<StatusMessage>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            view: TableView::new(),
            diff_scroll: 0,
            show_diff: false,
            style: Style::new(),
            canvas: Canvas::new(),
            progress: None,
            bg_receiver: None,
            bg_handle: None,
            message: None,
        }
    }

    /// Start a progress indicator for a long-running operation
    pub fn start_progress(&mut self, operation: &str, total: usize) -> Progress {
        let progress = Progress::new(total);
        self.progress = Some((operation.to_string(), progress.clone()));
        progress
    }

    pub fn clear_progress(&mut self) {
        self.progress = None;
    }

    pub fn is_loading(&self) -> bool {
        self.bg_receiver.is_some()
    }

    pub fn set_message(&mut self, message: StatusMessage) {
        self.message = Some(message);
    }

    /// Parse `path` on a worker thread. A load already in flight is
    /// cancelled and its result discarded.
    pub fn start_load(&mut self, path: PathBuf) {
        self.cancel_load();

        let progress = self.start_progress("Loading", 0);
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();

        let handle = thread::spawn(move || {
            let result = FileIO::new(worker_path.clone()).load_table(&progress);
            // The receiver is gone when the load was superseded
            let _ = tx.send(BackgroundResult::Loaded {
                path: worker_path,
                result,
            });
        });

        info!(path = %path.display(), "load started");
        self.bg_receiver = Some(rx);
        self.bg_handle = Some(handle);
    }

    pub fn cancel_load(&mut self) {
        if let Some((_, progress)) = &self.progress {
            progress.cancel();
        }
        self.bg_receiver = None;
        self.bg_handle = None;
        self.clear_progress();
    }

    /// Check for and handle completed background operations
    pub fn poll_background_result(&mut self, history: &mut History) -> Option<LoadOutcome> {
        let receiver = self.bg_receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.bg_receiver = None;
                if let Some(handle) = self.bg_handle.take() {
                    let _ = handle.join();
                }
                self.clear_progress();
                Some(self.handle_background_result(result, history))
            }
            Err(mpsc::TryRecvError::Empty) => {
                // Still working, progress is updated by the background thread
                None
            }
            Err(mpsc::TryRecvError::Disconnected) => {
                // Thread died unexpectedly
                self.bg_receiver = None;
                self.bg_handle = None;
                self.clear_progress();
                error!("loader thread exited without a result");
                self.set_message(StatusMessage::error("Load failed"));
                Some(LoadOutcome::Failed)
            }
        }
    }

    /// Install a finished load. Failures leave the history untouched.
    pub fn handle_background_result(&mut self, result: BackgroundResult, history: &mut History) -> LoadOutcome {
        match result {
            BackgroundResult::Loaded { path, result } => match result {
                Ok(LoadResult { table, warnings }) => {
                    let rows = table.row_count();
                    let cols = table.col_count();
                    history.load(table);
                    self.view.reset();
                    self.diff_scroll = 0;
                    self.show_diff = false;

                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    let message = if warnings.is_empty() {
                        StatusMessage::info(format!("Loaded {} rows, {} columns from {}", rows, cols, name))
                    } else {
                        for w in &warnings {
                            warn!(path = %path.display(), "{}", w);
                        }
                        StatusMessage::warning(format!("Loaded {} rows from {}: {}", rows, name, warnings.join("; ")))
                    };
                    self.set_message(message);
                    LoadOutcome::Installed { path }
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "load failed");
                    self.set_message(StatusMessage::error(format!("Load failed: {}", e)));
                    LoadOutcome::Failed
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{Duration, Instant};

    fn wait_for_load(state: &mut ViewState, history: &mut History) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = state.poll_background_result(history) {
                return outcome;
            }
            assert!(Instant::now() < deadline, "load did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_background_load_installs_table() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        write!(file, "Tags,Address\nT1,5\nT2,6\n").unwrap();

        let mut state = ViewState::new();
        let mut history = History::new();
        state.view.cursor_row = 7;
        state.start_load(file.path().to_path_buf());
        assert!(state.is_loading());

        let outcome = wait_for_load(&mut state, &mut history);
        assert_eq!(outcome, LoadOutcome::Installed { path: file.path().to_path_buf() });
        assert!(!state.is_loading());
        assert!(state.progress.is_none());
        assert_eq!(history.current().row_count(), 2);
        assert_eq!(history.selected(), Some("Tags"));
        assert_eq!(state.view.cursor_row, 0);
        assert_eq!(state.message.as_ref().map(|m| m.kind), Some(MessageKind::Info));
    }

    #[test]
    fn test_failed_load_keeps_current_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = ViewState::new();
        let mut history = History::new();

        state.start_load(dir.path().join("missing.csv"));
        assert_eq!(wait_for_load(&mut state, &mut history), LoadOutcome::Failed);
        assert!(!history.is_loaded());
        let message = state.message.unwrap();
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.starts_with("Load failed"));
    }

    #[test]
    fn test_cancel_load() {
        let mut state = ViewState::new();
        let progress = state.start_progress("Loading", 0);
        state.cancel_load();
        assert!(progress.is_cancelled());
        assert!(state.progress.is_none());
        assert!(!state.is_loading());
    }
}
