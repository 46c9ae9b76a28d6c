//! Selection and navigation controller
//!
//! Owns the front-end state machine:
//!
//! ```text
//! Idle --select--> Confirming --start--> Running --finished--> Idle
//!   ^                  |                    |
//!   +-----cancel-------+      cancel sets the run's token
//! ```
//!
//! All worker output reaches the controller through [`Controller::poll`],
//! which runs on the foreground thread. User-facing messages are queued as
//! [`Dialog`]s and shown one at a time by the front-end.

use crate::config::Config;
use crate::convert::Converter;
use crate::error::Error;
use crate::selection::InputSelection;
use crate::worker::{self, ConversionProgress, RunHandle, RunOutcome, RunSummary, WorkerEvent};
use rust_i18n::t;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Blocking folder/file pickers
pub trait SelectionDialog {
    /// Ask for one folder. `None` when the dialog is dismissed.
    fn pick_folder(&self) -> Option<PathBuf>;

    /// Ask for documents with the given extension. `None` when dismissed.
    fn pick_files(&self, extension: &str) -> Option<Vec<PathBuf>>;
}

/// Native dialogs provided by the desktop
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDialog;

impl SelectionDialog for NativeDialog {
    fn pick_folder(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title(t!("dialog_pick_folder_title"))
            .pick_folder()
    }

    fn pick_files(&self, extension: &str) -> Option<Vec<PathBuf>> {
        rfd::FileDialog::new()
            .set_title(t!("dialog_pick_files_title"))
            .add_filter(t!("dialog_word_files"), &[extension])
            .pick_files()
    }
}

/// Severity of a modal message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Error,
    Warning,
    Success,
    Info,
}

/// A modal message waiting to be acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub title: String,
    pub message: String,
}

impl Dialog {
    fn new(kind: DialogKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Front-end state
#[derive(Debug, Default)]
pub enum ControllerState {
    /// Initial screen
    #[default]
    Idle,
    /// Selection shown, waiting for Start
    Confirming { selection: InputSelection },
    /// A worker is converting the selection
    Running {
        selection: InputSelection,
        run: RunHandle,
        progress: ConversionProgress,
    },
}

/// Mediates between user input and the conversion worker
pub struct Controller {
    config: Config,
    converter: Arc<dyn Converter>,
    state: ControllerState,
    dialogs: VecDeque<Dialog>,
    last_summary: Option<RunSummary>,
}

impl Controller {
    pub fn new(config: Config, converter: Arc<dyn Converter>) -> Self {
        Self {
            config,
            converter,
            state: ControllerState::Idle,
            dialogs: VecDeque::new(),
            last_summary: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ControllerState::Idle)
    }

    /// Whether a worker is still converting
    pub fn is_running(&self) -> bool {
        matches!(&self.state, ControllerState::Running { run, .. } if run.is_alive())
    }

    /// Selection being confirmed or converted
    pub fn selection(&self) -> Option<&InputSelection> {
        match &self.state {
            ControllerState::Idle => None,
            ControllerState::Confirming { selection } => Some(selection),
            ControllerState::Running { selection, .. } => Some(selection),
        }
    }

    /// Progress of the current run; `None` before Start
    pub fn progress(&self) -> Option<ConversionProgress> {
        match &self.state {
            ControllerState::Running { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    /// Whether cancellation was requested for the current run
    pub fn cancel_requested(&self) -> bool {
        matches!(&self.state, ControllerState::Running { run, .. } if run.token().is_cancelled())
    }

    /// Tallies of the most recent finished run
    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    /// Dialog to show now
    pub fn current_dialog(&self) -> Option<&Dialog> {
        self.dialogs.front()
    }

    pub fn pending_dialogs(&self) -> usize {
        self.dialogs.len()
    }

    /// Acknowledge the dialog on screen
    pub fn dismiss_dialog(&mut self) -> Option<Dialog> {
        self.dialogs.pop_front()
    }

    /// Pick a folder. Returns true when the confirmation screen was entered.
    pub fn select_folder(&mut self, dialog: &dyn SelectionDialog) -> bool {
        if !self.is_idle() {
            return false;
        }
        match dialog.pick_folder() {
            Some(folder) => {
                info!(folder = %folder.display(), "Folder selected");
                self.confirm(InputSelection::Folder(folder));
                true
            }
            None => {
                debug!("Folder dialog dismissed");
                false
            }
        }
    }

    /// Pick documents. Returns true when the confirmation screen was entered.
    pub fn select_files(&mut self, dialog: &dyn SelectionDialog) -> bool {
        if !self.is_idle() {
            return false;
        }
        match dialog.pick_files(&self.config.extension) {
            Some(files) if !files.is_empty() => {
                info!(count = files.len(), "Files selected");
                self.confirm(InputSelection::FileSet(files));
                true
            }
            _ => {
                debug!("File dialog dismissed");
                false
            }
        }
    }

    /// Use a typed folder or document path
    pub fn select_path(&mut self, text: &str) -> bool {
        if !self.is_idle() {
            return false;
        }
        if text.trim().is_empty() {
            return false;
        }
        match InputSelection::from_typed_path(text) {
            Ok(selection) => {
                info!(selection = %selection.describe(), "Path entered");
                self.confirm(selection);
                true
            }
            Err(e) => {
                warn!(error = %e, "Typed path rejected");
                self.push_error(&e);
                false
            }
        }
    }

    fn confirm(&mut self, selection: InputSelection) {
        self.state = ControllerState::Confirming { selection };
    }

    /// Start converting the confirmed selection.
    ///
    /// An empty selection surfaces a "no documents" error and no worker is
    /// started. Returns true when a worker was spawned.
    pub fn start_conversion(&mut self) -> bool {
        let selection = match &self.state {
            ControllerState::Confirming { selection } => selection.clone(),
            ControllerState::Running { run, .. } if run.is_alive() => {
                debug!("Start ignored, a run is already active");
                return false;
            }
            ControllerState::Running { selection, .. } => selection.clone(),
            ControllerState::Idle => return false,
        };

        match worker::start_conversion(&selection, &self.config, self.converter.clone()) {
            Ok(run) => {
                let progress = ConversionProgress::new(run.total());
                self.state = ControllerState::Running {
                    selection,
                    run,
                    progress,
                };
                true
            }
            Err(e) => {
                warn!(error = %e, "Run not started");
                self.push_error(&e);
                false
            }
        }
    }

    /// Cancel button.
    ///
    /// With a live worker this only sets the run's token; the worker stops
    /// before its next document. Without one, go back to the initial screen.
    pub fn cancel(&mut self) {
        self.poll();
        match &self.state {
            ControllerState::Running { run, .. } if run.is_alive() => {
                info!("Cancellation requested");
                run.cancel();
            }
            ControllerState::Idle => {}
            _ => {
                debug!("Cancel while idle, returning to initial screen");
                self.go_idle();
            }
        }
    }

    /// Apply every event the worker has sent so far.
    ///
    /// Returns true when anything changed.
    pub fn poll(&mut self) -> bool {
        let events = match &self.state {
            ControllerState::Running { run, .. } => run.drain(),
            _ => return false,
        };
        let changed = !events.is_empty();

        for event in events {
            self.apply(event);
        }
        changed
    }

    fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Started { total } => {
                if let ControllerState::Running { progress, .. } = &mut self.state {
                    *progress = ConversionProgress::new(total);
                }
            }
            WorkerEvent::Progress(update) => {
                if let ControllerState::Running { progress, .. } = &mut self.state {
                    *progress = update;
                }
            }
            WorkerEvent::FileFailed { path, error } => {
                let file = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                self.dialogs.push_back(Dialog::new(
                    DialogKind::Error,
                    t!("dialog_error_title"),
                    t!("file_failed", file = file, error = error.to_string()),
                ));
            }
            WorkerEvent::Finished { outcome, summary } => {
                self.finish(outcome, summary);
            }
        }
    }

    fn finish(&mut self, outcome: RunOutcome, summary: RunSummary) {
        let dialog = match outcome {
            RunOutcome::Completed => Dialog::new(
                DialogKind::Success,
                t!("dialog_success_title"),
                t!(
                    "run_completed",
                    converted = summary.converted,
                    total = summary.total
                ),
            ),
            RunOutcome::Cancelled => Dialog::new(
                DialogKind::Warning,
                t!("dialog_cancelled_title"),
                t!("run_cancelled"),
            ),
            RunOutcome::NoInputFound => Dialog::new(
                DialogKind::Error,
                t!("dialog_error_title"),
                t!("no_input_found", extension = self.config.extension.as_str()),
            ),
        };
        self.dialogs.push_back(dialog);
        self.last_summary = Some(summary);
        self.go_idle();
    }

    /// Drop the selection and any finished run, back to the initial screen
    fn go_idle(&mut self) {
        if let ControllerState::Running { mut run, .. } = std::mem::take(&mut self.state)
            && let Err(e) = run.join()
        {
            error!(error = %e, "Worker ended abnormally");
        }
    }

    fn push_error(&mut self, err: &Error) {
        let message = match err {
            Error::NoInputFound { extension, .. } => {
                t!("no_input_found", extension = extension.as_str()).to_string()
            }
            Error::InputNotFound { path } => {
                t!("input_not_found", path = path.display().to_string()).to_string()
            }
            Error::OutputCollision {
                first,
                second,
                output,
            } => t!(
                "output_collision",
                first = first.display().to_string(),
                second = second.display().to_string(),
                output = output.display().to_string()
            )
            .to_string(),
            other => other.to_string(),
        };
        self.dialogs.push_back(Dialog::new(
            DialogKind::Error,
            t!("dialog_error_title"),
            message,
        ));
    }

    /// Cancel any live run and wait for its worker
    pub fn shutdown(&mut self) {
        if let ControllerState::Running { run, .. } = &self.state {
            run.cancel();
        }
        self.go_idle();
    }
}
