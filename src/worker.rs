//! Cancellable batch conversion worker
//!
//! A run converts a resolved file list on one background thread. The
//! foreground side keeps a [`RunHandle`]: it can request cooperative
//! cancellation through the run's [`CancellationToken`] and drains
//! [`WorkerEvent`]s from the handle's channel on its own thread.
//!
//! Ordering guarantees of a run:
//! - documents are converted in list order, one at a time;
//! - cancellation is checked before each document and never interrupts a
//!   conversion already in flight;
//! - a failed document is reported and the run moves on;
//! - exactly one [`WorkerEvent::Finished`] is sent, and it is the last event.

use crate::config::Config;
use crate::convert::{ConversionError, Converter};
use crate::error::{Error, Result};
use crate::selection::InputSelection;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Once};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{Level, debug, error, info, span, warn};

/// Name of the background conversion thread
pub const WORKER_THREAD_NAME: &str = "docx-worker";

/// Log panics raised on the worker thread instead of printing them.
///
/// Converter panics are already caught and reported per document, so the
/// default hook would only write over the terminal UI. Panics on any other
/// thread still go to the hook that was installed before.
pub fn route_worker_panics_to_log() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if thread::current().name() == Some(WORKER_THREAD_NAME) {
                error!(panic = %info, "Converter panicked");
            } else {
                previous(info);
            }
        }));
    });
}

/// Per-run cancellation flag shared between the controller and the worker
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a cleared token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect before the next document.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Terminal classification of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The loop reached the end of the list
    Completed,
    /// Cancellation was observed before a document
    Cancelled,
    /// The selection resolved to no documents; no worker was started
    NoInputFound,
}

/// Determinate progress of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionProgress {
    pub current: usize,
    pub total: usize,
}

impl ConversionProgress {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Progress as a ratio in `0.0..=1.0`
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.current as f64 / self.total as f64).min(1.0)
        }
    }
}

/// Tallies of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub converted: usize,
    pub failed: usize,
    /// Documents never attempted because the run was cancelled or stopped
    pub not_attempted: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Converted: {}, Failed: {}, Not attempted: {}, Elapsed: {:.1}s",
            self.total,
            self.converted,
            self.failed,
            self.not_attempted,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Messages from the worker thread to the foreground thread
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// The run started with `total` documents
    Started { total: usize },
    /// The document at `progress.current - 1` was converted
    Progress(ConversionProgress),
    /// One document failed; the run continues
    FileFailed { path: PathBuf, error: ConversionError },
    /// The run is over; always the last event
    Finished {
        outcome: RunOutcome,
        summary: RunSummary,
    },
}

/// Knobs for a run
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerOptions {
    /// Stop after the first failed document
    pub fail_fast: bool,
}

impl From<&Config> for WorkerOptions {
    fn from(config: &Config) -> Self {
        Self {
            fail_fast: config.fail_fast,
        }
    }
}

/// Convert `files` in order, reporting through `events`.
///
/// Runs on the calling thread; [`start_conversion`] wraps it in a worker
/// thread. Returns the terminal outcome that was also sent as
/// [`WorkerEvent::Finished`].
pub fn run_batch(
    files: &[PathBuf],
    converter: &dyn Converter,
    token: &CancellationToken,
    options: WorkerOptions,
    events: &Sender<WorkerEvent>,
) -> RunOutcome {
    let _span = span!(Level::INFO, "conversion_run", converter = converter.name()).entered();
    let started_at = Instant::now();

    let mut progress = ConversionProgress::new(files.len());
    let mut summary = RunSummary {
        total: files.len(),
        ..RunSummary::default()
    };
    // Receiver gone means nobody is listening; the run still finishes.
    let emit = |event: WorkerEvent| {
        let _ = events.send(event);
    };

    info!(total = files.len(), "Starting conversion run");
    emit(WorkerEvent::Started { total: files.len() });

    let mut outcome = RunOutcome::Completed;
    for (index, file) in files.iter().enumerate() {
        if token.is_cancelled() {
            info!(index, "Cancellation observed, stopping run");
            outcome = RunOutcome::Cancelled;
            summary.not_attempted = files.len() - index;
            break;
        }

        debug!(file = %file.display(), "Converting");
        match convert_guarded(converter, file) {
            Ok(()) => {
                progress.current = index + 1;
                summary.converted += 1;
                info!(file = %file.display(), "Converted");
                emit(WorkerEvent::Progress(progress));
            }
            Err(error) => {
                summary.failed += 1;
                warn!(file = %file.display(), %error, "Conversion failed");
                emit(WorkerEvent::FileFailed {
                    path: file.clone(),
                    error,
                });
                if options.fail_fast {
                    summary.not_attempted = files.len() - index - 1;
                    break;
                }
            }
        }
    }

    summary.elapsed = started_at.elapsed();
    info!(?outcome, "{}", summary.summary());
    emit(WorkerEvent::Finished { outcome, summary });
    outcome
}

/// Call the converter, turning a panic into a per-file error
fn convert_guarded(converter: &dyn Converter, file: &Path) -> std::result::Result<(), ConversionError> {
    panic::catch_unwind(AssertUnwindSafe(|| converter.convert(file))).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(ConversionError::Panicked(message))
    })
}

/// Handle on a running (or finished) conversion run
#[derive(Debug)]
pub struct RunHandle {
    token: CancellationToken,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    total: usize,
}

impl RunHandle {
    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The run's cancellation token
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Number of documents in the run
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether the worker thread is still running
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Next pending event, if any (non-blocking)
    pub fn try_recv(&self) -> Option<WorkerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// All events currently queued, in send order
    pub fn drain(&self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Wait for the worker thread to exit
    pub fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| {
                error!("Conversion worker panicked");
                Error::WorkerPanicked
            })?;
        }
        Ok(())
    }
}

/// Resolve `selection` and spawn the worker thread for it.
///
/// An empty selection returns [`Error::NoInputFound`] without spawning
/// anything. Each call builds a fresh [`CancellationToken`].
pub fn start_conversion(
    selection: &InputSelection,
    config: &Config,
    converter: Arc<dyn Converter>,
) -> Result<RunHandle> {
    let files = selection.resolve(config)?;
    let total = files.len();
    let token = CancellationToken::new();
    let (tx, rx) = mpsc::channel();
    let options = WorkerOptions::from(config);

    let worker_token = token.clone();
    let handle = thread::Builder::new()
        .name(WORKER_THREAD_NAME.to_string())
        .spawn(move || {
            run_batch(&files, converter.as_ref(), &worker_token, options, &tx);
        })?;

    info!(total, selection = %selection.describe(), "Spawned conversion worker");

    Ok(RunHandle {
        token,
        events: rx,
        handle: Some(handle),
        total,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Converter recording every call, failing for chosen file names
    #[derive(Default)]
    pub(crate) struct RecordingConverter {
        pub calls: Mutex<Vec<PathBuf>>,
        pub failing: HashSet<String>,
        /// Cancel this token right after converting the named file
        pub cancel_after: Option<(String, CancellationToken)>,
    }

    impl RecordingConverter {
        pub fn failing(names: &[&str]) -> Self {
            Self {
                failing: names.iter().map(|n| n.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().to_string()
    }

    impl Converter for RecordingConverter {
        fn name(&self) -> &str {
            "recording"
        }

        fn convert(&self, source: &Path) -> std::result::Result<(), ConversionError> {
            self.calls.lock().unwrap().push(source.to_path_buf());
            let name = file_name(source);
            if let Some((ref after, ref token)) = self.cancel_after
                && *after == name
            {
                token.cancel();
            }
            if self.failing.contains(&name) {
                return Err(ConversionError::Failed {
                    tool: "recording".to_string(),
                    status: "1".to_string(),
                    stderr: format!("cannot open {}", name),
                });
            }
            Ok(())
        }
    }

    struct PanickingConverter;

    impl Converter for PanickingConverter {
        fn name(&self) -> &str {
            "panicking"
        }

        fn convert(&self, _source: &Path) -> std::result::Result<(), ConversionError> {
            panic!("engine exploded");
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn run(
        files: &[PathBuf],
        converter: &dyn Converter,
        token: &CancellationToken,
        options: WorkerOptions,
    ) -> (RunOutcome, Vec<WorkerEvent>) {
        let (tx, rx) = mpsc::channel();
        let outcome = run_batch(files, converter, token, options, &tx);
        drop(tx);
        (outcome, rx.iter().collect())
    }

    fn progress_values(events: &[WorkerEvent]) -> Vec<usize> {
        events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Progress(p) => Some(p.current),
                _ => None,
            })
            .collect()
    }

    fn finished(events: &[WorkerEvent]) -> (RunOutcome, RunSummary) {
        match events.last() {
            Some(WorkerEvent::Finished { outcome, summary }) => (*outcome, summary.clone()),
            other => panic!("last event should be Finished, got {:?}", other),
        }
    }

    #[test]
    fn test_token_starts_cleared() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
        assert!(!CancellationToken::new().is_cancelled());
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(ConversionProgress::new(0).ratio(), 0.0);
        let progress = ConversionProgress {
            current: 1,
            total: 4,
        };
        assert!((progress.ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_all_succeed_completes() {
        let files = paths(&["a.docx", "b.docx", "c.docx"]);
        let converter = RecordingConverter::default();
        let (outcome, events) = run(
            &files,
            &converter,
            &CancellationToken::new(),
            WorkerOptions::default(),
        );

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(events.first(), Some(&WorkerEvent::Started { total: 3 }));
        assert_eq!(progress_values(&events), vec![1, 2, 3]);
        assert_eq!(converter.calls(), files);

        let (finished_outcome, summary) = finished(&events);
        assert_eq!(finished_outcome, RunOutcome::Completed);
        assert_eq!(summary.converted, 3);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_cancelled_before_first_item() {
        let files = paths(&["a.docx", "b.docx"]);
        let converter = RecordingConverter::default();
        let token = CancellationToken::new();
        token.cancel();

        let (outcome, events) = run(&files, &converter, &token, WorkerOptions::default());
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert!(converter.calls().is_empty());
        assert!(progress_values(&events).is_empty());
        assert_eq!(finished(&events).1.not_attempted, 2);
    }

    #[test]
    fn test_cancel_between_items_skips_the_rest() {
        let files = paths(&["a.docx", "b.docx", "c.docx"]);
        let token = CancellationToken::new();
        let converter = RecordingConverter {
            cancel_after: Some(("a.docx".to_string(), token.clone())),
            ..RecordingConverter::default()
        };

        let (outcome, events) = run(&files, &converter, &token, WorkerOptions::default());
        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(converter.calls(), paths(&["a.docx"]));
        assert_eq!(progress_values(&events), vec![1]);

        let (_, summary) = finished(&events);
        assert_eq!(summary.converted, 1);
        assert_eq!(summary.not_attempted, 2);
    }

    #[test]
    fn test_failure_does_not_stop_the_batch() {
        let files = paths(&["a.docx", "b.docx", "c.docx"]);
        let converter = RecordingConverter::failing(&["b.docx"]);
        let (outcome, events) = run(
            &files,
            &converter,
            &CancellationToken::new(),
            WorkerOptions::default(),
        );

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(converter.calls(), files);
        assert_eq!(progress_values(&events), vec![1, 3]);
        assert!(events.iter().any(|e| matches!(
            e,
            WorkerEvent::FileFailed { path, .. } if path == Path::new("b.docx")
        )));

        let (_, summary) = finished(&events);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_single_failing_file_still_completes() {
        let files = paths(&["c.docx"]);
        let converter = RecordingConverter::failing(&["c.docx"]);
        let (outcome, events) = run(
            &files,
            &converter,
            &CancellationToken::new(),
            WorkerOptions::default(),
        );

        assert_eq!(outcome, RunOutcome::Completed);
        assert!(progress_values(&events).is_empty());
        assert_eq!(events.len(), 3);
        assert!(matches!(events[1], WorkerEvent::FileFailed { .. }));
    }

    #[test]
    fn test_fail_fast_stops_after_first_failure() {
        let files = paths(&["a.docx", "b.docx", "c.docx"]);
        let converter = RecordingConverter::failing(&["a.docx"]);
        let (outcome, events) = run(
            &files,
            &converter,
            &CancellationToken::new(),
            WorkerOptions { fail_fast: true },
        );

        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(converter.calls(), paths(&["a.docx"]));
        assert_eq!(finished(&events).1.not_attempted, 2);
    }

    #[test]
    fn test_panicking_converter_is_a_file_error() {
        let files = paths(&["a.docx", "b.docx"]);
        let (outcome, events) = run(
            &files,
            &PanickingConverter,
            &CancellationToken::new(),
            WorkerOptions::default(),
        );

        assert_eq!(outcome, RunOutcome::Completed);
        let panics = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    WorkerEvent::FileFailed {
                        error: ConversionError::Panicked(_),
                        ..
                    }
                )
            })
            .count();
        assert_eq!(panics, 2);
    }

    #[test]
    fn test_progress_is_monotonic_and_bounded() {
        let files = paths(&["a.docx", "b.docx", "c.docx", "d.docx", "e.docx"]);
        let converter = RecordingConverter::failing(&["a.docx", "d.docx"]);
        let (_, events) = run(
            &files,
            &converter,
            &CancellationToken::new(),
            WorkerOptions::default(),
        );

        let values = progress_values(&events);
        assert_eq!(values.len(), 3);
        assert!(values.windows(2).all(|w| w[0] < w[1]));
        assert!(values.iter().all(|&v| v <= files.len()));
    }

    #[test]
    fn test_start_conversion_folder_scenario() {
        let dir = tempdir().unwrap();
        for name in ["a.docx", "b.docx", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let converter = Arc::new(RecordingConverter::default());
        let selection = InputSelection::Folder(dir.path().to_path_buf());

        let mut handle =
            start_conversion(&selection, &Config::default(), converter.clone()).unwrap();
        assert_eq!(handle.total(), 2);
        handle.join().unwrap();
        assert!(!handle.is_alive());

        let events = handle.drain();
        assert_eq!(progress_values(&events), vec![1, 2]);
        assert_eq!(finished(&events).0, RunOutcome::Completed);
        assert_eq!(
            converter.calls(),
            vec![dir.path().join("a.docx"), dir.path().join("b.docx")]
        );
    }

    #[test]
    fn test_start_conversion_empty_folder_spawns_nothing() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();
        let converter = Arc::new(RecordingConverter::default());
        let selection = InputSelection::Folder(dir.path().to_path_buf());

        let result = start_conversion(&selection, &Config::default(), converter.clone());
        assert!(matches!(result, Err(Error::NoInputFound { .. })));
        assert!(converter.calls().is_empty());
    }

    #[test]
    fn test_each_run_gets_a_fresh_token() {
        let selection = InputSelection::FileSet(paths(&["a.docx"]));
        let converter: Arc<dyn Converter> = Arc::new(RecordingConverter::default());

        let mut first = start_conversion(&selection, &Config::default(), converter.clone()).unwrap();
        first.cancel();
        first.join().unwrap();

        let mut second = start_conversion(&selection, &Config::default(), converter).unwrap();
        assert!(!second.token().is_cancelled());
        second.join().unwrap();
    }

    #[test]
    fn test_worker_thread_panics_skip_previous_hook() {
        static SEEN: Mutex<Vec<String>> = Mutex::new(Vec::new());

        let default = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let name = thread::current().name().unwrap_or_default().to_string();
            SEEN.lock().unwrap_or_else(|e| e.into_inner()).push(name);
            default(info);
        }));
        route_worker_panics_to_log();

        let joined = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(|| panic!("renderer crashed"))
            .unwrap()
            .join();
        assert!(joined.is_err());

        let seen = SEEN.lock().unwrap_or_else(|e| e.into_inner());
        assert!(!seen.iter().any(|name| name == WORKER_THREAD_NAME));
    }
}
