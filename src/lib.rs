//! docx-batch-pdf - Batch conversion of Word documents to PDF
//!
//! This library provides:
//! - Folder or explicit file-set selection of `.docx` documents
//! - A cancellable background worker converting one document at a time
//! - LibreOffice (`soffice --headless`) and Microsoft Word renderers
//! - A selection/navigation controller with modal message queue
//! - A Ratatui terminal front-end and a batch command line

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod cli;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod i18n;
pub mod selection;
pub mod tui;
pub mod worker;

pub use cli::Cli;
pub use config::{Config, ConfigError, ConverterKind};
pub use controller::{Controller, ControllerState, Dialog, DialogKind, NativeDialog, SelectionDialog};
pub use convert::{ConversionError, Converter, converter_for};
pub use error::{Error, Result};
pub use i18n::init_locale;
pub use selection::InputSelection;
pub use tui::{TuiApp, should_run_interactive};
pub use worker::{
    CancellationToken, ConversionProgress, RunHandle, RunOutcome, RunSummary, WorkerEvent,
    start_conversion,
};
