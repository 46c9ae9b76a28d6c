//! Error types for the docx batch converter

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for converter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the docx batch converter
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("No .{extension} files found in {source_info}")]
    NoInputFound {
        source_info: String,
        extension: String,
    },

    #[error("Input path does not exist: {path}")]
    InputNotFound { path: PathBuf },

    #[error("{first} and {second} would both be written to {output}")]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },

    #[error("Conversion worker panicked")]
    WorkerPanicked,

    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),
}
