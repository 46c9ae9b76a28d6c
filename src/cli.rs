//! CLI argument parsing with clap

use crate::config::{Config, ConverterKind};
use clap::Parser;
use std::path::PathBuf;

/// docx-batch-pdf - Convert Word documents to PDF in bulk
///
/// Run without arguments for the interactive terminal front-end. With
/// arguments the documents are converted in batch mode and each result is
/// printed as it happens.
#[derive(Parser, Debug)]
#[command(name = "docx-batch-pdf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// A folder, or one or more .docx files (default: ./files)
    #[arg(short, long, num_args = 1..)]
    pub input: Option<Vec<PathBuf>>,

    /// Write PDFs into this folder instead of next to each document
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Rendering engine
    #[arg(long, value_enum)]
    pub converter: Option<ConverterKind>,

    /// LibreOffice binary to run
    #[arg(long, env = "DOCX_BATCH_PDF_SOFFICE")]
    pub soffice: Option<PathBuf>,

    /// Include documents in subfolders
    #[arg(short, long)]
    pub recursive: bool,

    /// Match the .docx extension case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Stop at the first document that fails to convert
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the sample configuration file and exit
    #[arg(long)]
    pub print_config: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref output_dir) = self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        if let Some(converter) = self.converter {
            config.converter = converter;
        }
        if let Some(ref soffice) = self.soffice {
            config.soffice_path = soffice.clone();
        }
        if self.recursive {
            config.recursive = true;
        }
        if self.ignore_case {
            config.case_sensitive_extension = false;
        }
        if self.fail_fast {
            config.fail_fast = true;
        }
        if self.verbose {
            config.verbose = true;
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }

    /// Input paths, falling back to the configured default folder
    pub fn input_paths(&self, config: &Config) -> Vec<PathBuf> {
        match self.input {
            Some(ref inputs) if !inputs.is_empty() => inputs.clone(),
            _ => vec![config.default_folder.clone()],
        }
    }
}
