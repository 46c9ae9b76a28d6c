//! External document converters
//!
//! Rendering is delegated to an installed office suite. Every backend
//! implements [`Converter`]: one blocking call per document, writing the PDF
//! to [`Config::output_path_for`].

use crate::config::{Config, ConverterKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

/// Failure converting a single document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("failed to launch {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("{tool} exited with status {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("output file was not created: {}", path.display())]
    MissingOutput { path: PathBuf },

    #[error("{0}")]
    Unsupported(String),

    #[error("converter panicked: {0}")]
    Panicked(String),
}

/// A blocking document-to-PDF conversion engine
pub trait Converter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Convert one document. Blocks until the engine returns.
    fn convert(&self, source: &Path) -> Result<(), ConversionError>;
}

/// Build the converter selected by the configuration
pub fn converter_for(config: &Config) -> Arc<dyn Converter> {
    match config.converter.resolve() {
        ConverterKind::Word => Arc::new(WordConverter::new(config.clone())),
        _ => Arc::new(LibreOfficeConverter::new(config.clone())),
    }
}

/// LibreOffice in headless mode
#[derive(Debug, Clone)]
pub struct LibreOfficeConverter {
    config: Config,
}

impl LibreOfficeConverter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn command(&self, source: &Path, out_dir: &Path) -> Command {
        let mut command = Command::new(&self.config.soffice_path);
        command
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(out_dir)
            .arg(source);
        command
    }
}

impl Converter for LibreOfficeConverter {
    fn name(&self) -> &str {
        "soffice"
    }

    fn convert(&self, source: &Path) -> Result<(), ConversionError> {
        let output_path = self.config.output_path_for(source);
        let out_dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&out_dir).map_err(|e| ConversionError::Spawn {
            tool: self.name().to_string(),
            message: format!("cannot create {}: {}", out_dir.display(), e),
        })?;

        let previous = output_stamp(&output_path);
        let mut command = self.command(source, &out_dir);
        debug!(?command, "Running LibreOffice");
        run_tool(self.name(), &mut command)?;

        ensure_output(&output_path, previous)
    }
}

/// Microsoft Word driven through PowerShell COM automation
#[derive(Debug, Clone)]
pub struct WordConverter {
    config: Config,
}

/// `WdSaveFormat.wdFormatPDF`
const WD_FORMAT_PDF: u32 = 17;

impl WordConverter {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// PowerShell script converting `source` into `output`
    fn script(source: &Path, output: &Path) -> String {
        let quote = |p: &Path| p.display().to_string().replace('\'', "''");
        format!(
            "$ErrorActionPreference = 'Stop'; \
             $word = New-Object -ComObject Word.Application; \
             $word.Visible = $false; \
             try {{ \
               $doc = $word.Documents.Open('{src}', $false, $true); \
               $doc.SaveAs([ref] '{dst}', [ref] {fmt}); \
               $doc.Close($false) \
             }} finally {{ $word.Quit() }}",
            src = quote(source),
            dst = quote(output),
            fmt = WD_FORMAT_PDF,
        )
    }

    /// Word resolves relative paths against its own working directory.
    /// Unlike `canonicalize`, no `\\?\` prefix is added on Windows.
    fn absolute_source(source: &Path) -> PathBuf {
        std::path::absolute(source).unwrap_or_else(|_| source.to_path_buf())
    }
}

impl Converter for WordConverter {
    fn name(&self) -> &str {
        "word"
    }

    fn convert(&self, source: &Path) -> Result<(), ConversionError> {
        if !cfg!(windows) {
            return Err(ConversionError::Unsupported(
                "Microsoft Word conversion is only available on Windows".to_string(),
            ));
        }

        let source = Self::absolute_source(source);
        let output_path = self.config.output_path_for(&source);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConversionError::Spawn {
                tool: self.name().to_string(),
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let previous = output_stamp(&output_path);
        let mut command = Command::new("powershell");
        command
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(Self::script(&source, &output_path));
        debug!(source = %source.display(), "Running Word automation");
        run_tool(self.name(), &mut command)?;

        ensure_output(&output_path, previous)
    }
}

/// Run an external tool and map a failed exit into [`ConversionError`]
fn run_tool(tool: &str, command: &mut Command) -> Result<(), ConversionError> {
    let output = command.output().map_err(|e| ConversionError::Spawn {
        tool: tool.to_string(),
        message: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(ConversionError::Failed {
            tool: tool.to_string(),
            status: output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// Modification time of the output file, if one is already there
fn output_stamp(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// The tool must have written the output during this call. A PDF left over
/// from an earlier run keeps its old timestamp and does not count.
fn ensure_output(path: &Path, previous: Option<SystemTime>) -> Result<(), ConversionError> {
    match output_stamp(path) {
        Some(modified) if previous != Some(modified) => Ok(()),
        _ => Err(ConversionError::MissingOutput {
            path: path.to_path_buf(),
        }),
    }
}
