//! Configuration types for the docx batch converter

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming the LibreOffice binary
pub const SOFFICE_ENV: &str = "DOCX_BATCH_PDF_SOFFICE";

/// File in `<exe>/Config` read by the terminal front-end
pub const INTERACTIVE_CONFIG: &str = "interactive.toml";

/// Which external engine renders the documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConverterKind {
    /// Microsoft Word on Windows, LibreOffice everywhere else
    #[default]
    Auto,
    /// LibreOffice `soffice --headless`
    LibreOffice,
    /// Microsoft Word through COM automation (Windows only)
    Word,
}

impl ConverterKind {
    /// Resolve `Auto` against the running platform
    pub fn resolve(self) -> ConverterKind {
        match self {
            ConverterKind::Auto if cfg!(windows) => ConverterKind::Word,
            ConverterKind::Auto => ConverterKind::LibreOffice,
            other => other,
        }
    }
}

/// Configuration for the docx batch converter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rendering engine
    pub converter: ConverterKind,

    /// Path or command name of the LibreOffice binary
    pub soffice_path: PathBuf,

    /// Directory receiving the PDFs; `None` writes each PDF next to its source
    pub output_dir: Option<PathBuf>,

    /// Source extension, without the leading dot
    pub extension: String,

    /// Match the extension case-sensitively (`a.DOCX` is ignored when true)
    pub case_sensitive_extension: bool,

    /// Descend into subfolders when a folder is selected
    pub recursive: bool,

    /// Skip Word owner/lock files such as `~$report.docx`
    pub skip_lock_files: bool,

    /// Folder used by the batch runner when no input is given
    pub default_folder: PathBuf,

    /// Stop the batch at the first failed file
    pub fail_fast: bool,

    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            converter: ConverterKind::default(),
            soffice_path: PathBuf::from("soffice"),
            output_dir: None,
            extension: "docx".into(),
            case_sensitive_extension: true,
            recursive: false,
            skip_lock_files: true,
            default_folder: PathBuf::from("./files"),
            fail_fast: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Check whether a file name carries the configured source extension
    pub fn matches_extension(&self, file_name: &str) -> bool {
        let suffix = format!(".{}", self.extension);
        if self.case_sensitive_extension {
            file_name.ends_with(&suffix)
        } else {
            file_name.to_lowercase().ends_with(&suffix.to_lowercase())
        }
    }

    /// Check whether a file name is a Word lock file
    pub fn is_lock_file(&self, file_name: &str) -> bool {
        self.skip_lock_files && file_name.starts_with("~$")
    }

    /// Where the PDF for `source` ends up
    pub fn output_path_for(&self, source: &Path) -> PathBuf {
        let stem = source.file_stem().unwrap_or(source.as_os_str());
        let dir = match self.output_dir {
            Some(ref dir) => dir.as_path(),
            None => source.parent().unwrap_or(Path::new("")),
        };
        let mut name = stem.to_os_string();
        name.push(".pdf");
        dir.join(name)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `path` when it exists, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Replace `soffice_path` when an override is given. Empty values are ignored.
    pub fn with_soffice_override(mut self, soffice: Option<PathBuf>) -> Self {
        if let Some(soffice) = soffice.filter(|p| !p.as_os_str().is_empty()) {
            self.soffice_path = soffice;
        }
        self
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# docx-batch-pdf configuration file
# This file uses TOML format (https://toml.io). Every key is optional.

# Rendering engine: "auto", "libre-office" or "word"
# - auto: Word on Windows, LibreOffice elsewhere
converter = "auto"

# LibreOffice binary (a command on PATH or an absolute path)
soffice_path = "soffice"

# Write all PDFs into this folder instead of next to each source document
# output_dir = "D:/Converted"

# Source extension (without the dot)
extension = "docx"

# false also accepts "Report.DOCX"
case_sensitive_extension = true

# Include documents in subfolders when a folder is selected
recursive = false

# Ignore Word lock files such as "~$report.docx"
skip_lock_files = true

# Folder converted by the batch runner when no --input is given
default_folder = "./files"

# Stop the batch runner at the first failed document
fail_fast = false

# Verbose output
verbose = false
"#
        .to_string()
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_extension_match_is_case_sensitive_by_default() {
        let config = Config::default();
        assert!(config.matches_extension("a.docx"));
        assert!(!config.matches_extension("a.DOCX"));
        assert!(!config.matches_extension("notes.txt"));
        assert!(!config.matches_extension("docx"));
    }

    #[test]
    fn test_extension_match_ignore_case() {
        let config = Config {
            case_sensitive_extension: false,
            ..Config::default()
        };
        assert!(config.matches_extension("a.DOCX"));
        assert!(config.matches_extension("a.Docx"));
        assert!(!config.matches_extension("a.doc"));
    }

    #[test]
    fn test_lock_files() {
        let mut config = Config::default();
        assert!(config.is_lock_file("~$report.docx"));
        assert!(!config.is_lock_file("report.docx"));

        config.skip_lock_files = false;
        assert!(!config.is_lock_file("~$report.docx"));
    }

    #[test]
    fn test_output_path_beside_source() {
        let config = Config::default();
        let out = config.output_path_for(Path::new("/docs/a.docx"));
        assert_eq!(out, PathBuf::from("/docs/a.pdf"));
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let config = Config {
            output_dir: Some(PathBuf::from("/out")),
            ..Config::default()
        };
        let out = config.output_path_for(Path::new("/docs/sub/report.v2.docx"));
        assert_eq!(out, PathBuf::from("/out/report.v2.pdf"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml("recursive = true\nconverter = \"libre-office\"\n").unwrap();
        assert!(config.recursive);
        assert_eq!(config.converter, ConverterKind::LibreOffice);
        assert_eq!(config.extension, "docx");
        assert_eq!(config.default_folder, PathBuf::from("./files"));
    }

    #[test]
    fn test_sample_config_parses_to_defaults() {
        let config = Config::from_toml(&Config::sample_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_from_file(&missing),
            Err(ConfigError::ReadError { .. })
        ));

        let broken = dir.path().join("broken.toml");
        fs::write(&broken, "recursive = maybe").unwrap();
        assert!(matches!(
            Config::load_from_file(&broken),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_converter_kind_resolve() {
        assert_eq!(ConverterKind::Word.resolve(), ConverterKind::Word);
        assert_eq!(
            ConverterKind::LibreOffice.resolve(),
            ConverterKind::LibreOffice
        );
        assert_ne!(ConverterKind::Auto.resolve(), ConverterKind::Auto);
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(INTERACTIVE_CONFIG);
        assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());

        fs::write(&path, "recursive = true\nsoffice_path = \"/opt/lo/soffice\"\n").unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert!(config.recursive);
        assert_eq!(config.soffice_path, PathBuf::from("/opt/lo/soffice"));

        fs::write(&path, "recursive = maybe").unwrap();
        assert!(matches!(
            Config::load_or_default(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_soffice_override() {
        let config = Config::default().with_soffice_override(None);
        assert_eq!(config.soffice_path, Config::default().soffice_path);

        let config = Config::default().with_soffice_override(Some(PathBuf::new()));
        assert_eq!(config.soffice_path, Config::default().soffice_path);

        let config = Config::default().with_soffice_override(Some(PathBuf::from("/opt/soffice")));
        assert_eq!(config.soffice_path, PathBuf::from("/opt/soffice"));
    }
}
