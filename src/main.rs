//! docx-batch-pdf - Convert Word documents to PDF in bulk
//!
//! Without arguments a terminal front-end lets the user pick a folder or a
//! set of documents and watch the conversion. With arguments the same worker
//! runs in batch mode and reports every document on the console.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use docx_batch_pdf::{
    Cli, Config, Controller, Error, InputSelection, NativeDialog, RunHandle, RunOutcome,
    RunSummary, TuiApp, WorkerEvent, converter_for, init_locale, should_run_interactive, worker,
};
use docx_batch_pdf::config::{INTERACTIVE_CONFIG, SOFFICE_ENV};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Initialize i18n for this binary
rust_i18n::i18n!("locales", fallback = "en");

// CLI Output Module
mod cli_output {
    //! CLI 输出美化模块
    //!
    //! 为批处理模式的输出提供统一的颜色和格式。

    use crossterm::{
        ExecutableCommand,
        style::{Color, Print, Stylize, style},
    };
    use std::io::stdout;
    use unicode_width::UnicodeWidthStr;

    /// CLI 主题颜色
    pub struct CliTheme;

    impl CliTheme {
        /// 成功颜色（绿色）
        pub const SUCCESS: Color = Color::Green;
        /// 警告颜色（黄色）
        pub const WARNING: Color = Color::Yellow;
        /// 错误颜色（红色）
        pub const ERROR: Color = Color::Red;
        /// 提示颜色（暗灰色）
        pub const HINT: Color = Color::DarkGrey;
        /// 强调颜色（青色）
        pub const ACCENT: Color = Color::Cyan;
    }

    const WIDTH: usize = 60;

    /// 打印分隔线
    pub fn print_separator() {
        let _ = stdout().execute(Print(format!("{}\n", "─".repeat(WIDTH))));
    }

    /// 打印居中的标题
    pub fn print_title(title: &str) {
        let padding = WIDTH.saturating_sub(title.width() + 4) / 2;
        let _ = stdout().execute(Print(" ".repeat(padding)));
        let _ = stdout().execute(Print(style(format!("╔ {} ╗", title)).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印警告消息
    pub fn print_warning(msg: &str) {
        let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印错误消息
    pub fn print_error(msg: &str) {
        let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印提示消息
    pub fn print_hint(msg: &str) {
        let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", msg)));
    }

    /// 打印统计项
    pub fn print_stat(key: &str, value: &str, color: Color) {
        let _ = stdout().execute(Print("  "));
        let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(": "));
        let _ = stdout().execute(Print(style(value).with(color).bold()));
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印单个文档的结果行：`[3/10] ✓ report.docx 附加信息`
    pub fn print_result(
        counter: &str,
        status_icon: &str,
        status_color: Color,
        source: &str,
        detail: &str,
    ) {
        let _ = stdout().execute(Print(style(counter).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
        let _ = stdout().execute(Print(" "));
        let _ = stdout().execute(Print(style(source).italic()));
        if !detail.is_empty() {
            let _ = stdout().execute(Print(" "));
            let _ = stdout().execute(Print(style(detail).with(CliTheme::HINT)));
        }
        let _ = stdout().execute(Print("\n"));
    }

    /// 打印日志文件路径
    pub fn print_log_path(label: &str, path: &str) {
        let _ = stdout().execute(Print("\n"));
        let _ = stdout().execute(Print(style("  📁 ").with(CliTheme::ACCENT)));
        let _ = stdout().execute(Print(style(format!("{} ", label)).with(CliTheme::HINT)));
        let _ = stdout().execute(Print(format!("{}\n", path)));
    }

    /// 打印空行
    pub fn print_blank() {
        let _ = stdout().execute(Print("\n"));
    }
}

/// Convenience macro for translation
macro_rules! t {
    ($key:expr) => {
        rust_i18n::t!($key)
    };
    ($key:expr, $($tt:tt)*) => {
        rust_i18n::t!($key, $($tt)*)
    };
}

/// Exit status for an interrupted batch (128 + SIGINT)
const EXIT_CANCELLED: u8 = 130;

fn main() -> Result<ExitCode> {
    // Initialize locale based on system settings
    init_locale();

    if should_run_interactive() {
        run_interactive_mode()?;
        return Ok(ExitCode::SUCCESS);
    }

    run_cli_mode()
}

/// Run the terminal front-end
fn run_interactive_mode() -> Result<()> {
    let exe_dir = get_executable_dir()?;
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = exe_dir
        .join("Log")
        .join(format!("Interactive_{}.log", timestamp));

    // File-only logging: the terminal belongs to the UI
    let _guard = setup_file_only_logging(&log_path)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "docx-batch-pdf starting in interactive mode"
    );

    let config_path = exe_dir.join("Config").join(INTERACTIVE_CONFIG);
    let config = Config::load_or_default(&config_path)?
        .with_soffice_override(std::env::var_os(SOFFICE_ENV).map(PathBuf::from));
    info!(config_file = %config_path.display(), ?config, "Configuration loaded");

    let converter = converter_for(&config);
    info!(converter = converter.name(), "Converter selected");

    let controller = Controller::new(config, converter);
    let mut app = TuiApp::new(controller, Box::new(NativeDialog));
    app.set_log_path(log_path.clone());
    app.run()?;

    info!(log_file = %log_path.display(), "Interactive session complete");
    Ok(())
}

/// Run in batch mode
fn run_cli_mode() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", Config::sample_config());
        return Ok(ExitCode::SUCCESS);
    }

    let exe_dir = get_executable_dir()?;
    let log_path = get_log_path(&exe_dir, &cli);
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "docx-batch-pdf starting");

    let config = load_config(&cli, &exe_dir)?;
    if config.verbose {
        info!(?config, "Configuration loaded");
    }
    info!(log_file = %log_path.display(), "Log file location");

    let Some(selection) = InputSelection::from_paths(cli.input_paths(&config)) else {
        anyhow::bail!("{}", t!("cli_no_input"));
    };

    use cli_output::*;

    print_separator();
    print_title(&t!("cli_title"));
    print_separator();
    print_hint(&selection.describe());

    // Resolve up front so each progress event can be matched to its document
    let files = match selection.resolve(&config) {
        Ok(files) => files,
        Err(Error::NoInputFound { extension, .. }) => {
            warn!(selection = %selection.describe(), "No documents to convert");
            print_error(&t!("no_input_found", extension = extension));
            print_log_path(&t!("log_saved_to"), &log_path.display().to_string());
            return Ok(ExitCode::FAILURE);
        }
        Err(Error::OutputCollision {
            first,
            second,
            output,
        }) => {
            warn!(first = %first.display(), second = %second.display(), "Output names collide");
            print_error(&t!(
                "output_collision",
                first = first.display().to_string(),
                second = second.display().to_string(),
                output = output.display().to_string()
            ));
            print_log_path(&t!("log_saved_to"), &log_path.display().to_string());
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let converter = converter_for(&config);
    info!(converter = converter.name(), "Converter selected");

    worker::route_worker_panics_to_log();
    let mut run = worker::start_conversion(
        &InputSelection::FileSet(files.clone()),
        &config,
        converter,
    )?;

    let token = run.token().clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if token.is_cancelled() {
            // Second Ctrl+C: do not wait for the document in flight
            std::process::exit(i32::from(EXIT_CANCELLED));
        }
        token.cancel();
    }) {
        warn!(error = %e, "Failed to install Ctrl+C handler");
    }

    print_blank();
    let (outcome, summary) = report_events(&run, &files);

    if let Err(e) = run.join() {
        error!(error = %e, "Worker ended abnormally");
    }

    print_summary(outcome, &summary);
    print_log_path(&t!("log_saved_to"), &log_path.display().to_string());

    let code = match outcome {
        Some(RunOutcome::Completed) if summary.failed == 0 => ExitCode::SUCCESS,
        Some(RunOutcome::Cancelled) => ExitCode::from(EXIT_CANCELLED),
        _ => ExitCode::FAILURE,
    };
    Ok(code)
}

/// Print worker events until the run finishes.
///
/// Returns `None` as outcome when the worker went away without finishing.
fn report_events(
    run: &RunHandle,
    files: &[PathBuf],
) -> (Option<RunOutcome>, RunSummary) {
    use cli_output::*;

    let total = files.len();
    let file_name = |path: &Path| {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    };
    let mut announced_cancel = false;
    let mut position = 0;

    loop {
        if run.token().is_cancelled() && !announced_cancel {
            print_warning(&t!("cli_cancelling"));
            announced_cancel = true;
        }

        let event = match run.recv_timeout(Duration::from_millis(100)) {
            Some(event) => event,
            None if run.is_alive() => continue,
            // Pick up anything sent right before the thread exited
            None => match run.try_recv() {
                Some(event) => event,
                None => {
                    error!("Worker exited without reporting an outcome");
                    return (None, RunSummary::default());
                }
            },
        };

        match event {
            WorkerEvent::Started { total } => {
                info!(total, "Run started");
            }
            WorkerEvent::Progress(progress) => {
                position = progress.current;
                let name = progress
                    .current
                    .checked_sub(1)
                    .and_then(|i| files.get(i))
                    .map(|p| file_name(p.as_path()))
                    .unwrap_or_default();
                print_result(
                    &format!("[{}/{}]", progress.current, total),
                    "✓",
                    CliTheme::SUCCESS,
                    &name,
                    &t!("cli_converted"),
                );
            }
            WorkerEvent::FileFailed { path, error } => {
                position += 1;
                print_result(
                    &format!("[{}/{}]", position, total),
                    "✗",
                    CliTheme::ERROR,
                    &file_name(path.as_path()),
                    &error.to_string(),
                );
            }
            WorkerEvent::Finished { outcome, summary } => {
                return (Some(outcome), summary);
            }
        }
    }
}

/// Print the closing statistics
fn print_summary(outcome: Option<RunOutcome>, summary: &RunSummary) {
    use cli_output::*;

    let stat_total = t!("stat_total");
    let stat_converted = t!("stat_converted");
    let stat_failed = t!("stat_failed");
    let stat_not_attempted = t!("stat_not_attempted");
    let stat_elapsed = t!("stat_elapsed");

    print_blank();
    print_separator();
    match outcome {
        Some(RunOutcome::Cancelled) => print_title(&t!("cli_run_cancelled")),
        _ => print_title(&t!("cli_run_complete")),
    }
    print_separator();

    print_blank();
    print_stat(&stat_total, &summary.total.to_string(), CliTheme::ACCENT);
    print_stat(&stat_converted, &summary.converted.to_string(), CliTheme::SUCCESS);
    print_stat(&stat_failed, &summary.failed.to_string(), CliTheme::ERROR);
    print_stat(
        &stat_not_attempted,
        &summary.not_attempted.to_string(),
        CliTheme::WARNING,
    );
    print_stat(
        &stat_elapsed,
        &format!("{:.1}s", summary.elapsed.as_secs_f64()),
        CliTheme::ACCENT,
    );
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    match cli.config_name() {
        Some(config_name) => log_dir
            .join(&config_name)
            .join(format!("{}_{}.log", config_name, timestamp)),
        None => log_dir.join(format!("Batch_{}.log", timestamp)),
    }
}

/// Resolve config path - supports shorthand names under `<exe>/Config/`
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());
    let mut in_config_dir = exe_dir.join("Config").join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = match cli.config {
        Some(ref config_path) => {
            let resolved_path = resolve_config_path(exe_dir, config_path);
            info!(config_file = %resolved_path.display(), "Loading configuration from file");
            let file_config = Config::load_from_file(&resolved_path)?;
            cli.merge_with_config(file_config)
        }
        None => cli.to_config(),
    };

    Ok(config)
}

/// Open (truncating) the log file, creating its folder
fn open_log_file(log_path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    Ok(std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?)
}

/// Setup logging for batch mode (file + console)
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (non_blocking, guard) = tracing_appender::non_blocking(open_log_file(log_path)?);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if cli.json_log {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(guard)
}

/// Setup logging for interactive mode (file only, no console)
fn setup_file_only_logging(log_path: &Path) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let (non_blocking, guard) = tracing_appender::non_blocking(open_log_file(log_path)?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
