//! Ratatui 终端 UI 模块
//!
//! 无参数启动时使用的交互界面：选择文件夹或文件、确认、查看进度。

pub mod app;
pub mod components;
pub mod event;
pub mod screens;
pub mod state;
pub mod theme;
pub mod ui;

pub use app::{TuiApp, handle_event};
pub use event::{EventPoll, TuiEvent};
pub use state::{AppState, ConfirmButton, InputState, MenuItem, MenuState, Screen};
pub use theme::{Theme, theme};
pub use ui::{draw, render};

/// 是否运行交互模式（无参数时启用）
pub fn should_run_interactive() -> bool {
    std::env::args_os().len() == 1
}
