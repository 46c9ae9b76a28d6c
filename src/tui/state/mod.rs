//! TUI 状态模块

pub mod app;
pub mod input;
pub mod menu;

pub use app::{AppState, ConfirmButton, Screen};
pub use input::InputState;
pub use menu::{MenuItem, MenuState};
