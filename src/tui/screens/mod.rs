//! 各屏幕的渲染函数

pub mod confirm;
pub mod dialog;
pub mod exit;
pub mod main_menu;
pub mod path_input;
