//! UI 渲染入口
//!
//! 按当前屏幕分派到 `screens` 下的绘制函数，对话框总是画在最上层。

use crate::controller::Controller;
use crate::tui::screens;
use crate::tui::state::{AppState, Screen};
use crate::tui::theme::theme;
use ratatui::{
    DefaultTerminal, Frame,
    layout::Rect,
    style::Style,
    widgets::Block,
};

/// 渲染整个应用
pub fn render(
    terminal: &mut DefaultTerminal,
    state: &mut AppState,
    controller: &Controller,
) -> std::io::Result<()> {
    terminal.draw(|frame| draw(frame, state, controller))?;
    Ok(())
}

/// 绘制一帧
pub fn draw(frame: &mut Frame, state: &mut AppState, controller: &Controller) {
    let area = frame.area();
    set_background(frame, area);

    match state.screen {
        Screen::MainMenu => screens::main_menu::draw(frame, area, state, controller),
        Screen::PathInput => screens::path_input::draw(frame, area, state),
        Screen::Confirm => screens::confirm::draw(frame, area, state, controller),
        Screen::Exit => screens::exit::draw(frame, area),
    }

    if let Some(dialog) = controller.current_dialog() {
        screens::dialog::draw(frame, area, dialog, controller.pending_dialogs());
    }
}

/// 设置全局背景
fn set_background(frame: &mut Frame, area: Rect) {
    frame.render_widget(Block::new().style(Style::new().bg(theme().bg)), area);
}
