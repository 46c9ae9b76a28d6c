//! 路径输入屏幕渲染

use crate::tui::components::{render_hint, render_title_block, three_panel_layout};
use crate::tui::state::AppState;
use crate::tui::theme::theme;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    widgets::{Block, BorderType, Paragraph},
};
use rust_i18n::t;

/// 渲染路径输入
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&t!("menu_enter_path"), frame, header);

    let [prompt_area, input_area, _] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(body);

    let prompt = Paragraph::new(t!("enter_path_prompt")).style(theme().hint());
    frame.render_widget(prompt, prompt_area);

    let input_block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme().border());

    // 超出输入框宽度时水平滚动，保持光标可见
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor = state.input_state.visual_cursor_position();
    let scroll = cursor.saturating_sub(inner_width.saturating_sub(1));

    let input = Paragraph::new(state.input_state.value())
        .block(input_block)
        .style(theme().normal())
        .scroll((0, scroll as u16));
    frame.render_widget(input, input_area);

    frame.set_cursor_position(Position {
        x: input_area.x + 1 + (cursor - scroll) as u16,
        y: input_area.y + 1,
    });

    render_hint(&t!("input_hint"), frame, footer);
}
