//! 退出确认渲染

use crate::tui::components::{render_hint, render_title_block, three_panel_layout};
use crate::tui::theme::theme;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    widgets::{Paragraph, Wrap},
};
use rust_i18n::t;

/// 渲染退出确认
pub fn draw(frame: &mut Frame, area: Rect) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&t!("app_title"), frame, header);

    let confirm_text = Paragraph::new(t!("exit_confirm"))
        .style(theme().warning())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(confirm_text, body);

    render_hint(&t!("exit_hint"), frame, footer);
}
