//! 模态对话框渲染

use crate::controller::Dialog;
use crate::tui::components::centered_rect;
use crate::tui::theme::{config::DIALOG_WIDTH, theme};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap},
};
use rust_i18n::t;
use unicode_width::UnicodeWidthStr;

/// 在当前屏幕之上渲染对话框；`pending` 为队列中的对话框总数
pub fn draw(frame: &mut Frame, area: Rect, dialog: &Dialog, pending: usize) {
    let inner_width = DIALOG_WIDTH.saturating_sub(4).max(1) as usize;
    let message_lines: usize = dialog
        .message
        .lines()
        .map(|line| line.width().div_ceil(inner_width).max(1))
        .sum();
    // 边框、提示行与上下留白
    let height = (message_lines as u16).saturating_add(5);

    let rect = centered_rect(area, DIALOG_WIDTH, height);
    frame.render_widget(Clear, rect);

    let block = Block::bordered()
        .title(Line::from(format!(" {} ", dialog.title)).centered())
        .border_type(BorderType::Double)
        .border_style(theme().dialog(dialog.kind))
        .style(theme().normal());
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let [message_area, hint_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

    let message = Paragraph::new(dialog.message.as_str())
        .style(theme().normal())
        .wrap(Wrap { trim: false })
        .block(Block::new().padding(Padding::horizontal(1)));
    frame.render_widget(message, message_area);

    let hint = if pending > 1 {
        format!("{}  {}", t!("dialog_hint"), t!("more_dialogs", count = pending - 1))
    } else {
        t!("dialog_hint").to_string()
    };
    frame.render_widget(
        Paragraph::new(hint).centered().style(theme().hint()),
        hint_area,
    );
}
