//! Common UI components module
//!
//! Reusable layout helpers and widgets shared by the screens.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    text::Line,
    widgets::{Block, BorderType, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::theme::theme;

/// Three-panel layout: header, body, footer
pub fn three_panel_layout(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(2),
    ])
    .areas(area)
}

/// A `width` x `height` rectangle centered in `area`
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Render a centered title block with border
pub fn render_title_block(title: &str, frame: &mut Frame, area: Rect) {
    let title_line = Line::from(format!(" {} ", title))
        .centered()
        .style(theme().title());

    let block = Block::bordered()
        .title(title_line)
        .border_type(BorderType::Rounded)
        .border_style(theme().border())
        .style(theme().normal());

    frame.render_widget(block, area);
}

/// Render bottom hint text
pub fn render_hint(hint: &str, frame: &mut Frame, area: Rect) {
    let hint_widget = Paragraph::new(hint)
        .style(theme().hint())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(hint_widget, area);
}

/// 按显示宽度截断文本（保留末尾，路径的文件名部分更有用）
pub fn truncate_left(value: &str, max_width: usize) -> String {
    if value.width() <= max_width {
        return value.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut current_width = 0;
    let mut tail: Vec<char> = Vec::new();

    for ch in value.chars().rev() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > target_width {
            break;
        }
        tail.push(ch);
        current_width += ch_width;
    }

    let mut output = String::from("...");
    output.extend(tail.into_iter().rev());
    output
}
