//! 确认与进度屏幕渲染
//!
//! 同一屏幕承载"已选择、待开始"和"转换中"两个阶段。

use crate::controller::Controller;
use crate::selection::InputSelection;
use crate::tui::components::{render_hint, render_title_block, three_panel_layout, truncate_left};
use crate::tui::state::{AppState, ConfirmButton};
use crate::tui::theme::{config::MAX_LISTED_FILES, theme};
use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, BorderType, Gauge, Paragraph},
};
use rust_i18n::t;

/// 渲染确认/进度屏幕
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, controller: &Controller) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&t!("app_title"), frame, header);

    let [selection_area, gauge_area, buttons_area] = Layout::vertical([
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(body);

    if let Some(selection) = controller.selection() {
        draw_selection(frame, selection_area, selection);
    }

    let (ratio, label) = match controller.progress() {
        Some(progress) => (
            progress.ratio(),
            format!("{}/{}", progress.current, progress.total),
        ),
        None => (0.0, t!("not_started").to_string()),
    };
    let gauge = Gauge::default()
        .block(
            Block::bordered()
                .title(t!("conversion_progress"))
                .border_type(BorderType::Rounded)
                .border_style(theme().border()),
        )
        .gauge_style(theme().progress())
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, gauge_area);

    let running = controller.is_running();
    draw_buttons(frame, buttons_area, state.focused_button, running);

    let hint = if controller.cancel_requested() {
        t!("cancelling_hint")
    } else if running {
        t!("running_hint")
    } else {
        t!("confirm_hint")
    };
    render_hint(&hint, frame, footer);
}

fn draw_selection(frame: &mut Frame, area: Rect, selection: &InputSelection) {
    let width = area.width.saturating_sub(4) as usize;

    let lines: Vec<Line> = match selection {
        InputSelection::Folder(folder) => vec![
            Line::from(t!("selected_folder").to_string()).style(theme().hint()),
            Line::from(truncate_left(&folder.display().to_string(), width)).style(theme().normal()),
        ],
        InputSelection::FileSet(files) => {
            let mut lines = vec![
                Line::from(t!("selected_files", count = files.len()).to_string())
                    .style(theme().hint()),
            ];
            lines.extend(files.iter().take(MAX_LISTED_FILES).map(|file| {
                Line::from(truncate_left(&file.display().to_string(), width))
                    .style(theme().normal())
            }));
            if files.len() > MAX_LISTED_FILES {
                lines.push(
                    Line::from(t!("more_files", count = files.len() - MAX_LISTED_FILES).to_string())
                        .style(theme().hint()),
                );
            }
            lines
        }
    };

    let paragraph = Paragraph::new(lines).block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme().border()),
    );
    frame.render_widget(paragraph, area);
}

fn draw_buttons(frame: &mut Frame, area: Rect, focused: ConfirmButton, running: bool) {
    let [start_area, cancel_area] = Layout::horizontal([Constraint::Length(16); 2])
        .flex(Flex::Center)
        .spacing(4)
        .areas(area);

    let start_style = if running {
        theme().disabled()
    } else if focused == ConfirmButton::Start {
        theme().selected()
    } else {
        theme().normal()
    };
    let cancel_style = if focused == ConfirmButton::Cancel {
        theme().selected()
    } else {
        theme().normal()
    };

    draw_button(frame, start_area, &t!("button_start"), start_style);
    draw_button(frame, cancel_area, &t!("button_cancel"), cancel_style);
}

fn draw_button(frame: &mut Frame, area: Rect, label: &str, style: Style) {
    let button = Paragraph::new(label).centered().style(style).block(
        Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(theme().border()),
    );
    frame.render_widget(button, area);
}
