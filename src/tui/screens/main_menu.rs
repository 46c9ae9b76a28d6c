//! 初始屏幕渲染

use crate::config::Config;
use crate::controller::Controller;
use crate::tui::components::{render_hint, render_title_block, three_panel_layout};
use crate::tui::state::{AppState, MenuItem};
use crate::tui::theme::{config::HIGHLIGHT_SYMBOL, theme};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block, BorderType, List, ListItem, Paragraph, Wrap},
};
use rust_i18n::t;

/// 渲染初始屏幕：说明、菜单与上一次运行的结果
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, controller: &Controller) {
    let [header, body, footer] = three_panel_layout(area);

    render_title_block(&t!("app_title"), frame, header);

    let [intro_area, menu_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(2),
    ])
    .areas(body);

    let intro = Paragraph::new(vec![
        Line::from(t!("welcome").to_string()).style(theme().normal()),
        Line::from(welcome_hint(controller.config())).style(theme().hint()),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, intro_area);

    let items: Vec<ListItem> = MenuItem::iter()
        .map(|item| ListItem::new(item.label()).style(theme().normal()))
        .collect();

    let menu_list = List::new(items)
        .block(
            Block::bordered()
                .title(t!("select_option"))
                .border_type(BorderType::Rounded)
                .border_style(theme().border()),
        )
        .highlight_style(theme().selected())
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    frame.render_stateful_widget(menu_list, menu_area, &mut state.menu_state.list_state);

    let mut status = Vec::new();
    if let Some(summary) = controller.last_summary() {
        status.push(
            Line::from(
                t!(
                    "last_run",
                    converted = summary.converted,
                    failed = summary.failed,
                    total = summary.total
                )
                .to_string(),
            )
            .style(theme().success()),
        );
    }
    if let Some(ref log_path) = state.log_path {
        status.push(
            Line::from(format!("{} {}", t!("log_saved_to"), log_path.display()))
                .style(theme().hint()),
        );
    }
    frame.render_widget(Paragraph::new(status), status_area);

    render_hint(&t!("menu_hint"), frame, footer);
}

/// Where PDFs go, as shown under the welcome text
fn welcome_hint(config: &Config) -> String {
    let extension = config.extension.as_str();
    match config.output_dir {
        Some(ref dir) => t!(
            "welcome_hint_output_dir",
            extension = extension,
            dir = dir.display().to_string()
        )
        .to_string(),
        None => t!("welcome_hint", extension = extension).to_string(),
    }
}
