//! 主题模块
//!
//! 统一的颜色与样式定义。

use crate::controller::DialogKind;
use ratatui::style::{Color, Modifier, Style};

/// 主题颜色配置
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// 背景色
    pub bg: Color,
    /// 前景色
    pub fg: Color,
    /// 强调色
    pub accent: Color,
    /// 选中项背景色
    pub selected_bg: Color,
    /// 选中项前景色
    pub selected_fg: Color,
    /// 成功色
    pub success: Color,
    /// 警告色
    pub warning: Color,
    /// 错误色
    pub error: Color,
    /// 提示/次要文字色
    pub hint: Color,
    /// 边框色
    pub border: Color,
    /// 进度条颜色
    pub progress: Color,
    /// 禁用按钮颜色
    pub disabled: Color,
}

impl Theme {
    /// 普通文本样式
    pub fn normal(&self) -> Style {
        Style::new().fg(self.fg).bg(self.bg)
    }

    /// 标题样式
    pub fn title(&self) -> Style {
        Style::new()
            .fg(self.accent)
            .bg(self.bg)
            .add_modifier(Modifier::BOLD)
    }

    /// 选中项样式
    pub fn selected(&self) -> Style {
        Style::new()
            .fg(self.selected_fg)
            .bg(self.selected_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// 边框样式
    pub fn border(&self) -> Style {
        Style::new().fg(self.border).bg(self.bg)
    }

    /// 提示文本样式
    pub fn hint(&self) -> Style {
        Style::new().fg(self.hint).bg(self.bg)
    }

    /// 成功样式
    pub fn success(&self) -> Style {
        Style::new().fg(self.success).bg(self.bg)
    }

    /// 警告样式
    pub fn warning(&self) -> Style {
        Style::new().fg(self.warning).bg(self.bg)
    }

    /// 错误样式
    pub fn error(&self) -> Style {
        Style::new().fg(self.error).bg(self.bg)
    }

    /// 进度条样式
    pub fn progress(&self) -> Style {
        Style::new().fg(self.progress).bg(self.bg)
    }

    /// 不可用按钮样式
    pub fn disabled(&self) -> Style {
        Style::new()
            .fg(self.disabled)
            .bg(self.bg)
            .add_modifier(Modifier::DIM)
    }

    /// 对话框边框样式（按严重程度着色）
    pub fn dialog(&self, kind: DialogKind) -> Style {
        match kind {
            DialogKind::Error => self.error(),
            DialogKind::Warning => self.warning(),
            DialogKind::Success => self.success(),
            DialogKind::Info => self.border(),
        }
        .add_modifier(Modifier::BOLD)
    }
}

/// 全局主题实例
pub static THEME: Theme = Theme {
    bg: Color::Black,
    fg: Color::White,
    accent: Color::Cyan,
    selected_bg: Color::Cyan,
    selected_fg: Color::Black,
    success: Color::Green,
    warning: Color::Yellow,
    error: Color::Red,
    hint: Color::Gray,
    border: Color::Cyan,
    progress: Color::Cyan,
    disabled: Color::DarkGray,
};

/// 获取全局主题引用
pub fn theme() -> &'static Theme {
    &THEME
}

/// UI 常量
pub mod config {
    /// 列表高亮符号
    pub const HIGHLIGHT_SYMBOL: &str = "▶ ";
    /// 确认屏幕中最多列出的文件数
    pub const MAX_LISTED_FILES: usize = 8;
    /// 对话框宽度
    pub const DIALOG_WIDTH: u16 = 60;
}
