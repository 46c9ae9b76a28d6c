//! 应用状态

use crate::controller::Controller;
use crate::tui::state::{InputState, MenuState};
use std::path::PathBuf;

/// 屏幕枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// 初始屏幕
    #[default]
    MainMenu,
    /// 手动输入路径
    PathInput,
    /// 确认与进度
    Confirm,
    /// 退出确认
    Exit,
}

/// 确认屏幕上的按钮
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmButton {
    #[default]
    Start,
    Cancel,
}

impl ConfirmButton {
    /// 切换到另一个按钮
    pub fn toggle(self) -> Self {
        match self {
            ConfirmButton::Start => ConfirmButton::Cancel,
            ConfirmButton::Cancel => ConfirmButton::Start,
        }
    }
}

/// 应用状态（仅 UI 部分，业务状态在 [`Controller`] 中）
#[derive(Debug, Default)]
pub struct AppState {
    /// 当前屏幕
    pub screen: Screen,
    /// 菜单状态
    pub menu_state: MenuState,
    /// 路径输入状态
    pub input_state: InputState,
    /// 确认屏幕的焦点按钮
    pub focused_button: ConfirmButton,
    /// 是否退出
    pub should_exit: bool,
    /// 日志文件路径，显示在初始屏幕
    pub log_path: Option<PathBuf>,
}

impl AppState {
    /// 让当前屏幕与控制器状态一致
    ///
    /// 有选择时总在确认屏幕；控制器回到空闲后离开确认屏幕。
    pub fn sync_screen(&mut self, controller: &Controller) {
        if !controller.is_idle() {
            if self.screen != Screen::Confirm {
                self.screen = Screen::Confirm;
                self.focused_button = ConfirmButton::Start;
            }
            if controller.progress().is_some() {
                self.focused_button = ConfirmButton::Cancel;
            }
        } else if self.screen == Screen::Confirm {
            self.screen = Screen::MainMenu;
            self.focused_button = ConfirmButton::Start;
        }
    }

    /// 返回初始屏幕
    pub fn reset_to_main_menu(&mut self) {
        self.screen = Screen::MainMenu;
        self.input_state.clear();
        self.focused_button = ConfirmButton::Start;
        self.should_exit = false;
    }
}
