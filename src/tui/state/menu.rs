//! 主菜单状态

use ratatui::widgets::ListState;

/// 菜单项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// 选择文件夹
    SelectFolder,
    /// 选择文件
    SelectFiles,
    /// 手动输入路径
    EnterPath,
    /// 退出
    Exit,
}

const MENU_ITEMS: [MenuItem; 4] = [
    MenuItem::SelectFolder,
    MenuItem::SelectFiles,
    MenuItem::EnterPath,
    MenuItem::Exit,
];

impl MenuItem {
    /// 获取显示文本
    pub fn label(&self) -> String {
        match self {
            MenuItem::SelectFolder => rust_i18n::t!("menu_select_folder").to_string(),
            MenuItem::SelectFiles => rust_i18n::t!("menu_select_files").to_string(),
            MenuItem::EnterPath => rust_i18n::t!("menu_enter_path").to_string(),
            MenuItem::Exit => rust_i18n::t!("menu_exit").to_string(),
        }
    }

    /// 迭代所有菜单项
    pub fn iter() -> std::array::IntoIter<MenuItem, 4> {
        MENU_ITEMS.into_iter()
    }
}

/// 菜单状态
#[derive(Debug)]
pub struct MenuState {
    /// List 组件状态
    pub list_state: ListState,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            list_state: ListState::default().with_selected(Some(0)),
        }
    }
}

impl MenuState {
    /// 当前选中索引
    pub fn selected(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    /// 当前选中的菜单项
    pub fn selected_item(&self) -> MenuItem {
        MENU_ITEMS[self.selected() % MENU_ITEMS.len()]
    }

    /// 选择下一个（循环）
    pub fn next(&mut self) {
        let next = (self.selected() + 1) % MENU_ITEMS.len();
        self.list_state.select(Some(next));
    }

    /// 选择上一个（循环）
    pub fn prev(&mut self) {
        let prev = match self.selected() {
            0 => MENU_ITEMS.len() - 1,
            i => i - 1,
        };
        self.list_state.select(Some(prev));
    }
}
