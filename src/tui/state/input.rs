//! 路径输入状态

use unicode_width::UnicodeWidthStr;

/// 文本输入状态（光标以字节偏移记录，始终落在字符边界上）
#[derive(Debug, Default, Clone)]
pub struct InputState {
    buffer: String,
    cursor: usize,
}

impl InputState {
    /// 使用初始值创建，光标在末尾
    pub fn with_value(value: &str) -> Self {
        Self {
            buffer: value.to_string(),
            cursor: value.len(),
        }
    }

    /// 清空输入
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// 插入字符
    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// 插入粘贴的文本
    ///
    /// 换行被丢弃；拖放文件到终端时常见的整体引号会被去掉。
    pub fn insert_pasted(&mut self, text: &str) {
        let single_line: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        let trimmed = single_line.trim();
        let unquoted = trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .unwrap_or(trimmed);

        self.buffer.insert_str(self.cursor, unquoted);
        self.cursor += unquoted.len();
    }

    /// 删除光标前字符
    pub fn delete_before_cursor(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    /// 删除光标后字符
    pub fn delete_after_cursor(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    /// 光标左移
    pub fn move_cursor_left(&mut self) {
        if let Some(c) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= c.len_utf8();
        }
    }

    /// 光标右移
    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// 移动到行首
    pub fn move_cursor_to_start(&mut self) {
        self.cursor = 0;
    }

    /// 移动到行尾
    pub fn move_cursor_to_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// 光标可视位置
    pub fn visual_cursor_position(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// 获取当前值
    pub fn value(&self) -> &str {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_multibyte() {
        let mut input = InputState::with_value("文档");
        input.move_cursor_left();
        input.insert_char('x');
        assert_eq!(input.value(), "文x档");
        assert_eq!(input.visual_cursor_position(), 3);

        input.delete_before_cursor();
        input.delete_after_cursor();
        assert_eq!(input.value(), "文");

        input.move_cursor_to_start();
        input.delete_before_cursor();
        assert_eq!(input.value(), "文");
    }

    #[test]
    fn test_paste_strips_quotes_and_newlines() {
        let mut input = InputState::default();
        input.insert_pasted("'/home/me/My Docs'\n");
        assert_eq!(input.value(), "/home/me/My Docs");

        input.clear();
        input.insert_pasted("\"C:\\Reports\\q1.docx\"");
        assert_eq!(input.value(), "C:\\Reports\\q1.docx");
    }

    #[test]
    fn test_paste_at_cursor() {
        let mut input = InputState::with_value("/tmp/.docx");
        for _ in 0..5 {
            input.move_cursor_left();
        }
        input.insert_pasted("report");
        assert_eq!(input.value(), "/tmp/report.docx");
        input.move_cursor_to_end();
        input.move_cursor_right();
        assert_eq!(input.visual_cursor_position(), 16);
    }
}
