//! Single-line requirement input

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input that can be disabled while a request is outstanding
#[derive(Debug)]
pub struct InputBox {
    content: String,
    /// Cursor position in chars, not bytes
    cursor: usize,
    /// Horizontal scroll offset in display columns
    scroll: usize,
    placeholder: String,
    title: String,
    enabled: bool,
    /// Shown instead of the placeholder while disabled
    disabled_hint: String,
}

impl Default for InputBox {
    fn default() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            scroll: 0,
            placeholder: String::new(),
            title: String::new(),
            enabled: true,
            disabled_hint: String::new(),
        }
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) {
        self.placeholder = placeholder.into();
    }

    /// Border title, e.g. which kind of input is expected
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Enable or disable submissions; `hint` explains why input is disabled.
    /// A disabled box still takes a slash command.
    pub fn set_enabled(&mut self, enabled: bool, hint: impl Into<String>) {
        self.enabled = enabled;
        self.disabled_hint = hint.into();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Take the content, leaving the box empty
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        self.scroll = 0;
        content
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn cursor_display_width(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    /// Whether the content is a slash command
    pub fn is_command(&self) -> bool {
        self.content.starts_with('/')
    }

    /// Disabled boxes only edit a line that starts with '/'
    fn accepts(&self, action: &Action) -> bool {
        if self.enabled || self.is_command() {
            return true;
        }
        match action {
            Action::Char(c) => self.content.is_empty() && *c == '/',
            Action::Paste(text) => self.content.is_empty() && text.starts_with('/'),
            _ => false,
        }
    }

    /// Handle an editing action. Returns false if the action was not consumed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        if !self.accepts(action) {
            return false;
        }
        let char_count = self.content.chars().count();

        let handled = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.remove_at_cursor();
                true
            }
            Action::Delete if self.cursor < char_count => {
                self.remove_at_cursor();
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < char_count => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = char_count;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                let range = self.byte_offset(start)..self.byte_offset(self.cursor);
                self.content.drain(range);
                self.cursor = start;
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if !self.content.ends_with(' ') && self.cursor > 0 {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };

        if handled {
            self.update_scroll(width as usize);
        }
        handled
    }

    fn insert_char(&mut self, c: char) {
        let offset = self.byte_offset(self.cursor);
        self.content.insert(offset, c);
        self.cursor += 1;
    }

    fn remove_at_cursor(&mut self) {
        let start = self.byte_offset(self.cursor);
        let end = self.byte_offset(self.cursor + 1);
        self.content.drain(start..end);
    }

    fn update_scroll(&mut self, width: usize) {
        // Borders plus a column for the cursor
        let visible_width = width.saturating_sub(4).max(1);
        let cursor_pos = self.cursor_display_width();

        if cursor_pos < self.scroll {
            self.scroll = cursor_pos;
        } else if cursor_pos >= self.scroll + visible_width {
            self.scroll = cursor_pos - visible_width + 1;
        }
    }

    fn visible_content(&self, visible_width: usize) -> String {
        let mut skipped = 0;
        let mut used = 0;
        let mut visible = String::new();
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if skipped < self.scroll {
                skipped += w;
                continue;
            }
            if used + w > visible_width {
                break;
            }
            visible.push(c);
            used += w;
        }
        visible
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.enabled {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        if !self.title.is_empty() {
            block = block.title(format!(" {} ", self.title));
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let (text, style) = if !self.enabled && self.content.is_empty() {
            (self.disabled_hint.clone(), theme.dim_style())
        } else if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_content(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if (self.enabled || !self.content.is_empty()) && inner.width > 0 {
            let cursor_x = self.cursor_display_width().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let x = inner.x + cursor_x as u16;
                if let Some(cell) = buf.cell_mut((x, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
        input
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("GRPO!");
        assert!(input.handle_action(&Action::Backspace, 80));
        assert_eq!(input.content(), "GRPO");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut input = typed("强化学习");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "强化习");
        input.handle_action(&Action::Home, 80);
        input.handle_action(&Action::Delete, 80);
        assert_eq!(input.content(), "化习");
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("improve GRPO  ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "improve ");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = typed("a");
        input.handle_action(&Action::Paste("b\r\nc".into()), 80);
        assert_eq!(input.content(), "ab c");
    }

    #[test]
    fn test_disabled_ignores_edits() {
        let mut input = typed("RL");
        input.set_enabled(false, "Clarifying...");
        assert!(!input.handle_action(&Action::Char('x'), 80));
        assert_eq!(input.content(), "RL");
        input.set_enabled(true, "");
        assert_eq!(input.take(), "RL");
        assert!(input.content().is_empty());
    }

    #[test]
    fn test_disabled_still_takes_slash_command() {
        let mut input = InputBox::new();
        input.set_enabled(false, "Waiting for the service...");
        assert!(!input.handle_action(&Action::Char('s'), 80));
        assert!(input.handle_action(&Action::Char('/'), 80));
        assert!(input.handle_action(&Action::Char('s'), 80));
        assert!(input.handle_action(&Action::Backspace, 80));
        assert_eq!(input.content(), "/");
        assert!(input.is_command());

        // Erasing the slash ends command editing
        assert!(input.handle_action(&Action::Backspace, 80));
        assert!(!input.handle_action(&Action::Char('x'), 80));
        assert!(input.content().is_empty());
    }
}
