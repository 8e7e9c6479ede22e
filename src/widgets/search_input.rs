use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use tui_textarea::{Input, Key, TextArea};

use crate::config::Theme;

/// Event emitted by SearchInput
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInputEvent {
    None,
    /// The text changed
    Changed,
    /// Enter pressed
    Submit,
    /// Esc pressed
    Cancel,
}

/// Single-line search field wrapping tui-textarea
pub struct SearchInput {
    textarea: TextArea<'static>,
    value: String,
    placeholder: String,
    text_color: Option<Color>,
    placeholder_color: Color,
    cursor_focused: Option<Color>,
    focused: bool,
}

impl SearchInput {
    pub fn new() -> Self {
        let mut widget = Self {
            textarea: TextArea::default(),
            value: String::new(),
            placeholder: String::new(),
            text_color: None,
            placeholder_color: Color::DarkGray,
            cursor_focused: None,
            focused: false,
        };
        widget.apply_styles();
        widget
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self.apply_styles();
        self
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.text_color = Some(theme.get("text_primary"));
        self.placeholder_color = theme.get("dimmed");
        self.cursor_focused = Some(theme.get("cursor_focused"));
        self.apply_styles();
        self
    }

    fn apply_styles(&mut self) {
        let mut style = Style::default();
        if let Some(text_color) = self.text_color {
            style = style.fg(text_color);
        }
        self.textarea.set_style(style);
        // No underline on the cursor line
        self.textarea.set_cursor_line_style(Style::default());
        self.textarea.set_placeholder_text(self.placeholder.clone());
        self.textarea
            .set_placeholder_style(Style::default().fg(self.placeholder_color));
        self.apply_cursor_style();
    }

    /// Hide the cursor when unfocused by giving it the text style.
    fn apply_cursor_style(&mut self) {
        let cursor_style = if self.focused {
            match self.cursor_focused.unwrap_or(Color::Reset) {
                Color::Reset => Style::default().add_modifier(Modifier::REVERSED),
                color => Style::default().bg(color),
            }
        } else {
            self.textarea.style()
        };
        self.textarea.set_cursor_style(cursor_style);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.apply_cursor_style();
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the text and move the cursor to the end
    pub fn set_value(&mut self, value: &str) {
        let single_line = value.replace(['\n', '\r'], " ");
        self.textarea = TextArea::new(vec![single_line.clone()]);
        self.value = single_line;
        self.apply_styles();
        self.textarea.move_cursor(tui_textarea::CursorMove::End);
    }

    pub fn handle_key(&mut self, event: &KeyEvent) -> SearchInputEvent {
        match event.code {
            KeyCode::Enter => return SearchInputEvent::Submit,
            KeyCode::Esc => return SearchInputEvent::Cancel,
            _ => {}
        }

        let input = key_event_to_input(event);
        if matches!(input.key, Key::Null | Key::Char('\n') | Key::Char('\r')) {
            return SearchInputEvent::None;
        }
        self.textarea.input(input);

        let value = self.textarea.lines().first().cloned().unwrap_or_default();
        if value != self.value {
            self.value = value;
            SearchInputEvent::Changed
        } else {
            SearchInputEvent::None
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert crossterm KeyEvent to tui_textarea::Input
fn key_event_to_input(event: &KeyEvent) -> Input {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);

    let key = match event.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Esc,
        // Single line: vertical movement, paging and tabs do nothing
        _ => Key::Null,
    };

    Input {
        key,
        ctrl,
        alt,
        shift,
    }
}

impl Widget for &SearchInput {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        self.textarea.render(area, buf);
    }
}
