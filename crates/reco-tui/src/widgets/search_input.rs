//! SearchInput — tui-input text field used by the search box.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_INPUT_BG, C_INPUT_FG, C_MUTED, C_SECONDARY};

pub enum InputAction {
    /// Text changed; carries the new value.
    Changed(String),
    /// Esc on an empty field.
    Cancelled,
    None,
}

pub struct SearchInput {
    input: Input,
    placeholder: String,
}

impl SearchInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            placeholder: placeholder.into(),
        }
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn is_empty(&self) -> bool {
        self.input.value().is_empty()
    }

    /// Esc clears the text first; a second Esc on the empty field cancels.
    /// Enter and navigation keys are the caller's business.
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Esc => {
                if self.is_empty() {
                    InputAction::Cancelled
                } else {
                    self.clear();
                    InputAction::Changed(String::new())
                }
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() != before {
                    InputAction::Changed(self.input.value().to_string())
                } else {
                    InputAction::None
                }
            }
        }
    }

    /// Render the field into a single row; places the cursor when focused.
    pub fn draw(&self, frame: &mut Frame, area: Rect, focused: bool, busy: bool) {
        let prefix = if busy { " ⟳ " } else { " ⌕ " };
        let prefix_w = prefix.chars().count();
        let scroll = self
            .input
            .visual_scroll(area.width.saturating_sub(prefix_w as u16 + 1) as usize);
        let value = self.input.value();

        let body = if value.is_empty() {
            Span::styled(self.placeholder.clone(), Style::default().fg(C_MUTED))
        } else {
            Span::styled(
                value.chars().skip(scroll).collect::<String>(),
                Style::default().fg(C_INPUT_FG),
            )
        };

        let line = Line::from(vec![
            Span::styled(prefix, Style::default().fg(C_SECONDARY)),
            body,
        ]);
        frame.render_widget(
            Paragraph::new(line).style(Style::default().bg(C_INPUT_BG)),
            area,
        );

        if focused && area.width > 0 {
            let cursor_x =
                area.x + prefix_w as u16 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(area.x + area.width - 1), area.y));
        }
    }
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new("Search for a song...")
    }
}
