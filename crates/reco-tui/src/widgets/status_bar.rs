//! Keys bar — bottom line with the input mode, the listing mode and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::shell::Mode;
use crate::theme::{
    C_MODE_DEFAULT, C_MODE_RECOMMEND, C_MODE_SEARCH, C_MUTED, C_SECONDARY, C_SEPARATOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keystrokes go to the search box.
    Search,
}

impl InputMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Search => "TYPE",
        }
    }
}

pub fn mode_color(mode: Mode) -> ratatui::style::Color {
    match mode {
        Mode::Default => C_MODE_DEFAULT,
        Mode::Search => C_MODE_SEARCH,
        Mode::Recommend => C_MODE_RECOMMEND,
    }
}

fn key_hints(input: InputMode) -> &'static str {
    match input {
        InputMode::Normal => {
            " ↑↓/jk move  ←→/hl page  Enter recommend  y copy  / search  Tab pane  K keys  L logs  ? help  q quit"
        }
        InputMode::Search => {
            " type to search  ↑↓ pick  Enter select  PgUp/PgDn matches page  Esc close/clear/leave  Tab pane"
        }
    }
}

/// Draw the keybindings footer (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, input: InputMode, mode: Mode) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", input.label()),
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled("│", Style::default().fg(C_SEPARATOR)),
        Span::styled(
            format!(" {} ", mode.label()),
            Style::default()
                .fg(mode_color(mode))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(key_hints(input), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
