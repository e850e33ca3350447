//! LogPanel component — session event log (requests, cache hits, failures).

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{C_ERROR, C_MUTED, C_SECONDARY},
    widgets::{pane_chrome::pane_chrome, text::fit},
};

pub struct LogPanel {
    /// First visible line; `usize::MAX` pins to the bottom.
    scroll: usize,
    /// Text rows from the last draw.
    view_height: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            scroll: usize::MAX,
            view_height: 0,
        }
    }

    fn follow(&mut self) {
        self.scroll = usize::MAX;
    }

    /// Move the first visible line by `delta`, starting from where the view
    /// actually is. Reaching the last page pins to the bottom again.
    fn scroll_by(&mut self, delta: isize, count: usize) {
        let current = clamp_scroll(self.scroll, count, self.view_height);
        let max_scroll = count.saturating_sub(self.view_height);
        let next = current.saturating_add_signed(delta);
        if delta > 0 && next >= max_scroll {
            self.follow();
        } else {
            self.scroll = next.min(max_scroll);
        }
    }
}

/// Clamp `scroll` so the last page of `count` lines fills `height` rows.
fn clamp_scroll(scroll: usize, count: usize, height: usize) -> usize {
    scroll.min(count.saturating_sub(height))
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let count = state.logs.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1, count),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1, count),
            KeyCode::PageUp => self.scroll_by(-10, count),
            KeyCode::PageDown => self.scroll_by(10, count),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.follow(),
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let count = state.logs.len();
        match event.kind {
            MouseEventKind::ScrollUp => self.scroll_by(-1, count),
            MouseEventKind::ScrollDown => self.scroll_by(1, count),
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleLogs = action {
            self.follow();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);
        let block = pane_chrome("log", Some('3'), focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let logs = &state.logs;
        self.view_height = inner.height as usize;
        if logs.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled("  no events yet", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        }

        let height = self.view_height;
        let start = clamp_scroll(self.scroll, logs.len(), height);
        let cols = inner.width.saturating_sub(2) as usize;

        let lines: Vec<Line> = logs
            .iter()
            .skip(start)
            .take(height)
            .map(|msg| {
                let color = if msg.contains(" failed") || msg.contains(" error") {
                    C_ERROR
                } else {
                    C_SECONDARY
                };
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(fit(msg, cols), Style::default().fg(color)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::test_support;
    use ratatui::backend::TestBackend;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::Terminal;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with_lines(n: usize) -> AppState {
        let mut state = test_support::state();
        for i in 0..n {
            state.push_log(format!("line {:02}", i));
        }
        state
    }

    fn render(panel: &mut LogPanel, state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                panel.draw(f, area, true, state)
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_clamp_scroll() {
        assert_eq!(clamp_scroll(usize::MAX, 30, 10), 20);
        assert_eq!(clamp_scroll(3, 30, 10), 3);
        assert_eq!(clamp_scroll(5, 4, 10), 0);
    }

    #[test]
    fn test_scrolling_up_leaves_bottom_pin() {
        let state = with_lines(30);
        let mut panel = LogPanel::new();
        panel.handle_key(key(KeyCode::Up), &state);
        assert_eq!(panel.scroll, 29);
        panel.handle_key(key(KeyCode::Char('G')), &state);
        assert_eq!(panel.scroll, usize::MAX);
    }

    #[test]
    fn test_scroll_up_survives_redraws() {
        // 10 rows minus borders: 8 lines visible, bottom page starts at 22.
        let state = with_lines(30);
        let mut panel = LogPanel::new();
        let screen = render(&mut panel, &state);
        assert!(screen.contains("line 29"));

        for _ in 0..3 {
            panel.handle_key(key(KeyCode::Up), &state);
            render(&mut panel, &state);
        }
        assert_eq!(panel.scroll, 19);
        let screen = render(&mut panel, &state);
        assert!(screen.contains("line 19"));
        assert!(!screen.contains("line 29"));

        let mouse = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        panel.handle_mouse(mouse, Rect::default(), &state);
        render(&mut panel, &state);
        assert_eq!(panel.scroll, 18);
    }

    #[test]
    fn test_scrolling_down_to_last_page_pins_again() {
        let state = with_lines(30);
        let mut panel = LogPanel::new();
        render(&mut panel, &state);
        panel.handle_key(key(KeyCode::Up), &state);
        panel.handle_key(key(KeyCode::Up), &state);
        assert_eq!(panel.scroll, 20);
        panel.handle_key(key(KeyCode::Down), &state);
        assert_eq!(panel.scroll, 21);
        panel.handle_key(key(KeyCode::Down), &state);
        assert_eq!(panel.scroll, usize::MAX);

        // New lines keep showing while pinned.
        let mut state = state;
        state.push_log("line 30".to_string());
        assert!(render(&mut panel, &state).contains("line 30"));
    }
}
