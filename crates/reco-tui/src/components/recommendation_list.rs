//! RecommendationList component — the main pane.
//!
//! Renders whatever the page shell currently holds: skeleton cards while
//! loading, the error of a failed request, or one card per song with its
//! metadata and score. Paging goes back to the shell through actions.

use std::sync::Arc;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use reco_proto::model::Recommendation;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    cache::Page,
    component::Component,
    shell::Mode,
    theme::{
        C_ERROR, C_MUTED, C_PRIMARY, C_SCORE, C_SECONDARY, C_SELECTION_BG, C_SKELETON,
        C_SKELETON_PULSE, C_TAG,
    },
    widgets::{
        pager::{contains, PagerClick, PagerHits},
        pane_chrome::{pane_chrome, Badge},
        status_bar::mode_color,
        text::{fit, width},
    },
};

/// Rows per card: title, artist, details.
const CARD_H: u16 = 3;

pub struct RecommendationList {
    highlighted: usize,
    scroll: usize,
    /// Items the highlight refers to; a new page resets it.
    shown: Option<Page>,
    pager_hits: PagerHits,
    card_rects: Vec<(usize, Rect)>,
}

impl RecommendationList {
    pub fn new() -> Self {
        Self {
            highlighted: 0,
            scroll: 0,
            shown: None,
            pager_hits: PagerHits::default(),
            card_rects: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    fn sync(&mut self, state: &AppState) {
        let items = state.shell.items();
        let same = self.shown.as_ref().is_some_and(|s| Arc::ptr_eq(s, items));
        if !same {
            self.shown = Some(items.clone());
            self.highlighted = 0;
            self.scroll = 0;
        }
    }

    fn current<'a>(&self, state: &'a AppState) -> Option<&'a Recommendation> {
        if state.shell.loading() {
            return None;
        }
        state.shell.items().get(self.highlighted)
    }

    fn move_highlight(&mut self, delta: isize, state: &AppState) {
        let len = state.shell.items().len();
        if len == 0 {
            return;
        }
        let next = (self.highlighted as isize + delta).clamp(0, len as isize - 1);
        self.highlighted = next as usize;
    }

    fn page_action(&self, forward: bool, state: &AppState) -> Vec<Action> {
        let pager = state.shell.pager();
        match forward {
            true if pager.next_enabled() => vec![Action::NextPage],
            false if pager.prev_enabled() => vec![Action::PrevPage],
            _ => vec![],
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw_cards(&mut self, frame: &mut Frame, area: Rect, focused: bool, items: &[Recommendation]) {
        let visible = (area.height / CARD_H).max(1) as usize;
        self.scroll = scroll_for(self.highlighted, self.scroll, visible);

        for (slot, (idx, rec)) in items
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(visible)
            .enumerate()
        {
            let rect = Rect {
                y: area.y + slot as u16 * CARD_H,
                height: CARD_H.min(area.bottom().saturating_sub(area.y + slot as u16 * CARD_H)),
                ..area
            };
            if rect.height == 0 {
                break;
            }
            let selected = idx == self.highlighted;
            frame.render_widget(card(rec, idx, selected && focused, rect.width), rect);
            self.card_rects.push((idx, rect));
        }
    }
}

/// Keep `highlighted` inside a window of `visible` cards starting at `scroll`.
pub fn scroll_for(highlighted: usize, scroll: usize, visible: usize) -> usize {
    if highlighted < scroll {
        highlighted
    } else if highlighted >= scroll + visible {
        highlighted + 1 - visible
    } else {
        scroll
    }
}

fn card(rec: &Recommendation, idx: usize, selected: bool, width_cols: u16) -> Paragraph<'static> {
    let w = width_cols as usize;
    let score = rec
        .score_percent()
        .map(|p| format!(" {}% ", p))
        .unwrap_or_default();
    let prefix = format!(" {:>2}  ", idx + 1);
    let title_room = w.saturating_sub(width(&prefix) + width(&score) + 1);
    let title = fit(&rec.track_name, title_room);
    let pad = w.saturating_sub(width(&prefix) + width(&title) + width(&score));

    let title_line = Line::from(vec![
        Span::styled(prefix.clone(), Style::default().fg(C_MUTED)),
        Span::styled(
            title,
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(pad)),
        Span::styled(
            score,
            Style::default().fg(C_SCORE).add_modifier(Modifier::BOLD),
        ),
    ]);

    let indent = " ".repeat(width(&prefix));
    let artist_line = Line::from(vec![
        Span::raw(indent.clone()),
        Span::styled(
            fit(&rec.artist, w.saturating_sub(indent.len())),
            Style::default().fg(C_SECONDARY),
        ),
    ]);

    let mut detail_spans = vec![Span::raw(indent.clone())];
    for (i, (label, value)) in rec.details().into_iter().enumerate() {
        if i > 0 {
            detail_spans.push(Span::styled(" · ", Style::default().fg(C_MUTED)));
        }
        detail_spans.push(Span::styled(format!("{}: ", label), Style::default().fg(C_MUTED)));
        detail_spans.push(Span::styled(value, Style::default().fg(C_TAG)));
    }

    let style = if selected {
        Style::default().bg(C_SELECTION_BG)
    } else {
        Style::default()
    };
    Paragraph::new(vec![title_line, artist_line, Line::from(detail_spans)]).style(style)
}

fn skeleton(idx: usize, pulse: bool, width_cols: u16) -> Paragraph<'static> {
    let color = if pulse { C_SKELETON_PULSE } else { C_SKELETON };
    let room = (width_cols as usize).saturating_sub(6);
    let title_w = (18 + (idx * 7) % 14).min(room);
    let artist_w = (10 + (idx * 5) % 9).min(room);
    let detail_w = (26 + (idx * 3) % 11).min(room);
    let bar = |n: usize| Span::styled("▆".repeat(n), Style::default().fg(color));
    Paragraph::new(vec![
        Line::from(vec![Span::raw("      "), bar(title_w)]),
        Line::from(vec![Span::raw("      "), bar(artist_w)]),
        Line::from(vec![Span::raw("      "), bar(detail_w)]),
    ])
}

impl Component for RecommendationList {
    fn id(&self) -> ComponentId {
        ComponentId::RecommendationList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        self.sync(state);
        match key.code {
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('[') => self.page_action(false, state),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(']') => self.page_action(true, state),
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_highlight(-1, state);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_highlight(1, state);
                vec![]
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.highlighted = 0;
                vec![]
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.highlighted = state.shell.items().len().saturating_sub(1);
                vec![]
            }
            KeyCode::Char('y') => match self.current(state) {
                Some(rec) => vec![Action::CopyToClipboard(rec.label())],
                None => vec![],
            },
            KeyCode::Enter => match self.current(state) {
                Some(rec) => vec![Action::SelectSong(rec.track_name.clone())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        self.sync(state);
        let (col, row) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                match self.pager_hits.click(&state.shell.pager(), col, row) {
                    Some(PagerClick::Prev) => return vec![Action::PrevPage],
                    Some(PagerClick::Next) => return vec![Action::NextPage],
                    None => {}
                }
                if let Some(&(idx, _)) = self.card_rects.iter().find(|(_, r)| contains(*r, col, row)) {
                    self.highlighted = idx;
                }
                vec![]
            }
            MouseEventKind::ScrollDown => {
                self.move_highlight(1, state);
                vec![]
            }
            MouseEventKind::ScrollUp => {
                self.move_highlight(-1, state);
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        self.sync(state);
        self.card_rects.clear();
        self.pager_hits = PagerHits::default();

        let shell = &state.shell;
        let mode = shell.mode();
        let title = match mode {
            Mode::Default => "discover",
            Mode::Search => "search results",
            Mode::Recommend => "recommendations",
        };
        let badge = if shell.error().is_some() {
            Badge {
                text: "ERR",
                color: C_ERROR,
            }
        } else {
            Badge {
                text: mode.label(),
                color: mode_color(mode),
            }
        };
        let block = pane_chrome(title, Some('2'), focused, Some(badge));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 3 {
            return;
        }

        // context line | cards | pager
        let context = Rect { height: 1, ..inner };
        let body = Rect {
            y: inner.y + 2,
            height: inner.height - 3,
            ..inner
        };
        let pager_row = Rect {
            y: inner.bottom() - 1,
            height: 1,
            ..inner
        };

        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {}", fit(&shell.context_label(), inner.width.saturating_sub(1) as usize)),
                Style::default().fg(C_MUTED).add_modifier(Modifier::ITALIC),
            )),
            context,
        );

        if shell.loading() {
            let pulse = (state.frame_count / 5) % 2 == 1;
            let visible = (body.height / CARD_H) as usize;
            for i in 0..state.skeleton_count.min(visible) {
                let rect = Rect {
                    y: body.y + i as u16 * CARD_H,
                    height: CARD_H,
                    ..body
                };
                frame.render_widget(skeleton(i, pulse, rect.width), rect);
            }
        } else if let Some(err) = shell.error() {
            frame.render_widget(
                Paragraph::new(vec![
                    Line::from(Span::styled(
                        format!(" ✗ {}", err),
                        Style::default().fg(C_ERROR).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!(" api: {}", state.api_base_url),
                        Style::default().fg(C_MUTED),
                    )),
                ]),
                body,
            );
        } else if shell.items().is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" nothing to show", Style::default().fg(C_MUTED))),
                body,
            );
        } else {
            let items = shell.items().clone();
            self.draw_cards(frame, body, focused, &items);
        }

        self.pager_hits = shell.pager().draw(frame, pager_row);
    }
}

impl Default for RecommendationList {
    fn default() -> Self {
        Self::new()
    }
}
