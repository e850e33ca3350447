//! SearchBox component — debounced song search with a paged dropdown.
//!
//! Typing re-arms the debouncer; when it fires, the box emits a
//! `SearchDropdown` ticket for the app loop to run (and, when the query
//! changed, an `EnterSearch` so the main list follows). Results come back through
//! [`SearchBox::on_results`] and are dropped unless they belong to the latest
//! request. Picking a row clears everything and emits `SelectSong`.

use std::time::{Duration, Instant};

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::debug;

use reco_proto::error::ApiError;
use reco_proto::model::SearchResult;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    debounce::Debouncer,
    shell::{Query, Ticket},
    theme::{
        style_focused_border, style_selected_focused, C_BG, C_ERROR, C_MUTED, C_PRIMARY,
        C_SECONDARY,
    },
    widgets::{
        pager::{contains, Pager, PagerClick, PagerHits},
        pane_chrome::{pane_chrome, Badge},
        search_input::{InputAction, SearchInput},
        text::{fit, width},
    },
};

#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub min_query_len: usize,
    pub debounce: Duration,
    pub per_page: u32,
}

/// Rects from the last dropdown draw, for mouse hit-testing.
#[derive(Debug, Default)]
struct DropdownHits {
    area: Rect,
    rows: Vec<(usize, Rect)>,
    pager: PagerHits,
}

pub struct SearchBox {
    input: SearchInput,
    settings: SearchSettings,
    debounce: Debouncer<String>,
    /// Query of the latest issued request.
    active_query: String,
    /// Last query handed to the main list.
    announced: String,
    page: u32,
    results: Vec<SearchResult>,
    highlighted: usize,
    loading: bool,
    error: Option<String>,
    /// A request for the current query has completed.
    searched: bool,
    expanded: bool,
    generation: u64,
    hits: DropdownHits,
}

impl SearchBox {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            input: SearchInput::default(),
            settings,
            debounce: Debouncer::new(settings.debounce),
            active_query: String::new(),
            announced: String::new(),
            page: 1,
            results: Vec::new(),
            highlighted: 0,
            loading: false,
            error: None,
            searched: false,
            expanded: false,
            generation: 0,
            hits: DropdownHits::default(),
        }
    }

    // ── Query editing ─────────────────────────────────────────────────────────

    /// The text changed. Short queries clear everything and cancel any pending
    /// or in-flight search; longer ones (re)arm the debouncer at page 1.
    pub fn set_query(&mut self, text: &str, now: Instant) -> Vec<Action> {
        self.page = 1;
        self.highlighted = 0;
        self.expanded = true;

        let query = text.trim();
        if query.chars().count() < self.settings.min_query_len {
            self.reset_results();
            return Vec::new();
        }
        self.debounce.schedule(query.to_string(), now);
        self.tick_at(now)
    }

    /// Fire the debounced search if its quiet period has passed.
    pub fn tick_at(&mut self, now: Instant) -> Vec<Action> {
        let Some(query) = self.debounce.poll(now) else {
            return Vec::new();
        };
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.active_query = query.clone();
        debug!(
            "[search] dropdown fetch {:?} p{} gen={}",
            query, self.page, self.generation
        );

        // Paging the dropdown leaves the main list where it is.
        let mut actions = Vec::with_capacity(2);
        if query != self.announced {
            self.announced = query.clone();
            actions.push(Action::EnterSearch(query.clone()));
        }
        actions.push(Action::SearchDropdown(Ticket {
            generation: self.generation,
            query: Query::Search {
                query,
                page: self.page,
                per_page: self.settings.per_page,
            },
        }));
        actions
    }

    /// Deliver a completed dropdown request. Returns false when it was stale.
    pub fn on_results(
        &mut self,
        ticket: &Ticket,
        result: Result<Vec<SearchResult>, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "[search] dropping stale results gen={} p{}",
                ticket.generation,
                ticket.query.page()
            );
            return false;
        }
        self.loading = false;
        self.searched = true;
        match result {
            Ok(results) => {
                self.results = results;
                self.error = None;
            }
            Err(e) => {
                self.results.clear();
                self.error = Some(e.summary());
            }
        }
        self.highlighted = self.highlighted.min(self.results.len().saturating_sub(1));
        true
    }

    // ── Dropdown paging ───────────────────────────────────────────────────────

    pub fn pager(&self) -> Pager {
        let full_page = self.results.len() as u32 >= self.settings.per_page;
        Pager::open(self.page, full_page, self.loading)
    }

    pub fn next_page(&mut self, now: Instant) -> Vec<Action> {
        if !self.pager().next_enabled() || self.active_query.is_empty() {
            return Vec::new();
        }
        self.turn_page(self.page + 1, now)
    }

    pub fn prev_page(&mut self, now: Instant) -> Vec<Action> {
        if !self.pager().prev_enabled() || self.active_query.is_empty() {
            return Vec::new();
        }
        self.turn_page(self.page - 1, now)
    }

    fn turn_page(&mut self, page: u32, now: Instant) -> Vec<Action> {
        self.page = page;
        self.highlighted = 0;
        self.debounce.schedule(self.active_query.clone(), now);
        self.tick_at(now)
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    /// Pick result `idx`: clear the box and hand the song to the shell.
    pub fn select(&mut self, idx: usize) -> Vec<Action> {
        let Some(song) = self.results.get(idx).map(|r| r.track_name.clone()) else {
            return Vec::new();
        };
        debug!("[search] selected {:?}", song);
        self.input.clear();
        self.page = 1;
        self.reset_results();
        vec![
            Action::SelectSong(song),
            Action::FocusPane(ComponentId::RecommendationList),
        ]
    }

    fn reset_results(&mut self) {
        self.debounce.cancel();
        // Anything still in flight is for a query we no longer show.
        self.generation += 1;
        self.results.clear();
        self.active_query.clear();
        self.announced.clear();
        self.highlighted = 0;
        self.loading = false;
        self.error = None;
        self.searched = false;
        self.expanded = false;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }

    // ── Read access ───────────────────────────────────────────────────────────

    pub fn text(&self) -> &str {
        self.input.text()
    }

    #[cfg(test)]
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    #[cfg(test)]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[cfg(test)]
    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[cfg(test)]
    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    /// Whether the dropdown has anything to show.
    pub fn dropdown_open(&self) -> bool {
        self.expanded && (self.loading || self.searched || !self.results.is_empty())
    }

    /// Screen area of the dropdown from the last draw (empty when hidden).
    pub fn dropdown_area(&self) -> Rect {
        self.hits.area
    }

    // ── Dropdown rendering ────────────────────────────────────────────────────

    /// Draw the dropdown below `anchor`, clipped to `bounds`. Drawn after the
    /// list so it overlays it.
    pub fn draw_dropdown(&mut self, frame: &mut Frame, anchor: Rect, bounds: Rect, focused: bool) {
        self.hits = DropdownHits::default();
        if !focused || !self.dropdown_open() {
            return;
        }

        let cols = anchor.width.saturating_sub(2) as usize;
        let mut lines: Vec<Line> = Vec::new();
        let mut row_items: Vec<Option<usize>> = Vec::new();
        if let Some(err) = &self.error {
            lines.push(Line::from(Span::styled(
                format!(" ✗ {}", err),
                Style::default().fg(C_ERROR),
            )));
            row_items.push(None);
        } else if self.results.is_empty() {
            let text = if self.loading {
                " Searching..."
            } else {
                " No results found"
            };
            lines.push(Line::from(Span::styled(text, Style::default().fg(C_MUTED))));
            row_items.push(None);
        } else {
            for (i, r) in self.results.iter().enumerate() {
                let style = if i == self.highlighted {
                    style_selected_focused()
                } else {
                    Style::default().fg(C_PRIMARY)
                };
                let title = format!(" {}", r.track_name);
                let artist = format!("  {}", r.artist);
                let details = r
                    .details()
                    .into_iter()
                    .map(|(label, value)| format!("{}: {}", label, value))
                    .collect::<Vec<_>>()
                    .join(" · ");
                let mut spans = vec![
                    Span::styled(title.clone(), style),
                    Span::styled(artist.clone(), Style::default().fg(C_SECONDARY)),
                ];
                let room = cols.saturating_sub(width(&title) + width(&artist) + 2);
                if !details.is_empty() && room > 1 {
                    spans.push(Span::styled(
                        format!("  {}", fit(&details, room)),
                        Style::default().fg(C_MUTED),
                    ));
                }
                lines.push(Line::from(spans));
                row_items.push(Some(i));
            }
        }

        // rows + pager row + borders
        let height = (lines.len() as u16 + 3).min(bounds.bottom().saturating_sub(anchor.bottom()));
        if height < 3 {
            return;
        }
        let area = Rect {
            x: anchor.x,
            y: anchor.bottom(),
            width: anchor.width,
            height,
        };
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(style_focused_border())
            .style(Style::default().bg(C_BG));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let list_h = inner.height.saturating_sub(1);
        let rows = Rect {
            height: list_h,
            ..inner
        };
        frame.render_widget(Paragraph::new(lines), rows);
        let pager_row = Rect {
            y: inner.y + list_h,
            height: inner.height.min(1),
            ..inner
        };

        self.hits.area = area;
        self.hits.rows = row_items
            .into_iter()
            .enumerate()
            .take(list_h as usize)
            .filter_map(|(line, item)| {
                item.map(|i| (i, Rect::new(rows.x, rows.y + line as u16, rows.width, 1)))
            })
            .collect();
        self.hits.pager = self.pager().draw(frame, pager_row);
    }
}

impl Component for SearchBox {
    fn id(&self) -> ComponentId {
        ComponentId::SearchBox
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let now = Instant::now();
        match key.code {
            KeyCode::Esc if self.dropdown_open() => {
                self.collapse();
                vec![]
            }
            KeyCode::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
                vec![]
            }
            KeyCode::Down => {
                if !self.dropdown_open() && !self.results.is_empty() {
                    self.expanded = true;
                } else if self.highlighted + 1 < self.results.len() {
                    self.highlighted += 1;
                }
                vec![]
            }
            KeyCode::Enter => {
                if self.dropdown_open() {
                    self.select(self.highlighted)
                } else {
                    self.expanded = true;
                    vec![]
                }
            }
            KeyCode::PageDown => self.next_page(now),
            KeyCode::PageUp => self.prev_page(now),
            _ => match self.input.handle_key(key) {
                InputAction::Changed(text) => self.set_query(&text, now),
                InputAction::Cancelled => vec![Action::FocusPane(ComponentId::RecommendationList)],
                InputAction::None => vec![],
            },
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, area: Rect, _state: &AppState) -> Vec<Action> {
        let (col, row) = (event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(&(idx, _)) = self.hits.rows.iter().find(|(_, r)| contains(*r, col, row)) {
                    return self.select(idx);
                }
                match self.hits.pager.click(&self.pager(), col, row) {
                    Some(PagerClick::Next) => return self.next_page(Instant::now()),
                    Some(PagerClick::Prev) => return self.prev_page(Instant::now()),
                    None => {}
                }
                if contains(area, col, row) {
                    self.expanded = true;
                }
                vec![]
            }
            MouseEventKind::ScrollDown if contains(self.hits.area, col, row) => {
                if self.highlighted + 1 < self.results.len() {
                    self.highlighted += 1;
                }
                vec![]
            }
            MouseEventKind::ScrollUp if contains(self.hits.area, col, row) => {
                self.highlighted = self.highlighted.saturating_sub(1);
                vec![]
            }
            _ => vec![],
        }
    }

    fn tick(&mut self, _state: &AppState) -> Vec<Action> {
        self.tick_at(Instant::now())
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::CollapseDropdown = action {
            self.collapse();
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, _state: &AppState) {
        let badge = if self.loading {
            Some(Badge {
                text: "…",
                color: C_SECONDARY,
            })
        } else if self.error.is_some() {
            Some(Badge {
                text: "ERR",
                color: C_ERROR,
            })
        } else if !self.results.is_empty() {
            Some(Badge {
                text: "MATCHES",
                color: C_MUTED,
            })
        } else {
            None
        };
        let block = pane_chrome("search", Some('1'), focused, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 {
            return;
        }
        let field = Rect { height: 1, ..inner };
        self.input
            .draw(frame, field, focused, self.loading || self.is_pending());

        let typed = self.text().trim().chars().count();
        if inner.height > 1 && focused && typed > 0 && typed < self.settings.min_query_len {
            let hint = Rect {
                y: inner.y + 1,
                height: 1,
                ..inner
            };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" type at least {} characters", self.settings.min_query_len),
                    Style::default().fg(C_MUTED).add_modifier(Modifier::ITALIC),
                )),
                hint,
            );
        }
    }
}
