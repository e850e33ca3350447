//! Pager — Prev / "Page N of M" / Next control row.
//!
//! Two flavours: `bounded` when a page count is known (main list), `open`
//! when the only signal is whether the last page came back full (search
//! dropdown). Drawing returns the button rects for mouse hit-testing.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_PRIMARY, C_SECONDARY, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: u32,
    pub last_page: Option<u32>,
    pub has_more: bool,
    pub loading: bool,
}

/// Screen rects of the two buttons from the last draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagerHits {
    pub prev: Rect,
    pub next: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerClick {
    Prev,
    Next,
}

const PREV_LABEL: &str = " ‹ Prev ";
const NEXT_LABEL: &str = " Next › ";

impl Pager {
    pub fn bounded(page: u32, last_page: u32, loading: bool) -> Self {
        Self {
            page,
            last_page: Some(last_page),
            has_more: page < last_page,
            loading,
        }
    }

    pub fn open(page: u32, has_more: bool, loading: bool) -> Self {
        Self {
            page,
            last_page: None,
            has_more,
            loading,
        }
    }

    pub fn prev_enabled(&self) -> bool {
        self.page > 1 && !self.loading
    }

    pub fn next_enabled(&self) -> bool {
        if self.loading {
            return false;
        }
        match self.last_page {
            Some(last) => self.page < last,
            None => self.has_more,
        }
    }

    pub fn label(&self) -> String {
        match self.last_page {
            Some(last) => format!("Page {} of {}", self.page, last),
            None => format!("Page {}", self.page),
        }
    }

    /// Draw centred into a single row.
    pub fn draw(&self, frame: &mut Frame, area: Rect) -> PagerHits {
        if area.height == 0 || area.width == 0 {
            return PagerHits::default();
        }
        let label = format!("  {}  ", self.label());
        let total_w = (PREV_LABEL.chars().count() + label.chars().count() + NEXT_LABEL.chars().count())
            as u16;
        let start_x = area.x + area.width.saturating_sub(total_w) / 2;

        let line = Line::from(vec![
            Span::styled(PREV_LABEL, button_style(self.prev_enabled())),
            Span::styled(label.clone(), Style::default().fg(C_SECONDARY)),
            Span::styled(NEXT_LABEL, button_style(self.next_enabled())),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);

        let prev_w = PREV_LABEL.chars().count() as u16;
        let next_w = NEXT_LABEL.chars().count() as u16;
        let next_x = start_x + prev_w + label.chars().count() as u16;
        PagerHits {
            prev: clip(Rect::new(start_x, area.y, prev_w, 1), area),
            next: clip(Rect::new(next_x, area.y, next_w, 1), area),
        }
    }
}

impl PagerHits {
    /// Which enabled button, if any, is under (col, row).
    pub fn click(&self, pager: &Pager, col: u16, row: u16) -> Option<PagerClick> {
        if contains(self.prev, col, row) && pager.prev_enabled() {
            return Some(PagerClick::Prev);
        }
        if contains(self.next, col, row) && pager.next_enabled() {
            return Some(PagerClick::Next);
        }
        None
    }
}

fn button_style(enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(C_PRIMARY)
            .bg(C_SEPARATOR)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(C_MUTED)
    }
}

fn clip(r: Rect, bounds: Rect) -> Rect {
    r.intersection(bounds)
}

pub fn contains(r: Rect, col: u16, row: u16) -> bool {
    r.width > 0
        && r.height > 0
        && col >= r.x
        && col < r.x + r.width
        && row >= r.y
        && row < r.y + r.height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_edges() {
        let first = Pager::bounded(1, 5, false);
        assert!(!first.prev_enabled());
        assert!(first.next_enabled());

        let last = Pager::bounded(5, 5, false);
        assert!(last.prev_enabled());
        assert!(!last.next_enabled());
        assert_eq!(last.label(), "Page 5 of 5");
    }

    #[test]
    fn test_loading_disables_both() {
        let p = Pager::bounded(3, 5, true);
        assert!(!p.prev_enabled());
        assert!(!p.next_enabled());
    }

    #[test]
    fn test_open_pager_uses_has_more() {
        assert!(Pager::open(1, true, false).next_enabled());
        assert!(!Pager::open(4, false, false).next_enabled());
        assert!(Pager::open(4, false, false).prev_enabled());
        assert_eq!(Pager::open(4, false, false).label(), "Page 4");
    }

    #[test]
    fn test_click_ignores_disabled_buttons() {
        let hits = PagerHits {
            prev: Rect::new(10, 3, 8, 1),
            next: Rect::new(30, 3, 8, 1),
        };
        let p = Pager::bounded(1, 5, false);
        assert_eq!(hits.click(&p, 12, 3), None);
        assert_eq!(hits.click(&p, 31, 3), Some(PagerClick::Next));
        assert_eq!(hits.click(&p, 31, 4), None);

        let p = Pager::bounded(2, 5, false);
        assert_eq!(hits.click(&p, 12, 3), Some(PagerClick::Prev));
    }
}
