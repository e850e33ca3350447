//! Header — 2-row top bar.
//!
//! Row 1: app title, listing mode badge, API base url.
//! Row 2: subtitle, cache occupancy.
//!
//! Not focusable.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    app_state::AppState,
    theme::{C_ACCENT, C_MUTED, C_PRIMARY, C_SECONDARY},
    widgets::{status_bar::mode_color, text::width},
};

pub const TITLE: &str = "Music Recommendation";
pub const SUBTITLE: &str = "Powered by Machine Learning & Spotify Audio Features";

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height == 0 {
            return;
        }
        frame.render_widget(Clear, area);

        let mode = state.shell.mode();
        let left = vec![
            Span::styled(" ♫ ", Style::default().fg(C_ACCENT)),
            Span::styled(
                TITLE,
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("[{}]", mode.label()),
                Style::default()
                    .fg(mode_color(mode))
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        let right = format!("{} ", state.api_base_url);
        frame.render_widget(
            Paragraph::new(spread(left, right, C_MUTED, area.width)),
            Rect { height: 1, ..area },
        );

        if area.height < 2 {
            return;
        }
        let cache = state.shell.cache();
        let right = format!(
            "cache {} song{} ",
            cache.song_count(),
            if cache.song_count() == 1 { "" } else { "s" }
        );
        let left = vec![Span::styled(
            format!("   {}", SUBTITLE),
            Style::default().fg(C_SECONDARY),
        )];
        frame.render_widget(
            Paragraph::new(spread(left, right, C_MUTED, area.width)),
            Rect {
                y: area.y + 1,
                height: 1,
                ..area
            },
        );
    }
}

/// Left spans, then `right` pushed to the far edge when it fits.
fn spread(
    mut left: Vec<Span<'static>>,
    right: String,
    right_color: ratatui::style::Color,
    cols: u16,
) -> Line<'static> {
    let used: usize = left.iter().map(|s| width(&s.content)).sum();
    let room = (cols as usize).saturating_sub(used);
    if width(&right) < room {
        left.push(Span::raw(" ".repeat(room - width(&right))));
        left.push(Span::styled(right, Style::default().fg(right_color)));
    }
    Line::from(left)
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
