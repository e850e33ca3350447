//! PageShell — the page-level state machine.
//!
//! Tracks which listing is on screen (default / search / recommend), the
//! current page, and the per-song recommendation cache. Performs no I/O:
//! every transition that needs data returns a [`Ticket`] for the app loop
//! to execute, and completed requests come back through [`PageShell::on_response`].
//!
//! Each ticket carries a generation number. Only the response for the most
//! recent ticket is committed to the screen; anything older is dropped.
//!
//! ```text
//!   Default ──type──▶ Search ──select──▶ Recommend
//!      └──────────────select─────────────────▲
//! ```

use std::sync::Arc;

use reco_proto::error::ApiError;
use reco_proto::model::Recommendation;
use tracing::debug;

use crate::cache::{Page, RecommendationCache};
use crate::widgets::pager::Pager;

#[cfg(test)]
mod tests;

/// Which listing the main pane shows; decides where page changes go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Default,
    Search,
    Recommend,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "DISCOVER",
            Self::Search => "SEARCH",
            Self::Recommend => "RECOMMEND",
        }
    }
}

/// A single request against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Songs { page: u32, per_page: u32 },
    Search { query: String, page: u32, per_page: u32 },
    Recommend { song: String, page: u32, per_page: u32 },
}

impl Query {
    pub fn page(&self) -> u32 {
        match self {
            Self::Songs { page, .. } | Self::Search { page, .. } | Self::Recommend { page, .. } => {
                *page
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Songs { page, .. } => format!("songs p{}", page),
            Self::Search { query, page, .. } => format!("search {:?} p{}", query, page),
            Self::Recommend { song, page, .. } => format!("recommend {:?} p{}", song, page),
        }
    }
}

/// A request stamped with the generation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub query: Query,
}

/// Result payload of any of the three calls, normalised.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub items: Vec<Recommendation>,
    /// Only ever set by `/recommend` responses that report it.
    pub total_pages: Option<u32>,
}

/// What `on_response` did with a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Superseded by a newer request; nothing on screen changed.
    Stale,
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ShellSettings {
    pub per_page: u32,
    pub total_pages: u32,
}

pub struct PageShell {
    mode: Mode,
    page: u32,
    total_pages: u32,
    selected_song: Option<String>,
    search_query: Option<String>,
    items: Page,
    loading: bool,
    error: Option<String>,
    generation: u64,
    cache: RecommendationCache,
    settings: ShellSettings,
}

impl PageShell {
    pub fn new(settings: ShellSettings, cache: RecommendationCache) -> Self {
        Self {
            mode: Mode::Default,
            page: 1,
            total_pages: settings.total_pages.max(1),
            selected_song: None,
            search_query: None,
            items: Arc::from(Vec::new()),
            loading: false,
            error: None,
            generation: 0,
            cache,
            settings,
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    /// Initial listing: default mode, page 1.
    pub fn start(&mut self) -> Ticket {
        self.mode = Mode::Default;
        self.page = 1;
        self.request(Query::Songs {
            page: 1,
            per_page: self.settings.per_page,
        })
    }

    /// The user typed a query. Only default and search mode follow the search
    /// box; once a song is selected the list stays on its recommendations.
    pub fn enter_search(&mut self, query: &str) -> Option<Ticket> {
        let query = query.trim();
        if query.is_empty() || self.mode == Mode::Recommend {
            return None;
        }
        if self.mode == Mode::Search
            && self.search_query.as_deref() == Some(query)
            && self.page == 1
            && (self.loading || self.error.is_none())
        {
            return None;
        }
        self.mode = Mode::Search;
        self.page = 1;
        self.search_query = Some(query.to_string());
        Some(self.request(Query::Search {
            query: query.to_string(),
            page: 1,
            per_page: self.settings.per_page,
        }))
    }

    /// A song was picked from the search results. Page 1 comes from the cache
    /// when this song was seen before.
    pub fn select_song(&mut self, song: &str) -> Option<Ticket> {
        self.mode = Mode::Recommend;
        self.selected_song = Some(song.to_string());
        self.page = 1;
        self.total_pages = self
            .cache
            .total_pages(song)
            .unwrap_or(self.settings.total_pages)
            .max(1);
        self.load_recommend_page(song.to_string(), 1)
    }

    /// Move to `new_page`. Ignored while loading or outside `1..=total_pages`.
    pub fn change_page(&mut self, new_page: u32) -> Option<Ticket> {
        if self.loading || new_page < 1 || new_page > self.total_pages || new_page == self.page {
            return None;
        }
        self.page = new_page;
        let per_page = self.settings.per_page;

        match (self.mode, self.search_query.clone(), self.selected_song.clone()) {
            (Mode::Recommend, _, Some(song)) => self.load_recommend_page(song, new_page),
            (Mode::Search, Some(query), _) => Some(self.request(Query::Search {
                query,
                page: new_page,
                per_page,
            })),
            _ => Some(self.request(Query::Songs {
                page: new_page,
                per_page,
            })),
        }
    }

    pub fn next_page(&mut self) -> Option<Ticket> {
        self.change_page(self.page + 1)
    }

    pub fn prev_page(&mut self) -> Option<Ticket> {
        self.change_page(self.page.saturating_sub(1))
    }

    /// Apply a completed request. Recommendation pages are cached even when
    /// stale; they are keyed by song and page so they are still correct.
    pub fn on_response(&mut self, ticket: &Ticket, result: Result<Fetched, ApiError>) -> Outcome {
        let current = ticket.generation == self.generation;

        let fetched = match result {
            Ok(f) => f,
            Err(e) => {
                if !current {
                    debug!("[shell] dropping stale failure for {}", ticket.query.describe());
                    return Outcome::Stale;
                }
                self.loading = false;
                self.items = Arc::from(Vec::new());
                let summary = e.summary();
                self.error = Some(summary.clone());
                return Outcome::Failed(summary);
            }
        };

        let items: Page = Arc::from(fetched.items);
        if let Query::Recommend { song, page, .. } = &ticket.query {
            if let Some(evicted) = self.cache.insert(song, *page, items.clone()) {
                debug!("[shell] cache evicted {:?}", evicted);
            }
            if let Some(total) = fetched.total_pages {
                self.cache.set_total_pages(song, total.max(1));
            }
        }

        if !current {
            debug!("[shell] dropping stale response for {}", ticket.query.describe());
            return Outcome::Stale;
        }

        if let (Query::Recommend { .. }, Some(total)) = (&ticket.query, fetched.total_pages) {
            self.total_pages = total.max(1);
        }
        self.loading = false;
        self.error = None;
        self.items = items;
        Outcome::Applied
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn load_recommend_page(&mut self, song: String, page: u32) -> Option<Ticket> {
        if let Some(hit) = self.cache.get(&song, page) {
            debug!("[shell] cache hit {:?} p{}", song, page);
            // Anything still in flight belongs to a screen we've left.
            self.generation += 1;
            self.loading = false;
            self.error = None;
            self.items = hit;
            return None;
        }
        Some(self.request(Query::Recommend {
            song,
            page,
            per_page: self.settings.per_page,
        }))
    }

    fn request(&mut self, query: Query) -> Ticket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        Ticket {
            generation: self.generation,
            query,
        }
    }

    // ── Read access ───────────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    #[cfg(test)]
    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn items(&self) -> &Page {
        &self.items
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_song(&self) -> Option<&str> {
        self.selected_song.as_deref()
    }

    pub fn cache(&self) -> &RecommendationCache {
        &self.cache
    }

    pub fn pager(&self) -> Pager {
        Pager::bounded(self.page, self.total_pages, self.loading)
    }

    /// One-line context for the header: what the list is showing.
    pub fn context_label(&self) -> String {
        match self.mode {
            Mode::Default => "random picks from the catalogue".to_string(),
            Mode::Search => format!("results for \"{}\"", self.search_query.as_deref().unwrap_or("")),
            Mode::Recommend => format!(
                "because you picked \"{}\"",
                self.selected_song.as_deref().unwrap_or("")
            ),
        }
    }
}
