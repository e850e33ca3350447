//! App — component-based event loop.
//!
//! - `App` owns all components and `AppState` (read-only for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from the terminal
//!   reader and from spawned API requests.
//! - Components return `Vec<Action>`; `dispatch` fans each action out to every
//!   component and then applies it at the app level.
//! - The page shell and the search box hand out tickets; the loop runs them
//!   and routes each response back to whoever asked.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::Block,
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use reco_proto::api::ApiClient;
use reco_proto::config::Config;
use reco_proto::error::ApiError;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    cache::RecommendationCache,
    component::Component,
    components::{
        header::Header,
        help_overlay::HelpOverlay,
        log_panel::LogPanel,
        recommendation_list::RecommendationList,
        search_box::{SearchBox, SearchSettings},
    },
    fetch::{self, FetchTarget},
    shell::{Fetched, Mode, Outcome, PageShell, ShellSettings, Ticket},
    theme::C_BG,
    view::ViewManager,
    widgets::{
        pager::contains,
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Fetched {
        target: FetchTarget,
        ticket: Ticket,
        result: Result<Fetched, ApiError>,
    },
}

/// Pane rects from the last draw, for mouse hit-testing.
#[derive(Debug, Default, Clone, Copy)]
struct PaneAreas {
    search: Rect,
    list: Rect,
    log: Rect,
}

const HEADER_H: u16 = 2;
const SEARCH_H: u16 = 4;
const LOG_H: u16 = 10;

pub struct App {
    state: AppState,
    client: Arc<ApiClient>,
    view: ViewManager,

    header: Header,
    search_box: SearchBox,
    list: RecommendationList,
    log_panel: LogPanel,
    help_overlay: HelpOverlay,
    toast: ToastManager,

    pane_areas: PaneAreas,
    tx: Option<mpsc::Sender<AppMessage>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config, client: Arc<ApiClient>) -> Self {
        let shell = PageShell::new(
            ShellSettings {
                per_page: config.list.per_page,
                total_pages: config.list.total_pages,
            },
            RecommendationCache::new(config.cache.max_songs),
        );
        let state = AppState::new(shell, client.base_url(), config.list.skeleton_count);
        let search_box = SearchBox::new(SearchSettings {
            min_query_len: config.search.min_query_len,
            debounce: Duration::from_millis(config.search.debounce_ms),
            per_page: config.search.per_page,
        });

        let mut app = Self {
            state,
            client,
            view: ViewManager::new(),
            header: Header::new(),
            search_box,
            list: RecommendationList::new(),
            log_panel: LogPanel::new(),
            help_overlay: HelpOverlay::new(),
            toast: ToastManager::new(),
            pane_areas: PaneAreas::default(),
            tx: None,
            should_quit: false,
        };
        app.sync_input_mode();
        app
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        self.log(format!("recoterm started, api {}", self.client.base_url()));
        let ticket = self.state.shell.start();
        self.spawn_fetch(FetchTarget::Shell, ticket);

        // Debounce polling, toast expiry and the skeleton pulse.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
                needs_redraw = false;
            }

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg);
                    // Drain whatever else is queued before the next frame.
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next);
                    }
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    self.state.frame_count = self.state.frame_count.wrapping_add(1);
                    self.toast.tick();
                    let tick_actions: Vec<Action> = {
                        let s = &self.state;
                        let mut all = Vec::new();
                        all.extend(self.search_box.tick(s));
                        all.extend(self.list.tick(s));
                        all.extend(self.log_panel.tick(s));
                        all
                    };
                    for action in tick_actions {
                        self.dispatch(action);
                    }
                    needs_redraw = true;
                }
            }
        }
        Ok(())
    }

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(ev) => match ev {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        return;
                    }
                    for a in self.handle_key(key) {
                        self.dispatch(a);
                    }
                }
                Event::Mouse(mouse) => {
                    for a in self.handle_mouse(mouse) {
                        self.dispatch(a);
                    }
                }
                Event::Resize(w, h) => self.dispatch(Action::Resize(w, h)),
                _ => {}
            },

            AppMessage::Fetched {
                target: FetchTarget::Shell,
                ticket,
                result,
            } => {
                let what = ticket.query.describe();
                match self.state.shell.on_response(&ticket, result) {
                    Outcome::Applied => {
                        let n = self.state.shell.items().len();
                        self.log(format!("{}: {} item{}", what, n, if n == 1 { "" } else { "s" }));
                    }
                    Outcome::Stale => debug!(
                        "[app] superseded: {} (gen {}, now on p{})",
                        what,
                        ticket.generation,
                        self.state.shell.page()
                    ),
                    Outcome::Failed(msg) => {
                        self.log(format!("{} failed: {}", what, msg));
                        self.toast.error(msg);
                    }
                }
            }

            AppMessage::Fetched {
                target: FetchTarget::Dropdown,
                ticket,
                result,
            } => {
                let what = ticket.query.describe();
                let applied = self
                    .search_box
                    .on_results(&ticket, result.map(|f| f.items));
                if applied {
                    if let Some(err) = self.search_box.error() {
                        let line = format!("dropdown {} failed: {}", what, err);
                        self.log(line);
                    }
                }
            }
        }
    }

    // ── Keyboard handling ─────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers == KeyModifiers::CONTROL {
            return vec![Action::Quit];
        }

        // Help overlay captures all keys when visible.
        if self.view.show_help {
            let actions = self.help_overlay.handle_key(key, &self.state);
            return if actions.is_empty() {
                vec![Action::ToggleHelp]
            } else {
                actions
            };
        }

        // Global keys; in search mode they are ordinary text.
        if self.state.input_mode == InputMode::Normal {
            match key.code {
                KeyCode::Char('q') => return vec![Action::Quit],
                KeyCode::Char('?') => return vec![Action::ToggleHelp],
                KeyCode::Char('L') => return vec![Action::ToggleLogs],
                KeyCode::Char('K') => return vec![Action::ToggleKeys],
                KeyCode::Char('/') => return vec![Action::FocusPane(ComponentId::SearchBox)],
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab => return vec![Action::FocusNext],
            KeyCode::BackTab => return vec![Action::FocusPrev],
            _ => {}
        }

        let s = &self.state;
        match self.view.focused() {
            Some(ComponentId::SearchBox) => self.search_box.handle_key(key, s),
            Some(ComponentId::RecommendationList) => self.list.handle_key(key, s),
            Some(ComponentId::LogPanel) => self.log_panel.handle_key(key, s),
            Some(ComponentId::HelpOverlay) | None => vec![],
        }
    }

    // ── Mouse handling ────────────────────────────────────────────────────────

    fn handle_mouse(&mut self, event: MouseEvent) -> Vec<Action> {
        if self.view.show_help {
            return vec![];
        }
        let is_click = matches!(event.kind, MouseEventKind::Down(_));
        let is_scroll = matches!(
            event.kind,
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
        );
        if !is_click && !is_scroll {
            return vec![];
        }

        let (col, row) = (event.column, event.row);
        let areas = self.pane_areas;
        let dropdown = self.search_box.dropdown_area();

        // Any press outside the box and its dropdown closes the dropdown.
        let mut actions = Vec::new();
        if matches!(event.kind, MouseEventKind::Down(MouseButton::Left))
            && self.search_box.dropdown_open()
            && !contains(areas.search, col, row)
            && !contains(dropdown, col, row)
        {
            actions.push(Action::CollapseDropdown);
        }

        let (pane, area): (&mut dyn Component, Rect) =
            if contains(dropdown, col, row) || contains(areas.search, col, row) {
                (&mut self.search_box, areas.search)
            } else if contains(areas.list, col, row) {
                (&mut self.list, areas.list)
            } else if contains(areas.log, col, row) {
                (&mut self.log_panel, areas.log)
            } else {
                return actions;
            };
        let id = pane.id();
        let mut pane_actions = pane.handle_mouse(event, area, &self.state);

        // Focus follows clicks, not the wheel.
        if is_click && !self.view.is_focused(id) {
            actions.push(Action::FocusPane(id));
        }
        actions.append(&mut pane_actions);
        actions
    }

    // ── Action dispatcher ─────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.search_box.on_action(&action, s));
            out.extend(self.list.on_action(&action, s));
            out.extend(self.log_panel.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        // Depth-limited to one level.
        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match &action {
            Action::Noop | Action::Resize(..) => {}
            _ => debug!("apply_action: {:?}", action),
        }
        match action {
            // ── Navigation ────────────────────────────────────────────────────
            Action::FocusNext => {
                self.view.focus_next();
                self.sync_input_mode();
            }
            Action::FocusPrev => {
                self.view.focus_prev();
                self.sync_input_mode();
            }
            Action::FocusPane(id) => {
                self.view.focus_set(id);
                self.sync_input_mode();
            }

            // ── Search ────────────────────────────────────────────────────────
            Action::EnterSearch(query) => match self.state.shell.enter_search(&query) {
                Some(ticket) => self.spawn_fetch(FetchTarget::Shell, ticket),
                None if self.state.shell.mode() == Mode::Recommend => {
                    self.toast.info("pick a match to switch recommendations");
                }
                None => debug!("[app] search {:?} left the list as is", query),
            },
            Action::SearchDropdown(ticket) => {
                self.spawn_fetch(FetchTarget::Dropdown, ticket);
            }
            Action::SelectSong(song) => {
                self.log(format!("selected {:?}", song));
                match self.state.shell.select_song(&song) {
                    Some(ticket) => self.spawn_fetch(FetchTarget::Shell, ticket),
                    None => self.log(format!("recommend {:?} p1 served from cache", song)),
                }
            }

            // ── Main list paging ──────────────────────────────────────────────
            Action::PrevPage | Action::NextPage => {
                let before = self.state.shell.page();
                let ticket = if action == Action::NextPage {
                    self.state.shell.next_page()
                } else {
                    self.state.shell.prev_page()
                };
                match ticket {
                    Some(ticket) => self.spawn_fetch(FetchTarget::Shell, ticket),
                    None if self.state.shell.page() != before => {
                        if self.state.shell.mode() == Mode::Recommend {
                            let song = self.state.shell.selected_song().unwrap_or_default().to_string();
                            let page = self.state.shell.page();
                            self.log(format!("recommend {:?} p{} served from cache", song, page));
                        }
                    }
                    None => {}
                }
            }

            // ── UI toggles ────────────────────────────────────────────────────
            Action::ToggleLogs => {
                self.view.toggle_log_panel();
                self.sync_input_mode();
            }
            Action::ToggleHelp => {
                self.view.show_help = !self.view.show_help;
            }
            Action::ToggleKeys => {
                self.view.show_keys_bar = !self.view.show_keys_bar;
            }
            Action::CopyToClipboard(text) => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let display = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("copied: {}", display));
                    }
                    Err(e) => {
                        warn!("clipboard error: {}", e);
                        self.toast.error(format!("clipboard error: {}", e));
                    }
                }
            }

            // ── System ────────────────────────────────────────────────────────
            Action::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }

            // Handled at component level
            Action::CollapseDropdown | Action::Resize(..) | Action::Noop => {}
        }
    }

    // ── Requests ──────────────────────────────────────────────────────────────

    fn spawn_fetch(&mut self, target: FetchTarget, ticket: Ticket) {
        let Some(tx) = self.tx.clone() else {
            warn!("[app] no event loop yet, dropping {}", ticket.query.describe());
            return;
        };
        if target == FetchTarget::Shell {
            self.log(format!("→ {}", ticket.query.describe()));
        } else {
            debug!("[app] → dropdown {}", ticket.query.describe());
        }
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = fetch::execute(&client, &ticket.query).await;
            if let Err(e) = &result {
                warn!("[fetch] {} failed: {}", ticket.query.describe(), e);
            }
            let _ = tx
                .send(AppMessage::Fetched {
                    target,
                    ticket,
                    result,
                })
                .await;
        });
    }

    /// Session event: goes to the tracing log and the in-app log panel.
    fn log(&mut self, msg: String) {
        info!("{}", msg);
        let stamp = chrono::Local::now().format("%H:%M:%S");
        self.state.push_log(format!("{} {}", stamp, msg));
    }

    fn sync_input_mode(&mut self) {
        self.state.input_mode = if self.view.is_focused(ComponentId::SearchBox) {
            InputMode::Search
        } else {
            InputMode::Normal
        };
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // header | search | list | (log) | (keys)
        let log_h = if self.view.show_log_panel { LOG_H } else { 0 };
        let keys_h = if self.view.show_keys_bar { 1 } else { 0 };
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_H),
                Constraint::Length(SEARCH_H),
                Constraint::Min(0),
                Constraint::Length(log_h),
                Constraint::Length(keys_h),
            ])
            .split(area);

        self.header.draw(frame, outer[0], &self.state);

        let search_focused = self.view.is_focused(ComponentId::SearchBox);
        self.search_box
            .draw(frame, outer[1], search_focused, &self.state);
        self.pane_areas.search = outer[1];

        let list_focused = self.view.is_focused(ComponentId::RecommendationList);
        self.list.draw(frame, outer[2], list_focused, &self.state);
        self.pane_areas.list = outer[2];

        if self.view.show_log_panel {
            let log_focused = self.view.is_focused(ComponentId::LogPanel);
            self.log_panel.draw(frame, outer[3], log_focused, &self.state);
            self.pane_areas.log = outer[3];
        } else {
            self.pane_areas.log = Rect::default();
        }

        if self.view.show_keys_bar {
            status_bar::draw_keys_bar(
                frame,
                outer[4],
                self.state.input_mode,
                self.state.shell.mode(),
            );
        }

        // Dropdown overlays the list; it may extend down to the keys bar.
        let bounds = Rect {
            height: area.height.saturating_sub(keys_h),
            ..area
        };
        self.search_box
            .draw_dropdown(frame, outer[1], bounds, search_focused);

        if self.view.show_help {
            self.help_overlay.draw(frame, area, false, &self.state);
        }

        self.toast.draw(frame, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use std::time::Instant;

    fn app() -> App {
        let mut config = Config::default();
        config.search.debounce_ms = 0;
        let client = ApiClient::new(&config.api).unwrap();
        App::new(&config, Arc::new(client))
    }

    fn draw(app: &mut App) {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_click_outside_search_collapses_dropdown() {
        let mut app = app();
        app.search_box.set_query("imagine", Instant::now());
        draw(&mut app);

        // header 0-1, search 2-5, dropdown from row 6 over the list
        assert_eq!(app.pane_areas.search, Rect::new(0, 2, 80, 4));
        let dropdown = app.search_box.dropdown_area();
        assert!(contains(dropdown, 10, 7));
        assert!(!contains(dropdown, 10, 20));

        let in_dropdown = app.handle_mouse(click(10, 7));
        assert!(!in_dropdown.contains(&Action::CollapseDropdown));
        let in_search = app.handle_mouse(click(10, 3));
        assert!(!in_search.contains(&Action::CollapseDropdown));

        let in_list = app.handle_mouse(click(10, 20));
        assert!(in_list.contains(&Action::CollapseDropdown));
        assert!(in_list.contains(&Action::FocusPane(ComponentId::RecommendationList)));

        for a in in_list {
            app.dispatch(a);
        }
        assert!(!app.search_box.dropdown_open());
    }

    #[test]
    fn test_click_in_list_without_dropdown_only_moves_focus() {
        let mut app = app();
        draw(&mut app);
        assert!(!app.search_box.dropdown_open());

        let actions = app.handle_mouse(click(10, 20));
        assert_eq!(
            actions,
            vec![Action::FocusPane(ComponentId::RecommendationList)]
        );
    }
}
