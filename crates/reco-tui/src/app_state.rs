//! AppState — shared read-only data passed to all components.
//!
//! Only the App event loop writes to it.

use crate::shell::PageShell;
use crate::widgets::status_bar::InputMode;

/// Session log lines kept for the log panel.
const MAX_LOG_LINES: usize = 500;

pub struct AppState {
    pub shell: PageShell,
    pub input_mode: InputMode,
    pub api_base_url: String,
    /// Placeholder cards shown while the list is loading.
    pub skeleton_count: usize,
    /// Session events, oldest first, already timestamped.
    pub logs: Vec<String>,
    /// Advances every UI tick; drives the skeleton pulse.
    pub frame_count: u64,
}

impl AppState {
    pub fn new(shell: PageShell, api_base_url: impl Into<String>, skeleton_count: usize) -> Self {
        Self {
            shell,
            input_mode: InputMode::Normal,
            api_base_url: api_base_url.into(),
            skeleton_count,
            logs: Vec::new(),
            frame_count: 0,
        }
    }

    pub fn push_log(&mut self, line: String) {
        self.logs.push(line);
        if self.logs.len() > MAX_LOG_LINES {
            let excess = self.logs.len() - MAX_LOG_LINES;
            self.logs.drain(..excess);
        }
    }
}
