//! Action enum — all user-initiated intents and internal events.

use crate::shell::Ticket;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    SearchBox,
    RecommendationList,
    LogPanel,
    HelpOverlay,
}

/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Navigation ───────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    FocusPane(ComponentId),

    // ── Search ───────────────────────────────────────────────────────────────
    /// Debounced query reached the shell: list search results in the main pane.
    EnterSearch(String),
    /// Run a dropdown search for the search box.
    SearchDropdown(Ticket),
    /// A song was picked; show its recommendations.
    SelectSong(String),
    CollapseDropdown,

    // ── Main list ────────────────────────────────────────────────────────────
    PrevPage,
    NextPage,

    // ── UI toggles ───────────────────────────────────────────────────────────
    ToggleLogs,
    ToggleHelp,
    ToggleKeys,
    CopyToClipboard(String),

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
    Resize(u16, u16),
    Noop,
}
