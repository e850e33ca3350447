//! ViewManager — which optional panes are visible and who has focus.

use crate::action::ComponentId;
use crate::focus::FocusRing;

pub struct ViewManager {
    pub show_log_panel: bool,
    pub show_help: bool,
    pub show_keys_bar: bool,
    pub focus: FocusRing,
}

impl ViewManager {
    pub fn new() -> Self {
        let mut vm = Self {
            show_log_panel: false,
            show_help: false,
            show_keys_bar: true,
            focus: FocusRing::new(Vec::new()),
        };
        vm.rebuild_focus_ring();
        vm.focus.set(ComponentId::SearchBox);
        vm
    }

    /// The log panel joins the Tab cycle only while it is visible.
    pub fn rebuild_focus_ring(&mut self) {
        let mut items = vec![ComponentId::SearchBox, ComponentId::RecommendationList];
        if self.show_log_panel {
            items.push(ComponentId::LogPanel);
        }
        self.focus.set_items(items);
    }

    pub fn focused(&self) -> Option<ComponentId> {
        self.focus.current()
    }

    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focused() == Some(id)
    }

    pub fn focus_set(&mut self, id: ComponentId) {
        self.focus.set(id);
    }

    pub fn focus_next(&mut self) {
        self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus.prev();
    }

    pub fn toggle_log_panel(&mut self) {
        let had_focus = self.is_focused(ComponentId::LogPanel);
        self.show_log_panel = !self.show_log_panel;
        self.rebuild_focus_ring();
        if self.show_log_panel {
            self.focus_set(ComponentId::LogPanel);
        } else if had_focus {
            self.focus_set(ComponentId::RecommendationList);
        }
    }
}

impl Default for ViewManager {
    fn default() -> Self {
        Self::new()
    }
}
