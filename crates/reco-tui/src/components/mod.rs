pub mod header;
pub mod help_overlay;
pub mod log_panel;
pub mod recommendation_list;
pub mod search_box;
