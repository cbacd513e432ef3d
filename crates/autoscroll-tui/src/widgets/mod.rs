mod content_view;
mod status_bar;

pub use content_view::ContentViewWidget;
pub use status_bar::{status_text, StatusBarWidget};
