pub mod container;
pub mod event;
pub mod input;
pub mod theme;
pub mod widgets;
pub mod wrap;

pub use container::{AutoScrollContainer, ContainerStatus, TerminalHost, ROW_HEIGHT_PX};
pub use theme::Theme;
