pub mod config;
pub mod engine;
pub mod error;
pub mod sim;

pub use config::{AppConfig, AutoScrollConfig, DirectionMode, ScrollDirection};
pub use engine::{AutoScroll, Callbacks, EventKind, Host, Transform};
pub use error::{Error, Result};
