use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::EventKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default = "default_scroll_config")]
    pub scroll: AutoScrollConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            ui: UiConfig::default(),
            scroll: default_scroll_config(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path (log files)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Frames per second driven into the engine
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Show the status line under the scrolling panel
    #[serde(default = "default_true")]
    pub show_status_bar: bool,
    /// Soft-wrap long lines to the panel width
    #[serde(default = "default_true")]
    pub wrap: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            show_status_bar: default_true(),
            wrap: default_true(),
        }
    }
}

/// A single scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    #[default]
    Down,
    Up,
}

impl ScrollDirection {
    /// +1 for down, -1 for up
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            ScrollDirection::Down => 1.0,
            ScrollDirection::Up => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            ScrollDirection::Down => ScrollDirection::Up,
            ScrollDirection::Up => ScrollDirection::Down,
        }
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollDirection::Down => f.write_str("down"),
            ScrollDirection::Up => f.write_str("up"),
        }
    }
}

impl FromStr for ScrollDirection {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "down" => Ok(ScrollDirection::Down),
            "up" => Ok(ScrollDirection::Up),
            _ => Err(crate::Error::UnknownDirection(s.to_string())),
        }
    }
}

/// Configured direction model. `Both` allows reversal at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionMode {
    #[default]
    Down,
    Up,
    Both,
}

impl fmt::Display for DirectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionMode::Down => f.write_str("down"),
            DirectionMode::Up => f.write_str("up"),
            DirectionMode::Both => f.write_str("both"),
        }
    }
}

impl FromStr for DirectionMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "down" => Ok(DirectionMode::Down),
            "up" => Ok(DirectionMode::Up),
            "both" => Ok(DirectionMode::Both),
            _ => Err(crate::Error::UnknownDirection(s.to_string())),
        }
    }
}

/// Engine options. Everything except `px_per_second` has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoScrollConfig {
    /// When false no frames are scheduled and no listeners attach
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Target speed in px/s; negative values reverse the effective sign
    pub px_per_second: f64,
    /// Multiplier applied on top of `px_per_second`
    #[serde(default = "default_speed_multiplier")]
    pub speed_multiplier: f64,
    /// Slack in px before the bottom edge counts as reached
    #[serde(default = "default_tolerance")]
    pub bottom_tolerance: f64,
    /// Slack in px before the top edge counts as reached
    #[serde(default = "default_tolerance")]
    pub top_tolerance: f64,
    /// Extra logical margin added to the top check
    #[serde(default)]
    pub start_offset: f64,
    /// Extra logical margin added to the bottom check
    #[serde(default)]
    pub end_offset: f64,
    /// Maximum elapsed time credited to one frame, in ms
    #[serde(default = "default_cap_dt_ms")]
    pub cap_dt_ms: f64,
    /// Per-frame weight used when the current velocity chases the target
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,
    /// Time in ms to reach full speed on an ease-out cubic curve; 0 means instantly
    #[serde(default = "default_acceleration_time")]
    pub acceleration_time: f64,
    #[serde(default)]
    pub direction: DirectionMode,
    /// Initial direction when `direction` is `both`
    #[serde(default)]
    pub start_direction: ScrollDirection,
    /// Flip direction at an edge (only with `direction = "both"`)
    #[serde(default)]
    pub reverse_on_end: bool,
    /// Delay in ms before a resume trigger takes effect
    #[serde(default)]
    pub resume_delay: f64,
    #[serde(default)]
    pub pause_on_hover: bool,
    #[serde(default)]
    pub pause_on_focus: bool,
    #[serde(default = "default_true")]
    pub respect_reduced_motion: bool,
    #[serde(default = "default_pause_events")]
    pub pause_events: Vec<EventKind>,
    #[serde(default = "default_resume_events")]
    pub resume_events: Vec<EventKind>,
}

/// Which parts of the engine a configuration change touches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    pub enabled: bool,
    pub speed: bool,
    pub animation: bool,
    pub events: bool,
}

impl ConfigChanges {
    pub fn is_empty(&self) -> bool {
        !(self.enabled || self.speed || self.animation || self.events)
    }
}

impl AutoScrollConfig {
    /// Defaults for every option, scrolling at `px_per_second`
    pub fn new(px_per_second: f64) -> Self {
        Self {
            enabled: default_true(),
            px_per_second,
            speed_multiplier: default_speed_multiplier(),
            bottom_tolerance: default_tolerance(),
            top_tolerance: default_tolerance(),
            start_offset: 0.0,
            end_offset: 0.0,
            cap_dt_ms: default_cap_dt_ms(),
            smoothing_factor: default_smoothing_factor(),
            acceleration_time: default_acceleration_time(),
            direction: DirectionMode::default(),
            start_direction: ScrollDirection::default(),
            reverse_on_end: false,
            resume_delay: 0.0,
            pause_on_hover: false,
            pause_on_focus: false,
            respect_reduced_motion: default_true(),
            pause_events: default_pause_events(),
            resume_events: default_resume_events(),
        }
    }

    /// Direction the engine starts in (and returns to on reset)
    pub fn initial_direction(&self) -> ScrollDirection {
        match self.direction {
            DirectionMode::Down => ScrollDirection::Down,
            DirectionMode::Up => ScrollDirection::Up,
            DirectionMode::Both => self.start_direction,
        }
    }

    /// Unsigned target speed in px/s
    #[inline]
    pub fn base_velocity(&self) -> f64 {
        self.px_per_second * self.speed_multiplier
    }

    /// Whether edge reversal is active
    pub fn reverses(&self) -> bool {
        self.direction == DirectionMode::Both && self.reverse_on_end
    }

    /// Classify what differs between `self` and `next`
    pub fn changes(&self, next: &Self) -> ConfigChanges {
        let boundary = self.bottom_tolerance != next.bottom_tolerance
            || self.top_tolerance != next.top_tolerance
            || self.start_offset != next.start_offset
            || self.end_offset != next.end_offset;

        ConfigChanges {
            enabled: self.enabled != next.enabled,
            speed: self.px_per_second != next.px_per_second
                || self.speed_multiplier != next.speed_multiplier,
            animation: boundary
                || self.cap_dt_ms != next.cap_dt_ms
                || self.smoothing_factor != next.smoothing_factor
                || self.acceleration_time != next.acceleration_time
                || self.direction != next.direction
                || self.start_direction != next.start_direction
                || self.reverse_on_end != next.reverse_on_end
                || self.respect_reduced_motion != next.respect_reduced_motion,
            events: boundary
                || self.pause_events != next.pause_events
                || self.resume_events != next.resume_events
                || self.resume_delay != next.resume_delay
                || self.pause_on_hover != next.pause_on_hover
                || self.pause_on_focus != next.pause_on_focus,
        }
    }

    /// Reject non-finite numbers. Everything finite is accepted as-is.
    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("px_per_second", self.px_per_second),
            ("speed_multiplier", self.speed_multiplier),
            ("bottom_tolerance", self.bottom_tolerance),
            ("top_tolerance", self.top_tolerance),
            ("start_offset", self.start_offset),
            ("end_offset", self.end_offset),
            ("cap_dt_ms", self.cap_dt_ms),
            ("smoothing_factor", self.smoothing_factor),
            ("acceleration_time", self.acceleration_time),
            ("resume_delay", self.resume_delay),
        ];

        for (name, value) in fields {
            if !value.is_finite() {
                return Err(crate::Error::Config(format!(
                    "scroll.{} must be a finite number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

fn default_scroll_config() -> AutoScrollConfig {
    AutoScrollConfig::new(default_px_per_second())
}

fn default_px_per_second() -> f64 {
    40.0
}

fn default_speed_multiplier() -> f64 {
    1.0
}

fn default_tolerance() -> f64 {
    1.0
}

fn default_cap_dt_ms() -> f64 {
    16.67 // ~60fps
}

fn default_smoothing_factor() -> f64 {
    0.1
}

fn default_acceleration_time() -> f64 {
    1000.0
}

fn default_pause_events() -> Vec<EventKind> {
    vec![
        EventKind::Wheel,
        EventKind::TouchMove,
        EventKind::KeyDown,
        EventKind::MouseDown,
        EventKind::Focus,
    ]
}

fn default_resume_events() -> Vec<EventKind> {
    vec![
        EventKind::MouseLeave,
        EventKind::TouchEnd,
        EventKind::TouchCancel,
    ]
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autoscroll")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_frame_rate() -> u32 {
    60
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.scroll.validate()?;
        if config.ui.frame_rate == 0 {
            return Err(crate::Error::Config(
                "ui.frame_rate must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.to_toml()?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the configuration file path
    /// Always uses ~/.config/autoscroll/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("autoscroll")
            .join("config.toml")
    }

    /// Get the log file path used while the terminal UI owns stdout
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("autoscroll.log")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scroll_options() {
        let config = AutoScrollConfig::new(50.0);
        assert!(config.enabled);
        assert_eq!(config.bottom_tolerance, 1.0);
        assert_eq!(config.top_tolerance, 1.0);
        assert_eq!(config.start_offset, 0.0);
        assert_eq!(config.end_offset, 0.0);
        assert_eq!(config.cap_dt_ms, 16.67);
        assert_eq!(config.smoothing_factor, 0.1);
        assert_eq!(config.acceleration_time, 1000.0);
        assert_eq!(config.direction, DirectionMode::Down);
        assert_eq!(config.resume_delay, 0.0);
        assert!(!config.pause_on_hover);
        assert!(!config.pause_on_focus);
        assert!(config.respect_reduced_motion);
        assert_eq!(config.pause_events.len(), 5);
        assert_eq!(
            config.resume_events,
            vec![EventKind::MouseLeave, EventKind::TouchEnd, EventKind::TouchCancel]
        );
    }

    #[test]
    fn test_parse_partial_scroll_table() {
        let config = AppConfig::from_toml(
            r#"
            [scroll]
            px_per_second = 80.0
            direction = "both"
            reverse_on_end = true
            pause_events = ["wheel", "keydown"]
            "#,
        )
        .unwrap();

        assert_eq!(config.scroll.px_per_second, 80.0);
        assert_eq!(config.scroll.direction, DirectionMode::Both);
        assert!(config.scroll.reverses());
        assert_eq!(config.scroll.pause_events, vec![EventKind::Wheel, EventKind::KeyDown]);
        assert_eq!(config.ui.frame_rate, 60);
    }

    #[test]
    fn test_scroll_table_requires_speed() {
        let result = AppConfig::from_toml("[scroll]\ndirection = \"up\"\n");
        assert!(matches!(result, Err(crate::Error::Toml(_))));
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.scroll.px_per_second, 40.0);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_reject_non_finite() {
        let mut config = AutoScrollConfig::new(10.0);
        config.cap_dt_ms = f64::INFINITY;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        config.cap_dt_ms = 16.0;
        config.px_per_second = -25.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_initial_direction() {
        let mut config = AutoScrollConfig::new(10.0);
        assert_eq!(config.initial_direction(), ScrollDirection::Down);

        config.direction = DirectionMode::Up;
        assert_eq!(config.initial_direction(), ScrollDirection::Up);

        config.direction = DirectionMode::Both;
        config.start_direction = ScrollDirection::Up;
        assert_eq!(config.initial_direction(), ScrollDirection::Up);
    }

    #[test]
    fn test_classify_changes() {
        let base = AutoScrollConfig::new(10.0);

        let mut faster = base.clone();
        faster.px_per_second = 20.0;
        let changes = base.changes(&faster);
        assert!(changes.speed && !changes.animation && !changes.events);

        let mut tolerant = base.clone();
        tolerant.bottom_tolerance = 4.0;
        let changes = base.changes(&tolerant);
        assert!(changes.animation && changes.events && !changes.speed);

        let mut delayed = base.clone();
        delayed.resume_delay = 300.0;
        let changes = base.changes(&delayed);
        assert!(changes.events && !changes.animation);

        assert!(base.changes(&base.clone()).is_empty());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.scroll, config.scroll);
    }
}
