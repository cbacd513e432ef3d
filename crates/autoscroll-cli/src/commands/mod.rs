pub mod config;
pub mod run;
pub mod simulate;

use clap::Args;

use autoscroll_core::{AutoScrollConfig, DirectionMode};

/// Command-line overrides for the `[scroll]` table
#[derive(Debug, Clone, Default, Args)]
pub struct ScrollOverrides {
    /// Target speed in pixels per second
    #[arg(long, allow_negative_numbers = true)]
    pub speed: Option<f64>,
    /// Scroll direction: down, up or both
    #[arg(long, value_parser = parse_direction)]
    pub direction: Option<DirectionMode>,
    /// Reverse at each edge (implies `--direction both`)
    #[arg(long)]
    pub reverse: bool,
}

impl ScrollOverrides {
    pub fn apply(&self, config: &mut AutoScrollConfig) {
        if let Some(speed) = self.speed {
            config.px_per_second = speed;
        }
        if let Some(direction) = self.direction {
            config.direction = direction;
        }
        if self.reverse {
            config.direction = DirectionMode::Both;
            config.reverse_on_end = true;
        }
    }
}

fn parse_direction(value: &str) -> Result<DirectionMode, String> {
    value.parse().map_err(|e: autoscroll_core::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let mut config = AutoScrollConfig::new(40.0);
        let overrides = ScrollOverrides {
            speed: Some(90.0),
            direction: Some(DirectionMode::Up),
            reverse: false,
        };
        overrides.apply(&mut config);

        assert_eq!(config.px_per_second, 90.0);
        assert_eq!(config.direction, DirectionMode::Up);
        assert!(!config.reverse_on_end);
    }

    #[test]
    fn test_reverse_implies_both() {
        let mut config = AutoScrollConfig::new(40.0);
        ScrollOverrides {
            reverse: true,
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.direction, DirectionMode::Both);
        assert!(config.reverse_on_end);
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!(parse_direction("both"), Ok(DirectionMode::Both));
        assert!(parse_direction("sideways").is_err());
    }
}
