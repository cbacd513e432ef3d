//! Mutable engine state shared by the loop and the lifecycle controller

use crate::config::ScrollDirection;

use super::boundary::Boundaries;
use super::host::{TimerHandle, Transform};
use super::timing::frame_delta;

/// State written by the frame loop
#[derive(Debug, Clone, Default)]
pub(crate) struct LoopState {
    /// Current velocity in px/s, signed by direction
    pub velocity: f64,
    /// Sub-pixel distance not yet committed to the scroll offset
    pub accumulator: f64,
    /// Timestamp of the last frame that reached the clock
    pub last_frame: Option<f64>,
    /// Start of the current acceleration window
    pub accel_start: Option<f64>,
    pub has_started: bool,
    pub direction: ScrollDirection,
    pub boundaries: Boundaries,
    /// Last transform written to the content element
    pub transform: Transform,
}

impl LoopState {
    pub fn new(direction: ScrollDirection) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    /// Stamp `now` and return the capped delta since the previous frame.
    ///
    /// The first frame after a (re)start only anchors the clock and returns None.
    pub fn tick_clock(&mut self, now: f64, cap_ms: f64) -> Option<f64> {
        match self.last_frame.replace(now) {
            Some(last) => Some(frame_delta(last, now, cap_ms)),
            None => {
                self.accel_start = Some(now);
                None
            }
        }
    }

    /// Drop the timing anchors so the next frame restarts acceleration cleanly
    pub fn reset_anchors(&mut self) {
        self.last_frame = None;
        self.accel_start = None;
    }

    /// Zero velocity and pending sub-pixel distance
    pub fn halt(&mut self) {
        self.velocity = 0.0;
        self.accumulator = 0.0;
    }
}

/// State written by the lifecycle controller
#[derive(Debug, Clone, Default)]
pub(crate) struct PauseState {
    pub paused: bool,
    /// At most one deferred resume is pending
    pub resume_timer: Option<TimerHandle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_only_anchors() {
        let mut state = LoopState::new(ScrollDirection::Down);
        assert_eq!(state.tick_clock(1000.0, 16.67), None);
        assert_eq!(state.accel_start, Some(1000.0));

        let dt = state.tick_clock(1010.0, 16.67).unwrap();
        assert!((dt - 10.0).abs() < 1e-9);
        assert_eq!(state.accel_start, Some(1000.0));
    }

    #[test]
    fn test_reset_anchors_restarts_acceleration() {
        let mut state = LoopState::new(ScrollDirection::Up);
        state.tick_clock(0.0, 16.67);
        state.tick_clock(16.0, 16.67);

        state.reset_anchors();
        assert_eq!(state.tick_clock(5000.0, 16.67), None);
        assert_eq!(state.accel_start, Some(5000.0));
    }
}
