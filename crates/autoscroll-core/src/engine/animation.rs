//! Frame loop: velocity integration, sub-pixel carry and edge detection

use tracing::{debug, trace};

use crate::config::ScrollDirection;

use super::boundary::{Edge, EdgeReading};
use super::host::{FrameHandle, Host, Transform};
use super::timing::{acceleration_progress, displacement, ease_out_cubic, lerp, split_whole};
use super::{AutoScroll, Callbacks};

impl AutoScroll {
    /// Run one frame. Frames for any handle but the outstanding one are ignored.
    ///
    /// The next frame is always requested, whatever happened in this one; only
    /// `unmount` or disabling the engine ends the loop.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp: f64, host: &mut dyn Host) {
        if self.frame != Some(handle) {
            trace!(?handle, "ignoring stale frame");
            return;
        }
        self.frame = None;

        self.step(timestamp, host);

        self.frame = Some(host.request_frame());
    }

    fn step(&mut self, now: f64, host: &mut dyn Host) {
        // Both elements must be present; acceleration timing is left untouched
        // so the loop picks up where it was once they come back.
        if host.content().is_none() {
            return;
        }
        let reading = match host.scroll_owner() {
            Some(owner) => EdgeReading::measure(owner, &self.config),
            None => return,
        };

        let Some(dt) = self.state.tick_clock(now, self.config.cap_dt_ms) else {
            return;
        };

        if self.config.respect_reduced_motion && host.prefers_reduced_motion() {
            return;
        }

        self.state.boundaries.release_departed(reading);

        let direction = self.state.direction;
        if self.pause.paused || self.state.boundaries.is_latched(Edge::ahead_of(direction)) {
            return;
        }

        if !self.state.has_started {
            self.state.has_started = true;
            debug!(%direction, "auto-scroll started");
            Callbacks::fire(&mut self.callbacks.start);
        }

        let target = self.target_velocity(now, direction);
        self.state.velocity = lerp(self.state.velocity, target, self.config.smoothing_factor);
        self.state.accumulator += displacement(self.state.velocity, dt);

        let (whole, remainder) = split_whole(self.state.accumulator);
        self.state.accumulator = remainder;

        let reading = match host.scroll_owner() {
            Some(owner) => {
                if whole != 0.0 {
                    owner.scroll_by(whole);
                }
                EdgeReading::measure(owner, &self.config)
            }
            None => return,
        };

        // The remainder is still owed to the scroll offset; shift the content
        // the opposite way so the two compose into continuous motion.
        self.write_transform(host, Transform::TranslateY(-remainder));

        trace!(
            velocity = self.state.velocity,
            committed = whole,
            remainder,
            "frame"
        );

        self.detect_edges(reading, direction, now, host);
    }

    /// Target velocity for this frame, signed by direction
    fn target_velocity(&self, now: f64, direction: ScrollDirection) -> f64 {
        let base = self.config.base_velocity() * direction.sign();
        if self.config.acceleration_time <= 0.0 {
            return base;
        }

        let elapsed = now - self.state.accel_start.unwrap_or(now);
        let progress = acceleration_progress(elapsed, self.config.acceleration_time);
        base * ease_out_cubic(progress)
    }

    fn detect_edges(
        &mut self,
        reading: EdgeReading,
        direction: ScrollDirection,
        now: f64,
        host: &mut dyn Host,
    ) {
        let edge = Edge::ahead_of(direction);

        if !reading.holds(edge) {
            self.state.boundaries.release_departed(reading);
            return;
        }

        if !self.state.boundaries.arrive(edge) {
            return;
        }

        debug!(?edge, "edge reached");
        match edge {
            Edge::End => Callbacks::fire(&mut self.callbacks.reach_end),
            Edge::Top => Callbacks::fire(&mut self.callbacks.reach_top),
        }
        self.write_transform(host, Transform::Identity);

        if self.config.reverses() {
            self.state.boundaries.rearm(edge);
            self.turn(direction.reversed(), now);
        }
    }

    /// Switch direction and restart the acceleration ramp at `now`
    pub(super) fn turn(&mut self, direction: ScrollDirection, now: f64) {
        self.state.direction = direction;
        self.state.halt();
        self.state.accel_start = Some(now);
        debug!(%direction, "direction changed");
        self.callbacks.fire_direction_change(direction);
    }
}
