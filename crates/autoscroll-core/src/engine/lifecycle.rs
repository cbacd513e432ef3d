//! Pause/resume state machine, event subscriptions and the imperative API

use tracing::{debug, trace};

use crate::config::{AutoScrollConfig, DirectionMode, ScrollDirection};

use super::boundary::EdgeReading;
use super::events::EventKind;
use super::host::{Host, TimerHandle, Transform};
use super::{AutoScroll, Callbacks};

/// Every event kind the engine needs forwarded for `config`, in dispatch order
pub(super) fn subscriptions(config: &AutoScrollConfig) -> Vec<EventKind> {
    let mut kinds: Vec<EventKind> = Vec::new();
    let mut push = |kind: EventKind| {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    };

    config.pause_events.iter().copied().for_each(&mut push);
    config.resume_events.iter().copied().for_each(&mut push);
    push(EventKind::Scroll);
    if config.pause_on_hover {
        push(EventKind::MouseEnter);
    }
    if config.pause_on_focus {
        push(EventKind::Focus);
    }
    push(EventKind::VisibilityChange);

    kinds
}

impl AutoScroll {
    /// Pause scrolling. Fires `on_pause` only when not already paused.
    /// Always cancels a pending deferred resume.
    pub fn pause(&mut self, host: &mut dyn Host) {
        self.enter_pause(host, true);
    }

    /// Resume scrolling. Fires `on_resume` only when currently paused.
    /// Acceleration restarts from zero on the next frames.
    pub fn resume(&mut self, host: &mut dyn Host) {
        self.cancel_resume(host);
        self.leave_pause(true);
    }

    /// Toggle between paused and running
    pub fn toggle(&mut self, host: &mut dyn Host) {
        if self.pause.paused {
            self.resume(host);
        } else {
            self.pause(host);
        }
    }

    /// Clear carried distance, edge latches and the started flag, and return to
    /// the initial direction. The paused flag is left as is.
    pub fn reset(&mut self, host: &mut dyn Host) {
        self.state.accumulator = 0.0;
        self.state.boundaries.clear();
        self.state.has_started = false;
        self.state.direction = self.config.initial_direction();
        self.write_transform(host, Transform::Identity);
        debug!(direction = %self.state.direction, "auto-scroll reset");
    }

    /// Switch direction manually. Only effective with `direction = "both"`.
    pub fn change_direction(&mut self, direction: ScrollDirection, host: &mut dyn Host) {
        if self.config.direction != DirectionMode::Both || direction == self.state.direction {
            return;
        }
        self.state.boundaries.clear();
        self.turn(direction, host.now());
    }

    /// Deliver a deferred-resume timeout. Unknown handles are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle, _timestamp: f64, _host: &mut dyn Host) {
        if self.pause.resume_timer != Some(handle) {
            trace!(?handle, "ignoring stale timer");
            return;
        }
        self.pause.resume_timer = None;
        self.leave_pause(true);
    }

    /// Handle an event forwarded by the host. Events the engine is not
    /// currently subscribed to are ignored.
    pub fn dispatch(&mut self, event: EventKind, host: &mut dyn Host) {
        if !self.listeners.contains(&event) {
            return;
        }
        trace!(%event, "dispatch");

        if event == EventKind::VisibilityChange {
            self.on_visibility(host);
            return;
        }

        if self.config.pause_events.contains(&event) {
            self.enter_pause(host, true);
        }
        if self.config.resume_events.contains(&event) {
            self.request_resume(host);
        }
        if event == EventKind::Scroll {
            self.on_scroll(host);
        }
        if event == EventKind::MouseEnter && self.config.pause_on_hover {
            self.enter_pause(host, true);
        }
        if event == EventKind::Focus && self.config.pause_on_focus {
            self.enter_pause(host, true);
        }
    }

    pub(super) fn subscribe(&mut self, host: &mut dyn Host) {
        let kinds = subscriptions(&self.config);
        for kind in &kinds {
            host.add_listener(*kind);
        }
        debug!(count = kinds.len(), "subscribed to events");
        self.listeners = kinds;
    }

    pub(super) fn unsubscribe(&mut self, host: &mut dyn Host) {
        for kind in self.listeners.drain(..) {
            host.remove_listener(kind);
        }
        self.cancel_resume(host);
    }

    fn enter_pause(&mut self, host: &mut dyn Host, notify: bool) {
        self.cancel_resume(host);
        if !self.pause.paused {
            debug!(notify, "auto-scroll paused");
            if notify {
                Callbacks::fire(&mut self.callbacks.pause);
            }
        }
        self.pause.paused = true;
        self.state.halt();
        self.write_transform(host, Transform::Identity);
    }

    fn leave_pause(&mut self, notify: bool) {
        if self.pause.paused {
            debug!(notify, "auto-scroll resumed");
            if notify {
                Callbacks::fire(&mut self.callbacks.resume);
            }
        }
        self.pause.paused = false;
        self.state.reset_anchors();
    }

    /// Resume now, or after `resume_delay` when positive. A resume already
    /// pending is left alone so timers never stack.
    fn request_resume(&mut self, host: &mut dyn Host) {
        if self.config.resume_delay <= 0.0 {
            self.leave_pause(true);
            return;
        }
        if self.pause.resume_timer.is_some() {
            return;
        }
        self.pause.resume_timer = Some(host.set_timeout(self.config.resume_delay));
        trace!(delay = self.config.resume_delay, "resume scheduled");
    }

    pub(super) fn cancel_resume(&mut self, host: &mut dyn Host) {
        if let Some(handle) = self.pause.resume_timer.take() {
            host.clear_timeout(handle);
        }
    }

    fn on_scroll(&mut self, host: &mut dyn Host) {
        if let Some(owner) = host.scroll_owner() {
            let reading = EdgeReading::measure(owner, &self.config);
            self.state.boundaries.release_departed(reading);
        }
    }

    fn on_visibility(&mut self, host: &mut dyn Host) {
        if host.is_hidden() {
            self.enter_pause(host, false);
        } else {
            self.leave_pause(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_subscriptions() {
        let config = AutoScrollConfig::new(10.0);
        let kinds = subscriptions(&config);
        assert_eq!(
            kinds,
            vec![
                EventKind::Wheel,
                EventKind::TouchMove,
                EventKind::KeyDown,
                EventKind::MouseDown,
                EventKind::Focus,
                EventKind::MouseLeave,
                EventKind::TouchEnd,
                EventKind::TouchCancel,
                EventKind::Scroll,
                EventKind::VisibilityChange,
            ]
        );
    }

    #[test]
    fn test_convenience_triggers_deduplicated() {
        let mut config = AutoScrollConfig::new(10.0);
        config.pause_on_hover = true;
        config.pause_on_focus = true;
        let kinds = subscriptions(&config);

        assert_eq!(kinds.iter().filter(|k| **k == EventKind::Focus).count(), 1);
        assert!(kinds.contains(&EventKind::MouseEnter));
    }
}
