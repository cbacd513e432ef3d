//! Smooth auto-scroll engine
//!
//! Continuously advances a scroll owner's offset once per display frame with
//! an eased acceleration ramp, velocity smoothing and sub-pixel correction,
//! detects the top and bottom edges, and pauses on user activity.
//!
//! # Architecture
//!
//! ## Atoms
//! - `timing` - Frame delta, acceleration curve and integration helpers
//! - `boundary` - Edge readings and one-shot edge latches
//! - `events` - Event kinds the engine subscribes to
//! - `host` - Traits the environment implements
//!
//! ## Controllers
//! - `animation` - Per-frame integration (the only writer of scroll position)
//! - `lifecycle` - Pause/resume state machine, subscriptions, imperative API
//!
//! # Usage
//!
//! ```ignore
//! use autoscroll_core::{AutoScroll, AutoScrollConfig, Callbacks};
//!
//! let callbacks = Callbacks::default().on_reach_end(|| println!("done"));
//! let mut engine = AutoScroll::new(AutoScrollConfig::new(60.0), callbacks);
//! engine.mount(&mut host);
//!
//! // host delivers frames, timers and events:
//! engine.on_frame(handle, timestamp_ms, &mut host);
//! engine.dispatch(EventKind::Wheel, &mut host);
//! ```

pub mod boundary;
pub mod events;
pub mod host;
pub mod timing;

mod animation;
mod lifecycle;
mod state;


use std::fmt;

use tracing::debug;

use crate::config::{AutoScrollConfig, ScrollDirection};

pub use boundary::{Edge, EdgeLatch, EdgeReading};
pub use events::EventKind;
pub use host::{ContentElement, FrameHandle, Host, ScrollOwner, TimerHandle, Transform};

use state::{LoopState, PauseState};

type Callback = Box<dyn FnMut()>;
type DirectionCallback = Box<dyn FnMut(ScrollDirection)>;

/// Optional notification hooks
#[derive(Default)]
pub struct Callbacks {
    start: Option<Callback>,
    pause: Option<Callback>,
    resume: Option<Callback>,
    reach_end: Option<Callback>,
    reach_top: Option<Callback>,
    direction_change: Option<DirectionCallback>,
}

impl Callbacks {
    /// First motion after (re)start or reset
    pub fn on_start(mut self, f: impl FnMut() + 'static) -> Self {
        self.start = Some(Box::new(f));
        self
    }

    pub fn on_pause(mut self, f: impl FnMut() + 'static) -> Self {
        self.pause = Some(Box::new(f));
        self
    }

    pub fn on_resume(mut self, f: impl FnMut() + 'static) -> Self {
        self.resume = Some(Box::new(f));
        self
    }

    pub fn on_reach_end(mut self, f: impl FnMut() + 'static) -> Self {
        self.reach_end = Some(Box::new(f));
        self
    }

    pub fn on_reach_top(mut self, f: impl FnMut() + 'static) -> Self {
        self.reach_top = Some(Box::new(f));
        self
    }

    pub fn on_direction_change(mut self, f: impl FnMut(ScrollDirection) + 'static) -> Self {
        self.direction_change = Some(Box::new(f));
        self
    }

    fn fire(slot: &mut Option<Callback>) {
        if let Some(f) = slot.as_mut() {
            f();
        }
    }

    fn fire_direction_change(&mut self, direction: ScrollDirection) {
        if let Some(f) = self.direction_change.as_mut() {
            f(direction);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("start", &self.start.is_some())
            .field("pause", &self.pause.is_some())
            .field("resume", &self.resume.is_some())
            .field("reach_end", &self.reach_end.is_some())
            .field("reach_top", &self.reach_top.is_some())
            .field("direction_change", &self.direction_change.is_some())
            .finish()
    }
}

/// Auto-scroll engine
///
/// Owns all per-instance mutable state. Drive it from a single thread: the
/// host delivers frames (`on_frame`), timeouts (`on_timer`) and subscribed
/// events (`dispatch`), and the engine calls back into the host to schedule
/// the next frame and to write the scroll offset and transform.
#[derive(Debug)]
pub struct AutoScroll {
    config: AutoScrollConfig,
    callbacks: Callbacks,
    state: LoopState,
    pause: PauseState,
    /// Outstanding frame request, if the loop is running
    frame: Option<FrameHandle>,
    /// Event kinds currently subscribed on the host
    listeners: Vec<EventKind>,
    mounted: bool,
}

impl AutoScroll {
    pub fn new(config: AutoScrollConfig, callbacks: Callbacks) -> Self {
        let state = LoopState::new(config.initial_direction());
        Self {
            config,
            callbacks,
            state,
            pause: PauseState::default(),
            frame: None,
            listeners: Vec::new(),
            mounted: false,
        }
    }

    /// Attach to `host`: start the frame loop and subscribe to events.
    /// A disabled engine records the mount but schedules nothing.
    pub fn mount(&mut self, host: &mut dyn Host) {
        if self.mounted {
            return;
        }
        self.mounted = true;

        if !self.config.enabled {
            debug!("auto-scroll mounted while disabled");
            return;
        }

        debug!(
            speed = self.config.base_velocity(),
            direction = %self.config.direction,
            "auto-scroll mounted"
        );
        self.start_loop(host);
        self.subscribe(host);
    }

    /// Detach from `host`: cancel the outstanding frame and pending resume,
    /// release every subscription and clear the transform.
    pub fn unmount(&mut self, host: &mut dyn Host) {
        if !self.mounted {
            return;
        }
        self.stop_loop(host);
        self.unsubscribe(host);
        self.mounted = false;
        debug!("auto-scroll unmounted");
    }

    /// Apply a new configuration.
    ///
    /// Speed-only changes are hot-swapped. Loop-relevant changes restart the
    /// loop from scratch, clearing any pause; event-relevant changes
    /// re-establish subscriptions.
    pub fn reconfigure(&mut self, config: AutoScrollConfig, host: &mut dyn Host) {
        let changes = self.config.changes(&config);
        self.config = config;

        if changes.is_empty() || !self.mounted {
            return;
        }

        debug!(?changes, "auto-scroll reconfigured");

        if changes.enabled {
            if self.config.enabled {
                self.start_loop(host);
                self.subscribe(host);
            } else {
                self.stop_loop(host);
                self.unsubscribe(host);
            }
            return;
        }

        if !self.config.enabled {
            return;
        }

        if changes.animation {
            self.stop_loop(host);
            self.start_loop(host);
        }
        if changes.events {
            self.unsubscribe(host);
            self.subscribe(host);
        }
    }

    /// Change only the target speed, keeping velocity and acceleration
    pub fn set_speed(&mut self, px_per_second: f64, host: &mut dyn Host) {
        let mut config = self.config.clone();
        config.px_per_second = px_per_second;
        self.reconfigure(config, host);
    }

    pub fn config(&self) -> &AutoScrollConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Whether a frame callback is outstanding
    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn paused(&self) -> bool {
        self.pause.paused
    }

    pub fn current_direction(&self) -> ScrollDirection {
        self.state.direction
    }

    pub fn has_started(&self) -> bool {
        self.state.has_started
    }

    pub fn reached_end(&self) -> bool {
        self.state.boundaries.is_latched(Edge::End)
    }

    pub fn reached_top(&self) -> bool {
        self.state.boundaries.is_latched(Edge::Top)
    }

    /// Current velocity in px/s, signed by direction
    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    /// Last transform written to the content element
    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    /// Whether a deferred resume is pending
    pub fn resume_pending(&self) -> bool {
        self.pause.resume_timer.is_some()
    }

    /// Reinitialize loop and pause state and schedule the first frame.
    /// A fresh loop always starts unpaused, without a resume notification.
    fn start_loop(&mut self, host: &mut dyn Host) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
        self.cancel_resume(host);
        self.pause = PauseState::default();
        self.state = LoopState::new(self.config.initial_direction());
        self.write_transform(host, Transform::Identity);
        self.frame = Some(host.request_frame());
    }

    fn stop_loop(&mut self, host: &mut dyn Host) {
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
        self.write_transform(host, Transform::Identity);
    }

    fn write_transform(&mut self, host: &mut dyn Host, transform: Transform) {
        self.state.transform = transform;
        if let Some(content) = host.content() {
            content.set_transform(transform);
        }
    }
}
