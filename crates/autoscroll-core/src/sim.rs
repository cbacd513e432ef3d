//! Headless host with a virtual clock
//!
//! `SimulatedHost` stands in for a real UI: an in-memory scroll owner and
//! content element, one outstanding frame, a timer list and a listener set.
//! `Simulation` drives an engine against it in fixed frame steps, which is
//! what the `simulate` command and the engine tests use.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use tracing::trace;

use crate::engine::{
    AutoScroll, ContentElement, EventKind, FrameHandle, Host, ScrollOwner, TimerHandle, Transform,
};

/// In-memory scroll owner; offsets are clamped to `[0, scroll_height - client_height]`
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedElement {
    pub scroll_top: f64,
    pub client_height: f64,
    pub scroll_height: f64,
    /// Number of `scroll_by` writes received
    pub writes: usize,
    /// Set whenever the offset actually moves; cleared by `take_scrolled`
    scrolled: bool,
}

impl SimulatedElement {
    pub fn new(client_height: f64, scroll_height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            client_height,
            scroll_height,
            writes: 0,
            scrolled: false,
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    /// Move the offset as a user would (not counted as an engine write)
    pub fn scroll_to(&mut self, offset: f64) {
        let clamped = offset.clamp(0.0, self.max_scroll());
        if clamped != self.scroll_top {
            self.scroll_top = clamped;
            self.scrolled = true;
        }
    }

    fn take_scrolled(&mut self) -> bool {
        std::mem::take(&mut self.scrolled)
    }
}

impl ScrollOwner for SimulatedElement {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }

    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn scroll_by(&mut self, delta: f64) {
        self.writes += 1;
        let target = self.scroll_top + delta;
        self.scroll_to(target);
    }
}

/// In-memory content element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulatedContent {
    pub transform: Transform,
    pub writes: usize,
}

impl ContentElement for SimulatedContent {
    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.writes += 1;
    }
}

#[derive(Debug)]
pub struct SimulatedHost {
    pub owner: Option<SimulatedElement>,
    pub content: Option<SimulatedContent>,
    pub reduced_motion: bool,
    pub hidden: bool,
    clock: Rc<Cell<f64>>,
    next_handle: u64,
    frame: Option<FrameHandle>,
    timers: Vec<(TimerHandle, f64)>,
    listeners: BTreeSet<EventKind>,
    frames_requested: usize,
    frames_cancelled: usize,
}

impl SimulatedHost {
    pub fn new(client_height: f64, scroll_height: f64) -> Self {
        Self {
            owner: Some(SimulatedElement::new(client_height, scroll_height)),
            content: Some(SimulatedContent::default()),
            reduced_motion: false,
            hidden: false,
            clock: Rc::new(Cell::new(0.0)),
            next_handle: 0,
            frame: None,
            timers: Vec::new(),
            listeners: BTreeSet::new(),
            frames_requested: 0,
            frames_cancelled: 0,
        }
    }

    /// Shared handle to the virtual clock, e.g. for timestamping callbacks
    pub fn clock_handle(&self) -> Rc<Cell<f64>> {
        Rc::clone(&self.clock)
    }

    pub fn scroll_top(&self) -> Option<f64> {
        self.owner.as_ref().map(|owner| owner.scroll_top)
    }

    pub fn transform(&self) -> Option<Transform> {
        self.content.as_ref().map(|content| content.transform)
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn is_listening(&self, kind: EventKind) -> bool {
        self.listeners.contains(&kind)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn frames_requested(&self) -> usize {
        self.frames_requested
    }

    pub fn frames_cancelled(&self) -> usize {
        self.frames_cancelled
    }

    fn set_clock(&self, now: f64) {
        self.clock.set(now);
    }

    fn next_timer(&self) -> Option<(TimerHandle, f64)> {
        self.timers
            .iter()
            .copied()
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Host for SimulatedHost {
    fn scroll_owner(&mut self) -> Option<&mut dyn ScrollOwner> {
        self.owner.as_mut().map(|owner| owner as &mut dyn ScrollOwner)
    }

    fn content(&mut self) -> Option<&mut dyn ContentElement> {
        self.content
            .as_mut()
            .map(|content| content as &mut dyn ContentElement)
    }

    fn now(&self) -> f64 {
        self.clock.get()
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.allocate());
        self.frame = Some(handle);
        self.frames_requested += 1;
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.frame == Some(handle) {
            self.frame = None;
            self.frames_cancelled += 1;
        }
    }

    fn set_timeout(&mut self, delay_ms: f64) -> TimerHandle {
        let handle = TimerHandle(self.allocate());
        self.timers.push((handle, self.now() + delay_ms));
        handle
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|(h, _)| *h != handle);
    }

    fn add_listener(&mut self, kind: EventKind) {
        self.listeners.insert(kind);
    }

    fn remove_listener(&mut self, kind: EventKind) {
        self.listeners.remove(&kind);
    }
}

/// Drives an engine against a `SimulatedHost` in fixed frame steps
#[derive(Debug)]
pub struct Simulation {
    pub engine: AutoScroll,
    pub host: SimulatedHost,
    frame_interval: f64,
    next_frame_at: f64,
}

impl Simulation {
    /// Default display rate
    pub const DEFAULT_FPS: f64 = 60.0;

    pub fn new(engine: AutoScroll, host: SimulatedHost) -> Self {
        Self::with_fps(engine, host, Self::DEFAULT_FPS)
    }

    pub fn with_fps(engine: AutoScroll, host: SimulatedHost, fps: f64) -> Self {
        let frame_interval = 1000.0 / fps.max(1.0);
        let next_frame_at = host.now() + frame_interval;
        Self {
            engine,
            host,
            frame_interval,
            next_frame_at,
        }
    }

    pub fn now(&self) -> f64 {
        self.host.now()
    }

    pub fn mount(&mut self) {
        self.engine.mount(&mut self.host);
    }

    pub fn unmount(&mut self) {
        self.engine.unmount(&mut self.host);
    }

    pub fn pause(&mut self) {
        self.engine.pause(&mut self.host);
    }

    pub fn resume(&mut self) {
        self.engine.resume(&mut self.host);
    }

    pub fn reset(&mut self) {
        self.engine.reset(&mut self.host);
    }

    /// Forward an event if the host is listening for it, as a real host would
    pub fn dispatch(&mut self, kind: EventKind) {
        if self.host.is_listening(kind) {
            self.engine.dispatch(kind, &mut self.host);
        }
    }

    /// Flip page visibility and deliver the change
    pub fn set_hidden(&mut self, hidden: bool) {
        self.host.hidden = hidden;
        self.dispatch(EventKind::VisibilityChange);
    }

    /// Scroll the owner as a user would and deliver the scroll event
    pub fn user_scroll_to(&mut self, offset: f64) {
        if let Some(owner) = self.host.owner.as_mut() {
            owner.scroll_to(offset);
        }
        self.flush_scroll_events();
    }

    /// Advance virtual time by `ms`, delivering timers and frames in order
    pub fn advance(&mut self, ms: f64) {
        let end = self.now() + ms;

        loop {
            let timer = self.host.next_timer();
            let frame_due = self.next_frame_at;

            match timer {
                Some((handle, due)) if due <= frame_due && due <= end => {
                    self.host.set_clock(due);
                    self.host.clear_timeout(handle);
                    self.engine.on_timer(handle, due, &mut self.host);
                }
                _ if frame_due <= end => {
                    self.host.set_clock(frame_due);
                    self.next_frame_at += self.frame_interval;
                    if let Some(handle) = self.host.frame.take() {
                        self.engine.on_frame(handle, frame_due, &mut self.host);
                        self.flush_scroll_events();
                    }
                }
                _ => break,
            }
        }

        self.host.set_clock(end);
    }

    /// Advance until `predicate` holds or `limit_ms` has elapsed; returns whether it held
    pub fn advance_until(
        &mut self,
        limit_ms: f64,
        mut predicate: impl FnMut(&Self) -> bool,
    ) -> bool {
        let end = self.now() + limit_ms;
        while self.now() < end {
            if predicate(self) {
                return true;
            }
            let step = self.frame_interval.min(end - self.now());
            self.advance(step);
        }
        predicate(self)
    }

    fn flush_scroll_events(&mut self) {
        let scrolled = self
            .host
            .owner
            .as_mut()
            .map(SimulatedElement::take_scrolled)
            .unwrap_or(false);
        if scrolled {
            trace!("scroll event");
            self.dispatch(EventKind::Scroll);
        }
    }
}
