//! Terminal auto-scroll container
//!
//! A viewport over wrapped text rows that implements the engine's host
//! traits. The engine works in pixels; each terminal row counts as
//! `ROW_HEIGHT_PX` pixels, so a committed scroll only shows up on screen once
//! a full row has accumulated. The sub-pixel transform has no terminal
//! equivalent and is surfaced through `ContainerStatus` instead.

use std::collections::HashSet;
use std::time::Instant;

use autoscroll_core::engine::{ContentElement, FrameHandle, ScrollOwner, TimerHandle};
use autoscroll_core::{
    AutoScroll, AutoScrollConfig, Callbacks, EventKind, Host, ScrollDirection, Transform,
};
use ratatui::layout::{Position, Rect};
use tracing::{debug, trace};

use crate::wrap::wrap_text;

/// Pixel height of one terminal row
pub const ROW_HEIGHT_PX: f64 = 16.0;

/// Scrollable region measured in pixels
#[derive(Debug, Default)]
pub struct Viewport {
    scroll_top: f64,
    client_height: f64,
    scroll_height: f64,
    scrolled: bool,
}

impl Viewport {
    fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    fn scroll_to(&mut self, offset: f64) {
        let clamped = offset.clamp(0.0, self.max_scroll());
        if clamped != self.scroll_top {
            self.scroll_top = clamped;
            self.scrolled = true;
        }
    }

    fn resize(&mut self, client_rows: usize, content_rows: usize) {
        self.client_height = client_rows as f64 * ROW_HEIGHT_PX;
        self.scroll_height = content_rows as f64 * ROW_HEIGHT_PX;
        let offset = self.scroll_top;
        self.scroll_to(offset);
    }

    /// Index of the first fully or partially visible row
    pub fn first_row(&self) -> usize {
        (self.scroll_top / ROW_HEIGHT_PX).floor() as usize
    }

    pub fn client_rows(&self) -> usize {
        (self.client_height / ROW_HEIGHT_PX) as usize
    }
}

impl ScrollOwner for Viewport {
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
        let target = self.scroll_top + delta;
        self.scroll_to(target);
    }
}

#[derive(Debug, Default)]
struct Content {
    transform: Transform,
}

impl ContentElement for Content {
    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

/// Host backed by the terminal event loop
///
/// Time only moves when the container is ticked; frames and timers are
/// delivered from `AutoScrollContainer::advance_to`.
#[derive(Debug, Default)]
pub struct TerminalHost {
    viewport: Viewport,
    content: Content,
    now_ms: f64,
    hidden: bool,
    reduced_motion: bool,
    next_handle: u64,
    frame: Option<FrameHandle>,
    timers: Vec<(TimerHandle, f64)>,
    listeners: HashSet<EventKind>,
}

impl TerminalHost {
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn is_listening(&self, kind: EventKind) -> bool {
        self.listeners.contains(&kind)
    }

    fn allocate(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn take_due_timers(&mut self, now: f64) -> Vec<TimerHandle> {
        let mut due = Vec::new();
        self.timers.retain(|(handle, at)| {
            if *at <= now {
                due.push(*handle);
                false
            } else {
                true
            }
        });
        due
    }
}

impl Host for TerminalHost {
    fn scroll_owner(&mut self) -> Option<&mut dyn ScrollOwner> {
        Some(&mut self.viewport)
    }

    fn content(&mut self) -> Option<&mut dyn ContentElement> {
        Some(&mut self.content)
    }

    fn now(&self) -> f64 {
        self.now_ms
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
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.frame == Some(handle) {
            self.frame = None;
        }
    }

    fn set_timeout(&mut self, delay_ms: f64) -> TimerHandle {
        let handle = TimerHandle(self.allocate());
        self.timers.push((handle, self.now_ms + delay_ms));
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

/// Snapshot for the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerStatus {
    pub paused: bool,
    pub running: bool,
    pub direction: ScrollDirection,
    /// Effective target speed in px/s
    pub speed: f64,
    pub velocity: f64,
    pub reached_end: bool,
    pub reached_top: bool,
    /// Scroll progress in `[0, 1]`
    pub progress: f64,
    /// Sub-row transform in pixels
    pub offset: f64,
    pub row: usize,
    pub total_rows: usize,
}

/// Auto-scrolling text panel: engine, terminal host and wrapped content
#[derive(Debug)]
pub struct AutoScrollContainer {
    engine: AutoScroll,
    host: TerminalHost,
    epoch: Instant,
    title: String,
    text: String,
    rows: Vec<String>,
    wrap: bool,
    wrapped_width: Option<usize>,
    area: Rect,
    hovered: bool,
}

impl AutoScrollContainer {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        config: AutoScrollConfig,
        callbacks: Callbacks,
    ) -> Self {
        Self {
            engine: AutoScroll::new(config, callbacks),
            host: TerminalHost::default(),
            epoch: Instant::now(),
            title: title.into(),
            text: text.into(),
            rows: Vec::new(),
            wrap: true,
            wrapped_width: None,
            area: Rect::default(),
            hovered: false,
        }
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn mount(&mut self) {
        self.engine.mount(&mut self.host);
    }

    pub fn unmount(&mut self) {
        self.engine.unmount(&mut self.host);
    }

    /// Fit the viewport to `area` (including its one-cell border)
    pub fn layout(&mut self, area: Rect) {
        if area == self.area && self.wrapped_width.is_some() {
            return;
        }
        self.area = area;

        let inner_width = area.width.saturating_sub(2) as usize;
        let inner_height = area.height.saturating_sub(2) as usize;
        let width = if self.wrap { inner_width } else { 0 };

        if self.wrapped_width != Some(width) {
            self.rows = wrap_text(&self.text, width);
            self.wrapped_width = Some(width);
            debug!(width, rows = self.rows.len(), "content wrapped");
        }

        self.host.viewport.resize(inner_height, self.rows.len());
        self.flush_scroll_events();
    }

    /// Deliver due timers and the pending frame at the current wall time
    pub fn tick(&mut self) {
        let now = self.epoch.elapsed().as_secs_f64() * 1000.0;
        self.advance_to(now);
    }

    /// Deliver due timers and the pending frame at `now_ms` since creation
    pub fn advance_to(&mut self, now_ms: f64) {
        self.host.now_ms = now_ms.max(self.host.now_ms);
        let now = self.host.now_ms;

        for handle in self.host.take_due_timers(now) {
            self.engine.on_timer(handle, now, &mut self.host);
        }
        if let Some(handle) = self.host.frame.take() {
            self.engine.on_frame(handle, now, &mut self.host);
        }
        self.flush_scroll_events();
    }

    /// Forward `kind` to the engine if it is subscribed
    pub fn handle(&mut self, kind: EventKind) {
        if self.host.is_listening(kind) {
            self.engine.dispatch(kind, &mut self.host);
        }
    }

    /// Mouse wheel: notify the engine, then move the viewport as the user asked
    pub fn wheel(&mut self, rows: i32) {
        self.handle(EventKind::Wheel);
        self.scroll_rows(rows);
    }

    pub fn scroll_rows(&mut self, rows: i32) {
        let target = self.host.viewport.scroll_top + f64::from(rows) * ROW_HEIGHT_PX;
        self.host.viewport.scroll_to(target);
        self.flush_scroll_events();
    }

    /// Track the pointer, emitting enter/leave when it crosses the panel edge
    pub fn pointer_at(&mut self, column: u16, row: u16) {
        let inside = self.area.contains(Position::new(column, row));
        if inside == self.hovered {
            return;
        }
        self.hovered = inside;
        trace!(inside, "pointer crossed panel");
        self.handle(if inside {
            EventKind::MouseEnter
        } else {
            EventKind::MouseLeave
        });
    }

    /// Terminal focus stands in for page visibility
    pub fn set_focused(&mut self, focused: bool) {
        self.host.hidden = !focused;
        self.handle(EventKind::VisibilityChange);
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.host.reduced_motion = reduced;
    }

    pub fn pause(&mut self) {
        self.engine.pause(&mut self.host);
    }

    pub fn resume(&mut self) {
        self.engine.resume(&mut self.host);
    }

    pub fn toggle(&mut self) {
        self.engine.toggle(&mut self.host);
    }

    pub fn reset(&mut self) {
        self.engine.reset(&mut self.host);
    }

    /// Flip direction; only effective in `both` mode
    pub fn reverse(&mut self) {
        let next = self.engine.current_direction().reversed();
        self.engine.change_direction(next, &mut self.host);
    }

    /// Nudge the target speed, never below zero
    pub fn adjust_speed(&mut self, delta: f64) {
        let speed = (self.engine.config().px_per_second + delta).max(0.0);
        self.engine.set_speed(speed, &mut self.host);
    }

    pub fn reconfigure(&mut self, config: AutoScrollConfig) {
        self.engine.reconfigure(config, &mut self.host);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn engine(&self) -> &AutoScroll {
        &self.engine
    }

    pub fn host(&self) -> &TerminalHost {
        &self.host
    }

    /// Rows currently inside the viewport
    pub fn visible_rows(&self) -> &[String] {
        let first = self.host.viewport.first_row().min(self.rows.len());
        let last = (first + self.host.viewport.client_rows()).min(self.rows.len());
        &self.rows[first..last]
    }

    pub fn status(&self) -> ContainerStatus {
        let viewport = &self.host.viewport;
        let max = viewport.max_scroll();
        let progress = if max > 0.0 {
            viewport.scroll_top / max
        } else {
            1.0
        };

        ContainerStatus {
            paused: self.engine.paused(),
            running: self.engine.is_running(),
            direction: self.engine.current_direction(),
            speed: self.engine.config().base_velocity(),
            velocity: self.engine.velocity(),
            reached_end: self.engine.reached_end(),
            reached_top: self.engine.reached_top(),
            progress,
            offset: self.host.content.transform.offset(),
            row: viewport.first_row(),
            total_rows: self.rows.len(),
        }
    }

    fn flush_scroll_events(&mut self) {
        if std::mem::take(&mut self.host.viewport.scrolled) {
            self.handle(EventKind::Scroll);
        }
    }
}

impl Drop for AutoScrollContainer {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use autoscroll_core::DirectionMode;

    use super::*;

    fn text(lines: usize) -> String {
        (0..lines)
            .map(|i| format!("line {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn mounted(config: AutoScrollConfig, lines: usize) -> AutoScrollContainer {
        let mut container =
            AutoScrollContainer::new("test", text(lines), config, Callbacks::default());
        container.layout(Rect::new(0, 0, 40, 12));
        container.mount();
        container
    }

    fn run_for(container: &mut AutoScrollContainer, from_ms: f64, ms: f64) -> f64 {
        let mut now = from_ms;
        while now < from_ms + ms {
            now += 16.0;
            container.advance_to(now);
        }
        now
    }

    #[test]
    fn test_layout_sizes_viewport() {
        let container = mounted(AutoScrollConfig::new(64.0), 100);
        let viewport = container.host().viewport();

        assert_eq!(viewport.client_rows(), 10);
        assert_eq!(viewport.scroll_height(), 100.0 * ROW_HEIGHT_PX);
        assert_eq!(container.visible_rows().len(), 10);
        assert_eq!(container.visible_rows()[0], "line 0");
    }

    #[test]
    fn test_scrolls_rows_over_time() {
        let mut container = mounted(AutoScrollConfig::new(64.0), 100);
        run_for(&mut container, 0.0, 5000.0);

        let status = container.status();
        assert!(status.row > 0);
        assert!(status.progress > 0.0);
        assert!(status.offset.abs() < 1.0);
        assert_ne!(container.visible_rows()[0], "line 0");
    }

    #[test]
    fn test_wheel_pauses_and_moves() {
        let mut container = mounted(AutoScrollConfig::new(64.0), 100);
        let now = run_for(&mut container, 0.0, 500.0);
        let before = container.host().viewport().scroll_top();

        container.wheel(3);
        assert!(container.status().paused);
        assert_eq!(
            container.host().viewport().scroll_top(),
            before + 3.0 * ROW_HEIGHT_PX
        );

        run_for(&mut container, now, 1000.0);
        assert_eq!(
            container.host().viewport().scroll_top(),
            before + 3.0 * ROW_HEIGHT_PX
        );
    }

    #[test]
    fn test_hover_pauses_and_leave_resumes() {
        let config = AutoScrollConfig {
            pause_on_hover: true,
            ..AutoScrollConfig::new(64.0)
        };
        let mut container = mounted(config, 100);

        container.pointer_at(5, 5);
        assert!(container.status().paused);
        container.pointer_at(5, 5);

        container.pointer_at(60, 30);
        assert!(!container.status().paused);
    }

    #[test]
    fn test_focus_loss_pauses_silently() {
        let resumes = Rc::new(Cell::new(0));
        let counter = resumes.clone();
        let callbacks = Callbacks::default().on_resume(move || counter.set(counter.get() + 1));
        let mut container =
            AutoScrollContainer::new("test", text(100), AutoScrollConfig::new(64.0), callbacks);
        container.layout(Rect::new(0, 0, 40, 12));
        container.mount();

        container.set_focused(false);
        assert!(container.status().paused);
        container.set_focused(true);
        assert!(!container.status().paused);
        assert_eq!(resumes.get(), 0);
    }

    #[test]
    fn test_reaches_end_of_short_text() {
        let config = AutoScrollConfig {
            acceleration_time: 0.0,
            ..AutoScrollConfig::new(320.0)
        };
        let mut container = mounted(config, 20);
        run_for(&mut container, 0.0, 3000.0);

        let status = container.status();
        assert!(status.reached_end);
        assert!(status.row >= 9);
        assert!(status.progress > 0.99);
    }

    #[test]
    fn test_reverse_and_speed_controls() {
        let config = AutoScrollConfig {
            direction: DirectionMode::Both,
            ..AutoScrollConfig::new(64.0)
        };
        let mut container = mounted(config, 100);

        container.reverse();
        assert_eq!(container.status().direction, ScrollDirection::Up);

        container.adjust_speed(16.0);
        assert_eq!(container.status().speed, 80.0);
        container.adjust_speed(-500.0);
        assert_eq!(container.status().speed, 0.0);
    }

    #[test]
    fn test_resize_rewraps_and_clamps() {
        let long = "x".repeat(100);
        let mut container = AutoScrollContainer::new(
            "test",
            long,
            AutoScrollConfig::new(64.0),
            Callbacks::default(),
        );
        container.layout(Rect::new(0, 0, 12, 5));
        assert_eq!(container.status().total_rows, 10);

        container.layout(Rect::new(0, 0, 52, 5));
        assert_eq!(container.status().total_rows, 2);
        assert_eq!(container.host().viewport().scroll_top(), 0.0);
    }

    #[test]
    fn test_unmount_releases_listeners() {
        let mut container = mounted(AutoScrollConfig::new(64.0), 100);
        assert!(container.host().is_listening(EventKind::Wheel));

        container.unmount();
        assert!(!container.host().is_listening(EventKind::Wheel));
        assert!(!container.status().running);
    }
}
