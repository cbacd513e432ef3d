//! Host-facing traits: the engine reaches its environment only through these.
//!
//! A host owns the two elements, the frame and timer schedulers, the event
//! subscriptions and the environment signals (clock, reduced motion,
//! visibility). The engine holds handles, never the host itself.

use super::events::EventKind;

/// Identifies one scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Identifies one scheduled timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u64);

/// Cosmetic transform written to the content element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transform {
    /// No transform applied
    #[default]
    Identity,
    /// Vertical translation in fractional px
    TranslateY(f64),
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        matches!(self, Transform::Identity)
    }

    /// Vertical offset in px (0 for identity)
    pub fn offset(&self) -> f64 {
        match self {
            Transform::Identity => 0.0,
            Transform::TranslateY(y) => *y,
        }
    }
}

/// The element whose scroll offset is advanced
pub trait ScrollOwner {
    /// Current scroll offset in px
    fn scroll_top(&self) -> f64;
    /// Visible height in px
    fn client_height(&self) -> f64;
    /// Total content height in px
    fn scroll_height(&self) -> f64;
    /// Move the scroll offset by `delta` px. The owner clamps to its range.
    fn scroll_by(&mut self, delta: f64);
}

/// The child element receiving the sub-pixel correction
pub trait ContentElement {
    fn set_transform(&mut self, transform: Transform);
}

/// Everything the engine needs from its environment
pub trait Host {
    /// The scroll owner, if currently attached
    fn scroll_owner(&mut self) -> Option<&mut dyn ScrollOwner>;
    /// The content element, if currently attached
    fn content(&mut self) -> Option<&mut dyn ContentElement>;

    /// Monotonic clock in ms, same time base as frame timestamps
    fn now(&self) -> f64;
    /// Platform reduced-motion preference, polled every frame
    fn prefers_reduced_motion(&self) -> bool;
    /// Whether the page/terminal is currently hidden
    fn is_hidden(&self) -> bool;

    /// Schedule one frame callback; the host later calls `AutoScroll::on_frame`
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Schedule a timeout; the host later calls `AutoScroll::on_timer`
    fn set_timeout(&mut self, delay_ms: f64) -> TimerHandle;
    fn clear_timeout(&mut self, handle: TimerHandle);

    /// Start forwarding `kind` to `AutoScroll::dispatch`
    fn add_listener(&mut self, kind: EventKind);
    /// Stop forwarding `kind`
    fn remove_listener(&mut self, kind: EventKind);
}
