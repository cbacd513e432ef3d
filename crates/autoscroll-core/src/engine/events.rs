//! Event types the engine can subscribe to on its host.
//!
//! Names follow the DOM event names so configuration files read the same way
//! regardless of which host forwards the events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An interaction or lifecycle event forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Wheel,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    KeyDown,
    MouseDown,
    MouseEnter,
    MouseLeave,
    Focus,
    Blur,
    Scroll,
    /// Document-level visibility change; the host answers `is_hidden()`
    VisibilityChange,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::Wheel,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::TouchEnd,
        EventKind::TouchCancel,
        EventKind::KeyDown,
        EventKind::MouseDown,
        EventKind::MouseEnter,
        EventKind::MouseLeave,
        EventKind::Focus,
        EventKind::Blur,
        EventKind::Scroll,
        EventKind::VisibilityChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Wheel => "wheel",
            EventKind::TouchStart => "touchstart",
            EventKind::TouchMove => "touchmove",
            EventKind::TouchEnd => "touchend",
            EventKind::TouchCancel => "touchcancel",
            EventKind::KeyDown => "keydown",
            EventKind::MouseDown => "mousedown",
            EventKind::MouseEnter => "mouseenter",
            EventKind::MouseLeave => "mouseleave",
            EventKind::Focus => "focus",
            EventKind::Blur => "blur",
            EventKind::Scroll => "scroll",
            EventKind::VisibilityChange => "visibilitychange",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| Error::UnknownEvent(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dom_names() {
        assert_eq!("wheel".parse::<EventKind>().unwrap(), EventKind::Wheel);
        assert_eq!("TouchMove".parse::<EventKind>().unwrap(), EventKind::TouchMove);
        assert_eq!(
            "visibilitychange".parse::<EventKind>().unwrap(),
            EventKind::VisibilityChange
        );
        assert!("hover".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }
}
