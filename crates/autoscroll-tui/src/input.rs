use autoscroll_core::EventKind;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

/// Rows moved per wheel notch
pub const WHEEL_ROWS: i32 = 3;

/// Speed change per `+`/`-` press, in px/s
pub const SPEED_STEP: f64 = 8.0;

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    TogglePause,
    Reset,
    ChangeDirection,
    AdjustSpeed(f64),
    /// Wheel scroll by rows (positive is down)
    Wheel(i32),
    /// Pointer moved to (column, row)
    Pointer(u16, u16),
    /// Forward an engine event unchanged
    Forward(EventKind),
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        // Quit
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Engine controls
        (KeyCode::Char(' '), KeyModifiers::NONE) => Action::TogglePause,
        (KeyCode::Char('r'), KeyModifiers::NONE) => Action::Reset,
        (KeyCode::Char('d'), KeyModifiers::NONE) => Action::ChangeDirection,
        (KeyCode::Char('+'), _) | (KeyCode::Char('='), KeyModifiers::NONE) => {
            Action::AdjustSpeed(SPEED_STEP)
        }
        (KeyCode::Char('-'), KeyModifiers::NONE) => Action::AdjustSpeed(-SPEED_STEP),

        // Anything else is user activity
        _ => Action::Forward(EventKind::KeyDown),
    }
}

/// Handle a mouse event and return the corresponding action
pub fn handle_mouse_event(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::Wheel(WHEEL_ROWS),
        MouseEventKind::ScrollUp => Action::Wheel(-WHEEL_ROWS),
        MouseEventKind::Down(_) => Action::Forward(EventKind::MouseDown),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Action::Pointer(mouse.column, mouse.row),
        _ => Action::None,
    }
}
