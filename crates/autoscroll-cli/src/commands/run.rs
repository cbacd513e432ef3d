use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use autoscroll_core::{AppConfig, Callbacks};
use autoscroll_tui::{
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event, Action},
    widgets::{ContentViewWidget, StatusBarWidget},
    AutoScrollContainer, Theme,
};

use super::ScrollOverrides;

/// How long a callback notice stays in the status bar
const NOTICE_TTL: Duration = Duration::from_secs(2);

/// Input poll interval on the reader thread
const INPUT_POLL_MS: u64 = 50;

/// Short-lived status bar message set from engine callbacks
#[derive(Debug, Default)]
struct Notice {
    message: Option<(String, Instant)>,
}

impl Notice {
    fn set(&mut self, message: impl Into<String>) {
        self.message = Some((message.into(), Instant::now()));
    }

    fn current(&mut self) -> Option<&str> {
        if let Some((_, at)) = &self.message {
            if at.elapsed() > NOTICE_TTL {
                self.message = None;
            }
        }
        self.message.as_ref().map(|(text, _)| text.as_str())
    }
}

pub async fn run(config: AppConfig, file: PathBuf, overrides: ScrollOverrides) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut scroll = config.scroll.clone();
    overrides.apply(&mut scroll);
    scroll.validate()?;

    let notice = Rc::new(RefCell::new(Notice::default()));
    let callbacks = notice_callbacks(&notice);

    let title = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let mut container =
        AutoScrollContainer::new(title, text, scroll, callbacks).with_wrap(config.ui.wrap);

    info!(file = %file.display(), "starting auto-scroll");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        SetTitle("autoscroll")
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut container, &config, &notice).await;
    container.unmount();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;

    result
}

fn notice_callbacks(notice: &Rc<RefCell<Notice>>) -> Callbacks {
    let say = |message: &'static str| {
        let notice = Rc::clone(notice);
        move || notice.borrow_mut().set(message)
    };

    Callbacks::default()
        .on_pause(say("Paused"))
        .on_resume(say("Resumed"))
        .on_reach_end(say("Reached the end"))
        .on_reach_top(say("Reached the top"))
        .on_direction_change({
            let notice = Rc::clone(notice);
            move |direction| {
                notice
                    .borrow_mut()
                    .set(format!("Scrolling {}", direction))
            }
        })
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    container: &mut AutoScrollContainer,
    config: &AppConfig,
    notice: &Rc<RefCell<Notice>>,
) -> Result<()> {
    let theme = Theme::default();
    let show_status_bar = config.ui.show_status_bar;

    // Crossterm polling blocks, so input is read on its own thread
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<AppEvent>();
    let reader = tokio::task::spawn_blocking(move || -> Result<()> {
        let handler = EventHandler::new(INPUT_POLL_MS);
        loop {
            if let Some(event) = handler.next()? {
                if input_tx.send(event).is_err() {
                    return Ok(());
                }
            }
        }
    });

    let frame_interval = Duration::from_secs_f64(1.0 / f64::from(config.ui.frame_rate.max(1)));
    let mut frames = tokio::time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let draw = |terminal: &mut Terminal<B>, container: &mut AutoScrollContainer| {
        terminal.draw(|frame| {
            let (panel, bar) = split(frame.area(), show_status_bar);
            container.layout(panel);
            ContentViewWidget::render(frame, panel, container, &theme);
            if let Some(bar) = bar {
                let mut notice = notice.borrow_mut();
                StatusBarWidget::render(frame, bar, &container.status(), notice.current(), &theme);
            }
        })
        .map(|_| ())
    };

    // Lay out once so the engine sees real geometry from its first frame
    draw(terminal, container)?;
    container.mount();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                container.tick();
                draw(terminal, container)?;
            }
            event = input_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                if handle_event(container, event) {
                    debug!("quit requested");
                    break;
                }
            }
        }
    }

    drop(input_rx);
    reader.await??;

    Ok(())
}

/// Content panel plus an optional one-row status bar
fn split(area: Rect, show_status_bar: bool) -> (Rect, Option<Rect>) {
    if !show_status_bar {
        return (area, None);
    }
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (layout[0], Some(layout[1]))
}

/// Apply one input event; returns true when the user asked to quit
fn handle_event(container: &mut AutoScrollContainer, event: AppEvent) -> bool {
    let action = match event {
        AppEvent::Key(key) => handle_key_event(key),
        AppEvent::Mouse(mouse) => handle_mouse_event(mouse),
        AppEvent::FocusLost => {
            container.set_focused(false);
            return false;
        }
        AppEvent::FocusGained => {
            container.set_focused(true);
            return false;
        }
        AppEvent::Resize(_, _) | AppEvent::Tick => return false,
    };

    match action {
        Action::Quit => return true,
        Action::TogglePause => container.toggle(),
        Action::Reset => container.reset(),
        Action::ChangeDirection => container.reverse(),
        Action::AdjustSpeed(delta) => container.adjust_speed(delta),
        Action::Wheel(rows) => container.wheel(rows),
        Action::Pointer(column, row) => container.pointer_at(column, row),
        Action::Forward(kind) => container.handle(kind),
        Action::None => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use autoscroll_core::{AutoScrollConfig, EventKind};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    fn container() -> AutoScrollContainer {
        let text = (0..50).map(|i| i.to_string()).collect::<Vec<_>>().join("\n");
        let mut container =
            AutoScrollContainer::new("t", text, AutoScrollConfig::new(40.0), Callbacks::default());
        container.layout(Rect::new(0, 0, 20, 10));
        container.mount();
        container
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_split_with_status_bar() {
        let (panel, bar) = split(Rect::new(0, 0, 80, 24), true);
        assert_eq!(panel.height, 23);
        assert_eq!(bar.map(|b| b.y), Some(23));

        let (panel, bar) = split(Rect::new(0, 0, 80, 24), false);
        assert_eq!(panel.height, 24);
        assert!(bar.is_none());
    }

    #[test]
    fn test_keys_drive_container() {
        let mut container = container();

        assert!(!handle_event(&mut container, key(KeyCode::Char(' '))));
        assert!(container.engine().paused());
        handle_event(&mut container, key(KeyCode::Char(' ')));
        assert!(!container.engine().paused());

        // any other key counts as user activity
        handle_event(&mut container, key(KeyCode::Down));
        assert!(container.engine().paused());
        assert!(container.host().is_listening(EventKind::KeyDown));

        assert!(handle_event(&mut container, key(KeyCode::Char('q'))));
    }

    #[test]
    fn test_focus_events_toggle_visibility() {
        let mut container = container();
        handle_event(&mut container, AppEvent::FocusLost);
        assert!(container.engine().paused());
        handle_event(&mut container, AppEvent::FocusGained);
        assert!(!container.engine().paused());
    }

    #[test]
    fn test_notice_expires() {
        let mut notice = Notice::default();
        assert_eq!(notice.current(), None);
        notice.set("Paused");
        assert_eq!(notice.current(), Some("Paused"));

        notice.message = Some(("old".to_string(), Instant::now() - NOTICE_TTL * 2));
        assert_eq!(notice.current(), None);
    }
}
