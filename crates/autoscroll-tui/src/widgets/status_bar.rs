use autoscroll_core::ScrollDirection;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::container::ContainerStatus;
use crate::theme::Theme;

const HELP_HINT: &str = " q:quit space:pause r:reset d:direction +/-:speed ";

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        status: &ContainerStatus,
        message: Option<&str>,
        theme: &Theme,
    ) {
        let mode_color = if status.paused {
            theme.paused
        } else if status.reached_end || status.reached_top {
            theme.edge
        } else {
            theme.running
        };

        let mode = format!(" {} ", mode_label(status));
        let text = match message {
            Some(msg) => format!(" {}", msg),
            None => status_text(status),
        };

        let used = mode.width() + text.width() + HELP_HINT.width();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(mode, Style::default().fg(theme.bg0).bg(mode_color)),
            Span::styled(text, Style::default().fg(theme.fg1).bg(theme.bg2)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.bg2)),
            Span::styled(HELP_HINT, Style::default().fg(theme.grey2).bg(theme.bg2)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

fn mode_label(status: &ContainerStatus) -> &'static str {
    if status.paused {
        "PAUSED"
    } else if status.reached_end {
        "END"
    } else if status.reached_top {
        "TOP"
    } else {
        "SCROLL"
    }
}

/// Position, speed and the sub-row offset the terminal cannot draw
pub fn status_text(status: &ContainerStatus) -> String {
    let arrow = match status.direction {
        ScrollDirection::Down => "↓",
        ScrollDirection::Up => "↑",
    };
    format!(
        " {} {:.0}px/s | row {}/{} | {:>3.0}% | offset {:+.2}px",
        arrow,
        status.speed,
        status.row,
        status.total_rows,
        status.progress * 100.0,
        status.offset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status() -> ContainerStatus {
        ContainerStatus {
            paused: false,
            running: true,
            direction: ScrollDirection::Down,
            speed: 40.0,
            velocity: 39.5,
            reached_end: false,
            reached_top: false,
            progress: 0.5,
            offset: -0.25,
            row: 12,
            total_rows: 48,
        }
    }

    #[test]
    fn test_status_text() {
        assert_eq!(
            status_text(&status()),
            " ↓ 40px/s | row 12/48 |  50% | offset -0.25px"
        );
    }

    #[test]
    fn test_mode_label_priority() {
        let mut status = status();
        assert_eq!(mode_label(&status), "SCROLL");
        status.reached_end = true;
        assert_eq!(mode_label(&status), "END");
        status.paused = true;
        assert_eq!(mode_label(&status), "PAUSED");
    }
}
