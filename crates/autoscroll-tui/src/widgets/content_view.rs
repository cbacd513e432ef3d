use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::container::AutoScrollContainer;
use crate::theme::Theme;

pub struct ContentViewWidget;

impl ContentViewWidget {
    pub fn render(frame: &mut Frame, area: Rect, container: &AutoScrollContainer, theme: &Theme) {
        let border_style = if container.engine().paused() {
            Style::default().fg(theme.grey0)
        } else {
            Style::default().fg(theme.accent)
        };

        let block = Block::default()
            .title(format!(" {} ", container.title()))
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::default().bg(theme.bg0));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = container
            .visible_rows()
            .iter()
            .map(|row| Line::from(Span::styled(row.as_str(), Style::default().fg(theme.fg0))))
            .collect();

        frame.render_widget(Paragraph::new(lines), inner_area);
    }
}
