// src/ui/widgets/input.rs

use crate::app::{App, AppState};
use ratatui::{prelude::*, widgets::{Block, Borders, Paragraph}};

/// Renders the target input box; the active profile sits in the title.
pub fn render_input(frame: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(vec![
        Span::raw("Target (domain, IPv4 or URL) "),
        Span::styled(format!("[{}]", app.profile), Style::default().fg(Color::Cyan).bold()),
    ]);
    let input_paragraph = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(input_paragraph, area);

    if let AppState::Idle = app.state {
        frame.set_cursor_position(Position::new(
            area.x + app.input.chars().count() as u16 + 1,
            area.y + 1,
        ));
    }
}
