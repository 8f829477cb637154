// src/ui/widgets/footer.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the one-line key legend for the current state.
///
/// # Arguments
/// * `frame` - The `Frame` to render onto.
/// * `app` - The application state; only `app.state` is read.
/// * `area` - The footer row.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.state {
        AppState::Disclaimer => Line::from(vec![
            Span::raw("Press "),
            key("Enter"),
            Span::raw(" to continue, "),
            key("Q"),
            Span::raw(" to quit."),
        ]),
        AppState::Idle => Line::from(vec![
            key("Enter"),
            Span::raw(" scan, "),
            key("Tab"),
            Span::raw(" switch profile, "),
            key("Esc"),
            Span::raw(" quit"),
        ]),
        AppState::Finished => Line::from(vec![
            key("[N]"),
            Span::raw("ew scan, "),
            key("↑/↓"),
            Span::raw(" scroll, "),
            key("[Q]"),
            Span::raw("uit"),
        ]),
        AppState::Scanning => Line::from(format!(
            "{} Scanning... Press Q to quit.",
            SPINNER_CHARS[app.spinner_frame % SPINNER_CHARS.len()]
        )),
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
