// src/ui/widgets/summary.rs

use crate::app::App;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

/// Renders the score, the check flags and the open ports of a finished scan.
///
/// # Arguments
/// * `frame` - The `Frame` used for rendering.
/// * `app` - The application state holding the last outcome.
/// * `area` - The `Rect` for this widget.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    frame.render_widget(Block::default().borders(Borders::ALL).title("Summary"), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Score & rating
            Constraint::Length(1), // Gauge
            Constraint::Length(1),
            Constraint::Length(3), // Checks
            Constraint::Length(1),
            Constraint::Min(0),    // Open ports
        ])
        .split(area);

    let Some(record) = app.record() else { return; };

    let (rating, style) = match record.score {
        // Higher is riskier.
        65..=100 => ("Elevated", Style::default().fg(Color::Red)),
        50..=64 => ("Moderate", Style::default().fg(Color::Yellow)),
        _ => ("Low", Style::default().fg(Color::Green)),
    };
    let score_text = Text::from(vec![
        Line::from("Risk Score".bold()),
        Line::from(format!("{}/100 ({})", record.score, rating)).style(style),
    ]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), chunks[0]);

    let gauge = Gauge::default()
        .percent(u16::from(record.score))
        .label("")
        .gauge_style(style);
    frame.render_widget(gauge, chunks[1]);

    let mut check_lines = vec![Line::from("CHECKS".bold())];
    for (name, flag) in [("Registry (RDAP)", record.checks.rdap), ("HTTPS", record.checks.https)] {
        let (icon, style) = match flag {
            Some(true) => ("✓", Style::default().fg(Color::Green)),
            Some(false) => ("✗", Style::default().fg(Color::Red)),
            None => ("–", Style::default().fg(Color::DarkGray)),
        };
        check_lines.push(Line::from(vec![Span::styled(format!("{icon} "), style), Span::raw(name)]));
    }
    frame.render_widget(Paragraph::new(check_lines), chunks[3]);

    let mut port_lines = vec![Line::from("OPEN PORTS".bold())];
    match &record.ports {
        None => port_lines.push(Line::from(Span::styled("Not scanned.", Style::default().fg(Color::DarkGray)))),
        Some(_) => {
            let open: Vec<String> = record.open_ports().map(|p| p.to_string()).collect();
            if open.is_empty() {
                port_lines.push(Line::from("None."));
            } else {
                port_lines.push(Line::from(Span::styled(open.join(", "), Style::default().fg(Color::Cyan))));
            }
        }
    }
    frame.render_widget(Paragraph::new(port_lines).wrap(ratatui::widgets::Wrap { trim: true }), chunks[5]);
}
