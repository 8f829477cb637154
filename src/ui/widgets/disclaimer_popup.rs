// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    text::Line,
};

/// Renders the authorization reminder shown before the first scan. The
/// popup area is cleared first so the panels underneath do not bleed through.
///
/// # Arguments
/// * `frame` - A mutable reference to the `Frame` used for rendering.
/// * `area` - The total area the popup is centered in.
pub fn render_disclaimer_popup(frame: &mut Frame, area: Rect) {
    let disclaimer_text = Text::from(vec![
        Line::from("AUTHORIZED USE ONLY".bold().yellow()),
        Line::from(""),
        Line::from("Vanguard Recon gathers registry, ownership, geolocation and reachability data about a domain or an IPv4 address."),
        Line::from(""),
        Line::from("The deep profile connects to network ports on the target. Only run it against hosts you own or are explicitly permitted to assess."),
        Line::from(""),
        Line::from("Every finished scan is appended to the local scan history."),
        Line::from(""),
        Line::from("Press ".bold() + "Enter".bold().yellow() + " to continue".bold()),
    ]);

    let block = Block::default()
        .title("Disclaimer")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));

    let popup_area = centered_rect(60, 50, area);

    let popup = Paragraph::new(disclaimer_text)
        .block(block)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// Carves a centered rectangle out of `r`.
///
/// # Arguments
/// * `percent_x` - Width of the popup as a percentage of `r`.
/// * `percent_y` - Height of the popup as a percentage of `r`.
/// * `r` - The parent `Rect`.
///
/// # Returns
/// A `Rect` centered within `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}