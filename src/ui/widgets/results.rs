// src/ui/widgets/results.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, Wrap},
};
use vanguard_recon::core::error::ScanError;
use vanguard_recon::core::models::{PortStatus, ScanRecord, ThreatReport};

/// Renders the main panel: instructions while idle, a spinner while a scan
/// runs, then the finished record or the error that ended the request.
///
/// # Arguments
/// * `frame` - The `Frame` to render onto.
/// * `app` - The application state. The scrollbar state is resized to the content.
/// * `area` - The `Rect` for the panel.
pub fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Scan Record");

    match app.state {
        AppState::Disclaimer | AppState::Idle => {
            let instructions = Paragraph::new(
                "Type a domain, an IPv4 address or a URL and press Enter.\n\
                 Tab switches between the basic and the deep profile.\n\
                 The deep profile needs an authorization token (--token).",
            )
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(instructions, area);
        }
        AppState::Scanning => {
            let spinner = SPINNER_CHARS[app.spinner_frame % SPINNER_CHARS.len()];
            let text = Paragraph::new(format!("{} Scanning {}...", spinner, app.input.trim()))
                .block(block)
                .style(Style::default().fg(Color::Cyan));
            frame.render_widget(text, area);
        }
        AppState::Finished => {
            let lines = match &app.outcome {
                Some(Ok(record)) => record_lines(record),
                Some(Err(e)) => error_lines(e),
                None => Vec::new(),
            };

            let max_scroll = lines.len().saturating_sub(area.height.saturating_sub(2) as usize);
            app.scroll_offset = app.scroll_offset.min(max_scroll);
            app.report_scroll_state = app
                .report_scroll_state
                .content_length(max_scroll)
                .position(app.scroll_offset);

            let paragraph = Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((app.scroll_offset as u16, 0));
            frame.render_widget(paragraph, area);

            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"));
            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin { vertical: 1, horizontal: 0 }),
                &mut app.report_scroll_state,
            );
        }
    }
}

fn heading(title: &str) -> Line<'static> {
    Line::from(Span::styled(title.to_string(), Style::default().bold().underlined()))
}

fn field(name: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {name}: "), Style::default().fg(Color::Gray)),
        Span::raw(value.into()),
    ])
}

fn absent(reason: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {reason}"), Style::default().fg(Color::DarkGray)))
}

/// Flattens a record into display lines, one section per lookup.
///
/// # Returns
/// The lines in display order. Lookups that produced nothing get a greyed
/// placeholder instead of disappearing.
fn record_lines(record: &ScanRecord) -> Vec<Line<'static>> {
    let mut lines = vec![
        heading("Target"),
        field("Target", record.target.clone()),
        field("Kind", record.kind.to_string()),
        field("Profile", record.profile.to_string()),
        field("Timestamp", record.timestamp.to_rfc3339()),
        field(
            "Resolved IP",
            record.resolved_ip.map(|ip| ip.to_string()).unwrap_or_else(|| "-".to_string()),
        ),
        Line::from(""),
    ];

    if let Some(hint) = &record.hint {
        lines.push(Line::from(Span::styled(hint.clone(), Style::default().fg(Color::Yellow))));
        return lines;
    }

    lines.push(heading("Registry (RDAP)"));
    match &record.registry {
        Some(registry) => {
            let handle = registry.get("handle").and_then(|v| v.as_str()).unwrap_or("-");
            let name = registry
                .get("ldhName")
                .or_else(|| registry.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("-");
            lines.push(field("Handle", handle));
            lines.push(field("Name", name));
        }
        None => lines.push(absent("No registry data.")),
    }
    lines.push(Line::from(""));

    lines.push(heading("Ownership (WHOIS)"));
    match &record.whois {
        Some(whois) => {
            lines.push(field("Server", whois.server.clone()));
            for (key, value) in &whois.fields {
                lines.push(field(key, value.clone()));
            }
        }
        None => lines.push(absent("No ownership data.")),
    }
    lines.push(Line::from(""));

    lines.push(heading("Geolocation"));
    match &record.geo {
        Some(geo) => {
            let location = [&geo.city, &geo.region, &geo.country]
                .into_iter()
                .flatten()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(field("Location", location));
            lines.push(field("Operator", geo.operator.clone().unwrap_or_default()));
            lines.push(field("Organization", geo.organization.clone().unwrap_or_default()));
            lines.push(field("ASN", geo.asn.clone().unwrap_or_default()));
        }
        None => lines.push(absent("No geolocation data.")),
    }
    lines.push(Line::from(""));

    if let Some(https) = &record.https {
        lines.push(heading("HTTPS"));
        let (text, style) = if https.reachable {
            let status = https.status_code.map(|c| c.to_string()).unwrap_or_default();
            (format!("  Reachable ({status})"), Style::default().fg(Color::Green))
        } else {
            ("  Unreachable".to_string(), Style::default().fg(Color::Red))
        };
        lines.push(Line::from(Span::styled(text, style)));
        lines.push(Line::from(""));
    }

    if let Some(ports) = &record.ports {
        lines.push(heading("Ports"));
        for probe in ports {
            let color = match probe.status {
                PortStatus::Open => Color::Green,
                PortStatus::Closed => Color::DarkGray,
                PortStatus::Error => Color::Red,
            };
            lines.push(Line::from(vec![
                Span::raw(format!("  {:>5}/tcp  ", probe.port)),
                Span::styled(probe.status.to_string(), Style::default().fg(color)),
            ]));
        }
        lines.push(Line::from(""));
    }

    if let Some(threat) = &record.threat {
        lines.push(heading("Threat Intelligence"));
        match threat {
            ThreatReport::Failed { error } => lines.push(Line::from(Span::styled(
                format!("  Lookup failed: {error}"),
                Style::default().fg(Color::Red),
            ))),
            ThreatReport::Host(host) => {
                let org = host.get("org").and_then(|v| v.as_str()).unwrap_or("-");
                let vulns = host
                    .get("vulns")
                    .and_then(|v| v.as_array())
                    .map(|v| v.len())
                    .unwrap_or(0);
                lines.push(field("Organization", org));
                lines.push(field("Known vulnerabilities", vulns.to_string()));
            }
        }
    }

    lines
}

fn error_lines(error: &ScanError) -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(error.kind().to_string(), Style::default().fg(Color::Red).bold())),
        Line::from(""),
        Line::from(error.to_string()),
    ]
}
