// src/ui/mod.rs

use crate::app::{App, AppState};
use ratatui::prelude::*;

mod layout;
mod widgets;

/// Draws one frame of the interface for the current application state.
///
/// # Arguments
/// * `app` - The application state; scroll positions are updated while drawing.
/// * `frame` - The `Frame` to render onto.
pub fn render(app: &mut App, frame: &mut Frame) {
    let layout = layout::create_layout(frame.area());

    widgets::input::render_input(frame, app, layout.input);
    widgets::results::render_results(frame, app, layout.report);
    widgets::summary::render_summary(frame, app, layout.summary);
    widgets::footer::render_footer(frame, app, layout.footer);

    if let AppState::Disclaimer = app.state {
        let area = frame.area();
        widgets::disclaimer_popup::render_disclaimer_popup(frame, area);
    }
}
