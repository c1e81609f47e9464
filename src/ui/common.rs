//! Common UI components shared across the dashboard.
//!
//! This module contains the header bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;

/// Render the header bar.
///
/// Displays: title, backend description, time of the last poll, notice count.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let updated = app.last_updated.as_deref().unwrap_or("never");

    let mut spans = vec![
        Span::styled(
            " TRACKWATCH ",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        Span::raw(app.source_description().to_string()),
        Span::raw(" │ Last updated: "),
        Span::styled(updated.to_string(), Style::default().fg(app.theme.fresh)),
    ];

    if !app.notices.is_empty() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            format!("{} error(s)", app.notices.len()),
            app.theme.error_style(),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the status bar at the bottom.
///
/// Shows the temporary status message if one is active, otherwise the
/// available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    // Check for temporary status message first
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = if app.notices.is_empty() {
        "Tab:focus 0-9:index Enter:lookup c:check r:refresh ?:help q:quit"
    } else {
        "Tab:focus 0-9:index Enter:lookup c:check r:refresh x:dismiss ?:help q:quit"
    };
    let status = format!(" {} index | {}", app.focus.kind().label(), controls);

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));

    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Event lookup",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab         Switch GPS/Alert input"),
        Line::from("  0-9         Type an index"),
        Line::from("  Backspace   Delete a digit"),
        Line::from("  Enter       Fetch the event"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  c         Run consistency check"),
        Line::from("  r         Refresh stats now"),
        Line::from("  x / Esc   Dismiss error notices"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 42u16.min(area.width.saturating_sub(4));
    let help_height = 19u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    // Clear the area behind the help
    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
