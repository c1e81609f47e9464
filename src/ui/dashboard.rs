//! Dashboard view rendering.
//!
//! Lays out the error banner, the two stats panels, the two lookup panels
//! and the consistency-check result.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::data::{EventKind, StatsPanel};

/// Most notices shown at once; older ones stay queued until they expire.
const MAX_VISIBLE_NOTICES: usize = 3;

/// Render the whole dashboard into `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let banner_height = if app.notices.is_empty() {
        0
    } else {
        (app.notices.len().min(MAX_VISIBLE_NOTICES) * 2 + 2) as u16
    };

    let chunks = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Length(7), // Stats panels
        Constraint::Min(6),    // Lookup panels
        Constraint::Min(8),    // Consistency result
    ])
    .split(area);

    if banner_height > 0 {
        render_notices(frame, app, chunks[0]);
    }

    let stats = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    render_stats(frame, app, StatsPanel::Processing, stats[0]);
    render_stats(frame, app, StatsPanel::Analyzer, stats[1]);

    let lookups = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_lookup(frame, app, EventKind::Gps, lookups[0]);
    render_lookup(frame, app, EventKind::Alert, lookups[1]);

    render_consistency(frame, app, chunks[3]);
}

fn panel<'a>(app: &App, title: &'a str, focused: bool) -> Block<'a> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), app.theme.header))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(app.theme.border_style(focused))
}

fn render_notices(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    for notice in app.notices.iter().take(MAX_VISIBLE_NOTICES) {
        lines.push(Line::from(Span::styled(
            notice.headline(),
            app.theme.error_style(),
        )));
        lines.push(Line::from(format!("  {}", notice.message)));
    }

    let block = Block::default()
        .title(Span::styled(" Errors ", app.theme.error_style()))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.error));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_stats(frame: &mut Frame, app: &App, panel: StatsPanel, area: Rect) {
    let view = app.stats(panel);
    let paragraph = match view.text {
        Some(ref text) => Paragraph::new(text.as_str()),
        None => Paragraph::new("Loading...").style(app.theme.pending_style()),
    };
    frame.render_widget(paragraph.block(self::panel(app, panel.title(), false)), area);
}

fn render_lookup(frame: &mut Frame, app: &App, kind: EventKind, area: Rect) {
    let view = app.lookup_view(kind);
    let focused = app.focus.kind() == kind;
    let title = format!("{} Event", kind.label());
    let block = panel(app, &title, focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(inner);

    let cursor = if focused { "▏" } else { "" };
    let input_style = if focused {
        app.theme.focused
    } else {
        Style::default()
    };
    let input = Line::from(vec![
        Span::styled("Index: ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(format!("{}{}", view.input, cursor), input_style),
    ]);
    frame.render_widget(Paragraph::new(input), rows[0]);

    let body = if view.in_flight() {
        Paragraph::new("Fetching...").style(app.theme.pending_style())
    } else if view.text == kind.lookup_error_text() {
        Paragraph::new(view.text.as_str()).style(app.theme.error_style())
    } else {
        Paragraph::new(view.text.as_str())
    };
    frame.render_widget(body.wrap(Wrap { trim: false }), rows[1]);
}

fn render_consistency(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.consistency.text.is_empty() {
        "Press 'c' to run a consistency check"
    } else {
        app.consistency.text.as_str()
    };
    let style = if app.consistency.text.is_empty() {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        Style::default()
    };
    let title = format!(
        "Consistency Check ({:?})",
        app.dispatcher().consistency_mode()
    );
    frame.render_widget(
        Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: false })
            .block(panel(app, &title, false)),
        area,
    );
}
