use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Windows terminals also report releases
    if key.kind == KeyEventKind::Release {
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Focus between the two index inputs
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => app.cycle_focus(),

        // Index input
        KeyCode::Char(c) if c.is_ascii_digit() => app.input_push(c),
        KeyCode::Backspace => app.input_pop(),
        KeyCode::Enter => app.submit_lookup(),

        // Consistency check
        KeyCode::Char('c') => app.run_consistency_check(),

        // Refresh stats now
        KeyCode::Char('r') => {
            app.refresh_stats();
            app.set_status_message("Refreshing stats".to_string());
        }

        // Dismiss error notices
        KeyCode::Char('x') | KeyCode::Esc => app.dismiss_notices(),

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}
