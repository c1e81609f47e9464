use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use trackwatch::{
    events, report, ui, App, ConsistencyMode, DashboardApi, Dispatcher, HttpSource, Settings,
};

#[derive(Parser, Debug)]
#[command(name = "trackwatch")]
#[command(about = "Terminal dashboard for a GPS/alert event-tracking pipeline")]
struct Args {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host (DNS name or IP) the services are reached on
    #[arg(long)]
    host: Option<String>,

    /// Stats poll interval in milliseconds
    #[arg(short, long)]
    poll_interval: Option<u64>,

    /// How long error notices stay visible, in milliseconds
    #[arg(long)]
    error_ttl: Option<u64>,

    /// Consistency-check contract spoken by the backend
    #[arg(long, value_enum)]
    consistency_mode: Option<ConsistencyMode>,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Fetch the stats once, print them and exit
    #[arg(long, conflicts_with = "check")]
    once: bool,

    /// Run the consistency check once, print the result and exit
    #[arg(long, conflicts_with = "once")]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        settings.base_host = host;
    }
    if let Some(ms) = args.poll_interval {
        settings.poll_interval_ms = ms;
    }
    if let Some(ms) = args.error_ttl {
        settings.error_ttl_ms = ms;
    }
    if let Some(mode) = args.consistency_mode {
        settings.consistency_mode = mode;
    }
    settings.validate()?;

    let interactive = !args.once && !args.check;
    init_logging(&settings.log_level, args.log_file.as_deref(), interactive)?;

    let rt = tokio::runtime::Runtime::new()?;
    let source = Arc::new(HttpSource::from_settings(&settings)?);
    info!(source = source.description(), "Starting trackwatch");

    if args.once || args.check {
        let out = if args.once {
            rt.block_on(report::stats(&*source))
        } else {
            rt.block_on(report::consistency(&*source, settings.consistency_mode))
        };
        println!("{}", out.text);
        if out.failed {
            bail!("Request failed");
        }
        return Ok(());
    }

    let (dispatcher, updates) =
        Dispatcher::new(source, settings.consistency_mode, rt.handle().clone());
    let poller = dispatcher.spawn_poll_loop(settings.poll_interval());
    let app = App::new(dispatcher, updates, settings.error_ttl());

    let result = run_tui(app);

    // Signal shutdown
    poller.abort();
    rt.shutdown_timeout(Duration::from_millis(500));

    result
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so interactive runs only log when a file is
/// given. One-shot runs log to stderr.
fn init_logging(level: &str, log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match (log_file, interactive) {
        (Some(path), _) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        (None, false) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init(),
        (None, true) => return Ok(()),
    };

    result.map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

/// Run the TUI until the user quits
fn run_tui(mut app: App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 24;

    while app.running {
        app.drain_updates();

        // Draw UI
        terminal.draw(|frame| {
            let area = frame.area();

            // Check for minimum terminal size
            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(20),   // Dashboard
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::dashboard::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            // Render help overlay if active
            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }
    }

    Ok(())
}
