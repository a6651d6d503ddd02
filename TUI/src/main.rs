mod action;
mod app;
mod bubble;
mod citation;
mod clipboard;
mod config;
mod fetch;
mod fluid;
mod layout;
mod logging;
mod ui;
mod ui_state;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};

use app::App;
use clipboard::SystemClipboard;
use config::{Config, APP_TITLE};
use ui::draw;

fn main() -> io::Result<()> {
    let log_path = logging::init();
    let config = Config::load_or_default(config::config_path().as_deref());
    info!("starting {} (log: {:?})", APP_TITLE, log_path);

    // Fetches run here; the UI loop stays on the main thread
    let runtime = tokio::runtime::Runtime::new()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste,
        SetTitle(APP_TITLE)
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, runtime.handle().clone(), Box::new(SystemClipboard::new()));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!("main loop failed: {}", e);
        eprintln!("Error: {}", e);
    }

    runtime.shutdown_timeout(Duration::from_millis(100));
    info!("exiting");

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(app.config.tick_rate_ms);

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, app))?;

        // Poll for events with timeout (~60 FPS for smooth animation)
        if event::poll(tick_rate)? {
            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            app.handle_event(event::read()?, area);

            // Drain whatever else queued up during the frame
            while !app.should_quit && event::poll(Duration::ZERO)? {
                app.handle_event(event::read()?, area);
            }
        }

        app.tick();
    }

    Ok(())
}
