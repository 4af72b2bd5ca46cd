#![warn(clippy::all, clippy::pedantic)]

use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;

use anyhow::Context;
use blockfall::app::{self, App, AppResult};
use blockfall::clock::FrameClock;
use blockfall::config::{Config, loader};
use blockfall::ui::{self, Canvas};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, error, info};
use ratatui::{Terminal, prelude::*};

const LOG_PATH: &str = "blockfall.log";

fn main() -> anyhow::Result<()> {
    // Create log file and redirect stderr to it
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(LOG_PATH)
        .with_context(|| format!("failed to create log file {LOG_PATH}"))?;

    // Safety: We're redirecting stderr to our log file using standard POSIX operations
    unsafe {
        libc::dup2(log_file.as_raw_fd(), io::stderr().as_raw_fd());
    }

    let config = match loader::load_config_from_file() {
        Ok(config) => Some(config),
        Err(err) => {
            // Reported once the logger is up
            eprintln!("config: {err}");
            None
        }
    };
    let log_level = config
        .as_ref()
        .map_or_else(|| Config::default().log_level, |c| c.log_level.clone());

    // Configure the logger to use stderr (which is now redirected to our file)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    info!("Starting blockfall");
    let config = config.unwrap_or_else(|| {
        error!("Failed to load configuration, continuing with defaults");
        Config::default()
    });

    // Terminal initialization
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let res = run_app(&mut terminal, App::new(config));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Game error: {err:?}");
        anyhow::bail!("game loop failed: {err}");
    }

    info!("Bye");
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> AppResult<()> {
    let mut canvas = Canvas::new(app.config.field.width, app.config.field.height);
    let mut frame_clock = FrameClock::new(app.config.timing.frames_per_second);
    let mut delay_clock = FrameClock::new(app.config.timing.fall_delay);

    // Explicitly flush any pending input events that might be in the buffer
    while event::poll(Duration::ZERO)? {
        let _ = event::read()?;
    }

    loop {
        // Drain input without blocking; the latest intent of each kind wins
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = app::event_from_key(key) {
                    debug!("Input: {input:?}");
                    app.handle_event(input);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        let outcome = app.step();

        app.flush(&mut canvas);
        terminal.draw(|f| ui::render(f, &canvas, &app))?;

        frame_clock.tick();
        if outcome.applied_gravity() {
            delay_clock.tick();
        }
    }
}
