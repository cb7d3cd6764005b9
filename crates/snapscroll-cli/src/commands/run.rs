use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use snapscroll_core::AppConfig;
use snapscroll_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    widgets::{DeckWidget, HeaderWidget, StatusBarWidget},
    Deck,
};

pub async fn run(config: AppConfig, deck_path: &Path) -> Result<()> {
    let source = tokio::fs::read_to_string(deck_path)
        .await
        .with_context(|| format!("reading deck {}", deck_path.display()))?;
    let title = deck_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "deck".to_string());
    let deck = Deck::parse(&title, &source)?;

    let (cols, rows) = crossterm::terminal::size()?;
    let event_handler =
        EventHandler::with_animation_fps(config.ui.tick_rate_ms, config.ui.animation_fps);
    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let mut app = App::new(config, deck, cols, rows, Instant::now())?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetTitle(format!("snapscroll - {}", title))
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &event_handler, tick_rate);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        app.tick(Instant::now());

        // Draw UI
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                ])
                .split(frame.area());

            HeaderWidget::render(frame, layout[0], app);
            DeckWidget::render(frame, layout[1], app);
            StatusBarWidget::render(frame, layout[2], app);
        })?;

        // Poll at frame rate while animating or a timer is about to fire
        let event = if app.needs_fast_update(Instant::now(), tick_rate) {
            event_handler.next_animation()?
        } else {
            event_handler.next()?
        };

        if let Some(event) = event {
            let now = Instant::now();
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key);
                    app.handle_action(action, now);
                }
                AppEvent::Wheel { down } => app.wheel(if down { 1.0 } else { -1.0 }, now),
                AppEvent::Resize(cols, rows) => app.on_resize(cols, rows, now),
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
