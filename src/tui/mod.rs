pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Hold log output while the TUI owns the terminal
    crate::log::hold();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250);

    let outcome = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &app)) {
            break Err(e);
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => app.update_flash(),
            Event::Resize => {}
            Event::Closed => {
                crate::log_warn!("Terminal input closed, leaving the dashboard");
                app.should_quit = true;
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    ratatui::restore();

    // Flush held messages now that the terminal is restored
    for msg in crate::log::release() {
        eprintln!("{}", msg);
    }

    outcome?;
    Ok(())
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => {
            match key.code {
                // Quit
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.should_quit = true
                }

                // Slider selection
                KeyCode::Char('j') | KeyCode::Down => app.next_factor(),
                KeyCode::Char('k') | KeyCode::Up => app.previous_factor(),

                // Weight adjustment
                KeyCode::Char('h') | KeyCode::Left => app.adjust_selected(-1),
                KeyCode::Char('l') | KeyCode::Right => app.adjust_selected(1),
                KeyCode::Char('H') => app.adjust_selected(-app::COARSE_STEP),
                KeyCode::Char('L') => app.adjust_selected(app::COARSE_STEP),
                KeyCode::Char('0') => app.reset_weights(),

                KeyCode::Char('m') => app.cycle_market(),

                // Tab switching
                KeyCode::Tab => app.toggle_view(),

                // Data source
                KeyCode::Char('u') => app.start_upload_input(),
                KeyCode::Char('d') => app.toggle_data_source(),

                KeyCode::Char('e') => app.export(),

                // Help
                KeyCode::Char('?') => app.show_help(),

                _ => {}
            }
        }
        app::InputMode::UploadPath => {
            match key.code {
                KeyCode::Enter => app.confirm_upload_input(),
                KeyCode::Esc => app.cancel_upload_input(),
                KeyCode::Backspace => {
                    app.path_input.pop();
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.path_input.push(c);
                }
                // Ignore all other keys (don't propagate to Normal mode)
                _ => {}
            }
        }
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
