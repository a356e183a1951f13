//! Main application state and UI loop
//!
//! Contains the App struct and the key handling for the dashboard screen.

use crate::controller::DashboardController;
use crate::events::WorkerMessage;
use crate::filter::FilterState;
use crate::ui::dashboard::render_dashboard;
use crate::ui::splash::render_splash;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc};

/// The different screens in the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Splash screen shown while the first load is running.
    Splash,
    Dashboard,
}

/// What a key press asks the loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Application state
pub struct App {
    controller: DashboardController,

    /// The current screen being displayed in the application.
    current_screen: Screen,

    /// Receives messages from worker tasks.
    message_receiver: mpsc::Receiver<WorkerMessage>,

    /// Broadcasts shutdown signal to worker tasks.
    shutdown_sender: broadcast::Sender<()>,
}

impl App {
    pub fn new(
        controller: DashboardController,
        message_receiver: mpsc::Receiver<WorkerMessage>,
        shutdown_sender: broadcast::Sender<()>,
    ) -> Self {
        Self {
            controller,
            current_screen: Screen::Splash,
            message_receiver,
            shutdown_sender,
        }
    }

    /// Apply a key press on the dashboard screen.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return KeyOutcome::Quit;
        }

        // The details popup swallows navigation until closed
        if self.controller.state().details.is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('d') => {
                    self.controller.close_details();
                }
                KeyCode::Char('w') => self.toggle_details_watch(),
                KeyCode::Char('q') => return KeyOutcome::Quit,
                _ => {}
            }
            return KeyOutcome::Continue;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.controller.refresh(true);
            }
            KeyCode::Char('f') => self.controller.cycle_filter(),
            KeyCode::Char('1') => self.controller.set_filter(FilterState::All),
            KeyCode::Char('2') => self.controller.set_filter(FilterState::High),
            KeyCode::Char('3') => self.controller.set_filter(FilterState::Medium),
            KeyCode::Down | KeyCode::Char('j') => self.controller.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.controller.select_previous(),
            KeyCode::Enter | KeyCode::Char('d') => {
                if let Some(asset_id) = self.controller.selected_asset_id() {
                    self.controller.show_details(&asset_id);
                }
            }
            KeyCode::Char('w') => {
                if let Some(asset_id) = self.controller.selected_asset_id() {
                    // Failures are already in the activity log
                    let _ = self.controller.toggle_watchlist(&asset_id);
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }

    fn toggle_details_watch(&mut self) {
        if let Some(asset_id) = self.controller.state().details.clone() {
            let _ = self.controller.toggle_watchlist(&asset_id);
        }
    }

    /// Hand every queued worker message to the controller.
    fn drain_messages(&mut self) {
        while let Ok(message) = self.message_receiver.try_recv() {
            self.controller.handle(message);
        }
    }
}

/// Runs the application UI in a loop, handling events and rendering the appropriate screen.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    let splash_start = Instant::now();
    let splash_duration = Duration::from_secs(2);

    app.controller.initialize();

    // UI event loop
    loop {
        app.drain_messages();
        app.controller.state_mut().update();
        terminal.draw(|f| render(f, &app))?;

        if app.current_screen == Screen::Splash && splash_start.elapsed() >= splash_duration {
            app.current_screen = Screen::Dashboard;
            continue;
        }

        // Poll for key events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Skip events that are not KeyEventKind::Press
                if key.kind == event::KeyEventKind::Release {
                    continue;
                }

                let outcome = match app.current_screen {
                    Screen::Splash => {
                        if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                            KeyOutcome::Quit
                        } else {
                            // Any other key skips the splash screen
                            app.current_screen = Screen::Dashboard;
                            KeyOutcome::Continue
                        }
                    }
                    Screen::Dashboard => app.handle_key(key),
                };

                if outcome == KeyOutcome::Quit {
                    // Send shutdown signal to workers
                    let _ = app.shutdown_sender.send(());
                    return Ok(());
                }
            }
        }
    }
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, app: &App) {
    match app.current_screen {
        Screen::Splash => render_splash(f),
        Screen::Dashboard => render_dashboard(f, app.controller.state()),
    }
}
