//! playdeck-tui - Play-history screens for playdeck using Ratatui

pub mod app;
pub mod components;
pub mod keybindings;
pub mod nav;
pub mod screens;
pub mod terminal;
pub mod toolkit;

pub use app::AppState;
pub use nav::{NavigationController, NavigationError};
pub use screens::{PlayHistoryRouter, PlayHistoryScreen, ScreenContext};
pub use toolkit::Toolkit;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use playdeck_core::FilterStack;
use ratatui::prelude::*;
use screens::ConsoleListScreen;
use std::io;
use terminal::{CrosstermKeys, TerminalToolkit};
use toolkit::MESSAGE_DURATION;
use tracing::{error, info, warn};

/// Run the play-history screens on the real terminal until the root screen exits.
pub fn run(app: &AppState) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    let mut toolkit = TerminalToolkit::new(terminal, CrosstermKeys);

    let result = run_with(app, &mut toolkit);

    // Restore terminal
    disable_raw_mode()?;
    execute!(toolkit.terminal_mut().backend_mut(), LeaveAlternateScreen)?;
    toolkit.terminal_mut().show_cursor()?;

    Ok(result?)
}

/// Shown when a screen fails and the UI has to close; details go to the log.
pub const FATAL_MESSAGE: &str = "Something went wrong, closing";

/// Drive the screens with any toolkit, starting at the console list.
///
/// A message raised as the last screen closes (such as "No Play Records
/// Found" on an empty log) is held on screen before returning.
pub fn run_with(app: &AppState, toolkit: &mut dyn Toolkit) -> Result<(), NavigationError> {
    let root = PlayHistoryScreen::ConsoleList(ConsoleListScreen::new(FilterStack::new()));
    let mut nav = NavigationController::new(root);

    let result = {
        let mut ctx = ScreenContext::new(app, toolkit);
        nav.run(&mut ctx, &mut PlayHistoryRouter)
    };

    if let Err(NavigationError::Fatal { screen, source }) = &result {
        error!(screen = %screen, error = ?source, "Play history failed");
        toolkit.show_message(FATAL_MESSAGE, MESSAGE_DURATION);
    }
    if let Err(e) = toolkit.flush_messages() {
        warn!(error = %e, "Failed to show closing message");
    }

    result?;
    info!("Play history closed");
    Ok(())
}
