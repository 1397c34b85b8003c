//! Terminal lifecycle and rendering
//!
//! [`Tui::new`] takes over the real terminal (alternate screen, raw mode,
//! mouse capture) and gives it back on drop or panic. [`Tui::with_backend`]
//! renders into any ratatui backend without touching the terminal.

use std::{
    io::{self, Stdout},
    panic,
    sync::Once,
};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Rect, Size},
    Terminal,
};

use crate::{
    error::{EmojidexError, EmojidexResult},
    state::AtomicState,
};

static PANIC_HOOK: Once = Once::new();

pub struct Tui<S: AtomicState, B: Backend = CrosstermBackend<Stdout>> {
    terminal: Terminal<B>,
    state: S,
    /// Whether drop must restore the real terminal
    owns_terminal: bool,
}

impl<S: AtomicState> Tui<S> {
    /// Takes over stdout. Fails when stdout is not an interactive terminal.
    pub fn new(state: S) -> EmojidexResult<Self> {
        if !Self::is_real_terminal() {
            return Err(EmojidexError::terminal(
                "terminal check",
                (0, 0),
                "Not a real terminal or terminal capabilities not available".to_string(),
            )
            .into());
        }

        install_panic_hook();
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            state,
            owns_terminal: true,
        })
    }

    fn is_real_terminal() -> bool {
        if !atty::is(atty::Stream::Stdout) {
            return false;
        }

        match std::env::var("TERM") {
            Ok(term) if term == "dumb" => false,
            Ok(_) => true,
            Err(_) => false,
        }
    }

    fn setup_terminal() -> EmojidexResult<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();

        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .map_err(|e| terminal_error("terminal setup", format!("Failed to setup terminal: {}", e)))?;

        terminal::enable_raw_mode().map_err(|e| {
            terminal_error("terminal setup", format!("Failed to enable raw mode: {}", e))
        })?;

        Terminal::new(CrosstermBackend::new(stdout)).map_err(|e| {
            terminal_error("terminal setup", format!("Failed to create terminal: {}", e)).into()
        })
    }
}

impl<S: AtomicState, B: Backend> Tui<S, B> {
    /// Renders through `backend` and leaves the real terminal alone.
    pub fn with_backend(state: S, backend: B) -> EmojidexResult<Self> {
        let terminal = Terminal::new(backend).map_err(|e| {
            terminal_error("terminal setup", format!("Failed to create terminal: {}", e))
        })?;
        Ok(Self {
            terminal,
            state,
            owns_terminal: false,
        })
    }

    /// Renders a frame from a fresh state snapshot
    pub fn render<F>(&mut self, render_fn: F) -> EmojidexResult<()>
    where
        F: FnOnce(&S::Snapshot, Rect, &mut ratatui::Frame<'_>),
    {
        let snapshot = self.state.snapshot();

        self.terminal
            .draw(|frame| {
                let area = frame.area();
                render_fn(&snapshot, area, frame);
            })
            .map(|_| ())
            .map_err(|e| terminal_error("rendering", format!("Failed to render frame: {}", e)).into())
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn size(&self) -> EmojidexResult<Size> {
        self.terminal.size().map_err(|e| {
            terminal_error("terminal size", format!("Failed to get terminal size: {}", e)).into()
        })
    }

    fn restore(&mut self) -> EmojidexResult<()> {
        if self.owns_terminal {
            restore_terminal()?;
        }
        self.terminal.show_cursor().map_err(|e| {
            terminal_error("terminal cleanup", format!("Failed to show cursor: {}", e)).into()
        })
    }
}

impl<S: AtomicState, B: Backend> Drop for Tui<S, B> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            eprintln!("Failed to restore terminal: {}", e);
        }
    }
}

fn terminal_error(src: &str, msg: String) -> EmojidexError {
    EmojidexError::terminal(src, (0, src.len()), msg)
}

fn restore_terminal() -> EmojidexResult<()> {
    terminal::disable_raw_mode().map_err(|e| {
        terminal_error("terminal cleanup", format!("Failed to disable raw mode: {}", e))
    })?;

    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture).map_err(|e| {
        terminal_error("terminal cleanup", format!("Failed to restore terminal: {}", e)).into()
    })
}

/// Restores the terminal before the default panic report is printed.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            previous(info);
        }));
    });
}
