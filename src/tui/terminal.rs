use anyhow::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};

/// Owns raw mode and the alternate screen for as long as it lives.
///
/// Dropping the guard puts the terminal back, whether the dashboard loop
/// returned normally, bailed out with `?`, or unwound from a panic.
pub struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    pub fn acquire() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        match Self::enter() {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                restore();
                Err(err)
            }
        }
    }

    fn enter() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        crossterm::execute!(
            stdout,
            crossterm::terminal::EnterAlternateScreen,
            crossterm::cursor::Hide
        )?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(terminal)
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore();
        log::debug!("terminal restored");
    }
}

fn restore() {
    if let Err(err) = crossterm::execute!(
        io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    ) {
        log::error!("failed to leave alternate screen: {err}");
    }
    if let Err(err) = crossterm::terminal::disable_raw_mode() {
        log::error!("failed to disable raw mode: {err}");
    }
}
