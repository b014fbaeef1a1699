//! Raw-mode terminal setup and teardown, and the panic hook that undoes it.
//!
//! Only a panic on the UI thread restores the terminal. The worker's render
//! contains its own panics and reports them as advisory errors, so tearing
//! the screen down for those would leave the session drawing into a
//! cooked terminal.

use std::io::{self, Stdout};
use std::panic;
use std::thread;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::error;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Name std gives the thread running `main`.
const UI_THREAD: &str = "main";

/// Whether a panic on `thread` should put the terminal back.
pub fn restores_terminal(thread: Option<&str>) -> bool {
    thread == Some(UI_THREAD)
}

/// Chain a hook in front of the default one. UI-thread panics restore the
/// terminal and print as usual; panics elsewhere only go to the log, since
/// stderr is the alternate screen.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let current = thread::current();
        if restores_terminal(current.name()) {
            let _ = restore();
            default_hook(info);
        } else {
            error!(thread = current.name().unwrap_or("unnamed"), %info, "panic off the UI thread");
        }
    }));
}

pub fn enter() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}
