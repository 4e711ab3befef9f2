//! Native terminal implementation using crossterm on the process's tty.

use std::io::{self, IsTerminal};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

use super::{KeySource, Terminal};

/// The process's controlling terminal, reached through stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinTerminal;

impl StdinTerminal {
    /// Create a new StdinTerminal.
    pub fn new() -> Self {
        Self
    }
}

impl Terminal for StdinTerminal {
    // crossterm keeps the original termios until raw mode is disabled.
    type Mode = ();

    fn enter_raw(&self) -> io::Result<()> {
        // Lines are read from stdin; falling back to /dev/tty would read
        // from a terminal the caller did not hand us.
        if !io::stdin().is_terminal() {
            return Err(Errno::ENOTTY.into());
        }
        terminal::enable_raw_mode()
    }

    fn restore(&self, _mode: &()) -> io::Result<()> {
        terminal::disable_raw_mode()
    }

    fn stop_process(&self) -> io::Result<()> {
        kill(Pid::this(), Signal::SIGTSTP)?;
        Ok(())
    }
}

/// Keys decoded by crossterm from the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalKeys;

impl TerminalKeys {
    /// Create a new TerminalKeys.
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> io::Result<Option<KeyEvent>> {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => return Ok(Some(key)),
                Ok(_) => {}
                // Stop and continue signals interrupt the wait.
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
    }
}
