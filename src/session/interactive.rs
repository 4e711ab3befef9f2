//! The interactive session: builder, read loop and exit paths.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyEvent;
use nix::sys::signal::Signal;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::keys::{intercept_key, KeyOutcome};
use super::prompt::default_prompt;
use super::signals::{parse_signal, ControlEvent, SignalWatcher, DEFAULT_EXIT_SIGNALS};
use super::suspend::Suspender;
use crate::cli;
use crate::config::Config;
use crate::error::{CommandError, InteractionError};
use crate::terminal::{
    KeyInterceptor, KeySource, LineEditor, ReadError, StdinTerminal, Terminal, TerminalGuard,
    TerminalKeys,
};
use crate::Result;

/// Resume delay used when SIGCONT cannot be watched.
pub const DEFAULT_RESUME_DELAY: Duration = Duration::from_secs(1);

/// Function invoked with each trimmed command line.
pub type ExecuteFn = Arc<dyn Fn(&str) -> std::result::Result<(), CommandError> + Send + Sync>;

/// Why the interactive loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Input closed or Ctrl-D on an empty line.
    EndOfInput,
    /// Ctrl-C.
    Interrupted,
    /// A watched exit signal.
    Signal(Signal),
}

/// Configuration for an interactive shell.
///
/// ```no_run
/// use interaction::Interactive;
///
/// Interactive::new()
///     .with_execute(|command| {
///         println!("{}", command.to_uppercase());
///         Ok(())
///     })
///     .start()
///     .ok();
/// ```
#[derive(Clone)]
pub struct Interactive {
    execute: Option<ExecuteFn>,
    prompt: Option<String>,
    exit_signals: Vec<Signal>,
    resume_delay: Duration,
}

impl Default for Interactive {
    fn default() -> Self {
        Self {
            execute: None,
            prompt: None,
            exit_signals: Vec::new(),
            resume_delay: DEFAULT_RESUME_DELAY,
        }
    }
}

impl Interactive {
    /// Create an empty configuration. An execute function is required
    /// before the shell can start.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from loaded settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let exit_signals = config
            .session
            .exit_signals
            .iter()
            .map(|name| parse_signal(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            execute: None,
            prompt: config.prompt().map(String::from),
            exit_signals,
            resume_delay: config.resume_delay(),
        })
    }

    /// Set the function that executes commands.
    pub fn with_execute<F>(mut self, execute: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<(), CommandError> + Send + Sync + 'static,
    {
        self.execute = Some(Arc::new(execute));
        self
    }

    /// Set the prompt shown before each line.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into()).filter(|p: &String| !p.is_empty());
        self
    }

    /// Set the signals that end the session.
    pub fn with_exit_signals(mut self, signals: impl IntoIterator<Item = Signal>) -> Self {
        self.exit_signals = signals.into_iter().collect();
        self
    }

    /// Set the resume delay used when SIGCONT cannot be watched.
    pub fn with_resume_delay(mut self, delay: Duration) -> Self {
        self.resume_delay = delay;
        self
    }

    /// Create a session bound to `terminal`.
    ///
    /// Fails with [`InteractionError::MissingExecuteFn`] if no execute
    /// function was set.
    pub fn into_session<T: Terminal>(self, terminal: T) -> Result<Session<T>> {
        let execute = self.execute.ok_or(InteractionError::MissingExecuteFn)?;
        Ok(Session {
            execute,
            prompt: self.prompt,
            exit_signals: self.exit_signals,
            resume_delay: self.resume_delay,
            guard: Arc::new(TerminalGuard::new(terminal)),
        })
    }

    /// Start the shell on the process terminal.
    ///
    /// `std::env::args` may carry `-c <command>` to run a single command
    /// instead of the interactive loop, or `-h` for usage. Any other
    /// argument is a fatal error.
    ///
    /// Returns only after a successful one-shot command. Every other path
    /// ends the process: exit code 0 after the interactive loop or usage,
    /// 1 on a fatal error.
    pub fn start(self) -> Result<()> {
        let session = self
            .into_session(StdinTerminal::new())
            .unwrap_or_else(|e| fatal_untouched(e));
        let args = cli::parse_start_args().unwrap_or_else(|e| session.fatal(e));
        if args.help {
            cli::print_start_usage();
            std::process::exit(0);
        }
        session.start(args.one_shot())
    }

    /// Same as [`Interactive::start`] with the `-c` value already parsed.
    ///
    /// `None` or an empty command starts the interactive loop.
    pub fn start_with_command(self, command: Option<&str>) -> Result<()> {
        let session = self
            .into_session(StdinTerminal::new())
            .unwrap_or_else(|e| fatal_untouched(e));
        session.start(command)
    }
}

fn fatal_untouched(err: InteractionError) -> ! {
    eprintln!("{}", err);
    std::process::exit(1)
}

/// A running interactive shell that owns the terminal.
pub struct Session<T: Terminal> {
    execute: ExecuteFn,
    prompt: Option<String>,
    exit_signals: Vec<Signal>,
    resume_delay: Duration,
    guard: Arc<TerminalGuard<T>>,
}

impl<T: Terminal> Session<T> {
    /// The terminal guard holding the saved mode.
    pub fn guard(&self) -> &TerminalGuard<T> {
        &self.guard
    }

    /// The prompt, once set or resolved.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// The exit signals, once set or defaulted.
    pub fn exit_signals(&self) -> &[Signal] {
        &self.exit_signals
    }

    /// Run `command` once, or the interactive loop on the terminal's keys
    /// when it is `None` or empty.
    ///
    /// Returns only after a successful one-shot command; see
    /// [`Interactive::start`].
    pub fn start(self, command: Option<&str>) -> Result<()> {
        self.start_with(command, TerminalKeys::new(), io::stdout())
    }

    /// [`Session::start`] reading keys from `keys` and echoing to `output`.
    pub fn start_with<K, W>(mut self, command: Option<&str>, keys: K, output: W) -> Result<()>
    where
        K: KeySource + 'static,
        W: Write + Send + 'static,
    {
        if let Some(command) = command.filter(|c| !c.is_empty()) {
            if let Err(e) = self.run_command(command) {
                self.fatal(e);
            }
            self.guard.terminate();
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap_or_else(|e| self.fatal(InteractionError::Runtime(e)));

        match runtime.block_on(self.interactive(keys, output)) {
            Ok(reason) => {
                info!("session ended: {:?}", reason);
                self.exit()
            }
            Err(e) => self.fatal(e),
        }
    }

    /// Execute a single command without touching the terminal.
    pub fn run_command(&self, command: &str) -> Result<()> {
        debug!("executing one-shot command");
        (self.execute)(command).map_err(InteractionError::Command)
    }

    /// Run the read-eval-print loop until input ends, Ctrl-C or an exit
    /// signal.
    ///
    /// Resolves the default prompt and exit signals, registers the signal
    /// watcher, switches to raw mode and reads lines from `keys`, echoing
    /// to `output`. Command errors are printed to `output` and the loop
    /// continues. The terminal is restored before this returns.
    pub async fn interactive<K, W>(&mut self, keys: K, output: W) -> Result<ExitReason>
    where
        K: KeySource + 'static,
        W: Write + Send + 'static,
    {
        let prompt = match self.prompt.clone() {
            Some(prompt) => prompt,
            None => {
                let prompt = default_prompt()?;
                self.prompt = Some(prompt.clone());
                prompt
            }
        };

        if self.exit_signals.is_empty() {
            self.exit_signals = DEFAULT_EXIT_SIGNALS.to_vec();
        }

        // Signals are watched before raw mode is entered.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let signal_task = SignalWatcher::register(&self.exit_signals)?.spawn(tx.clone());

        if let Err(e) = self.guard.init() {
            signal_task.abort();
            return Err(e);
        }

        let suspender = Suspender::new(
            self.guard.clone(),
            tx.clone(),
            Handle::current(),
            self.resume_delay,
        );
        let editor = LineEditor::new(keys, output, prompt)
            .with_interceptor(key_interceptor(suspender, tx.clone()));
        let execute = self.execute.clone();
        let mut reader = tokio::task::spawn_blocking(move || read_loop(editor, execute));

        let result = tokio::select! {
            joined = &mut reader => match joined {
                Ok(result) => result,
                Err(e) => Err(InteractionError::Reader(e)),
            },
            Some(event) = rx.recv() => match event {
                ControlEvent::Signal(sig) => Ok(ExitReason::Signal(sig)),
                ControlEvent::Interrupt => Ok(ExitReason::Interrupted),
                ControlEvent::ResumeFailed(e) => Err(e),
            },
        };

        signal_task.abort();
        self.guard.terminate();
        result
    }

    /// Restore the terminal, print a newline and exit with code 0.
    pub fn exit(&self) -> ! {
        self.guard.terminate();
        println!();
        std::process::exit(0)
    }

    /// Restore the terminal, print `err` to stderr and exit with code 1.
    pub fn fatal(&self, err: impl std::fmt::Display) -> ! {
        self.guard.terminate();
        eprintln!("{}", err);
        std::process::exit(1)
    }
}

fn key_interceptor<T: Terminal>(
    suspender: Suspender<T>,
    events: mpsc::UnboundedSender<ControlEvent>,
) -> KeyInterceptor {
    Box::new(move |line: &str, pos: usize, key: KeyEvent| match intercept_key(line, pos, key) {
        KeyOutcome::Override(line, pos) => Some((line, pos)),
        KeyOutcome::PassThrough => None,
        KeyOutcome::Interrupt => {
            let _ = events.send(ControlEvent::Interrupt);
            None
        }
        KeyOutcome::Suspend => {
            suspender.suspend();
            None
        }
    })
}

fn read_loop<K: KeySource, W: Write>(
    mut editor: LineEditor<K, W>,
    execute: ExecuteFn,
) -> Result<ExitReason> {
    loop {
        let line = match editor.read_line() {
            Ok(line) => line,
            Err(ReadError::Eof) => return Ok(ExitReason::EndOfInput),
            Err(ReadError::Interrupted) => return Ok(ExitReason::Interrupted),
            Err(ReadError::Io(e)) => {
                warn!("terminal read failed: {}", e);
                return Ok(ExitReason::EndOfInput);
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Err(e) = execute(line) {
            if let Err(e) = editor.write_line(&e.to_string()) {
                warn!("failed to print command error: {}", e);
            }
        }
    }
}
