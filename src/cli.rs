//! Command-line interface for interaction.
//!
//! Two parsers live here: [`parse_start_args`] for shells embedding the
//! library, which only know `-c`, and [`parse_args`] for the `interaction`
//! binary with its full option set.
//!
//! Uses lexopt for minimal binary size overhead (~34KB).

use std::ffi::OsString;
use std::path::PathBuf;

/// Flags understood by [`Interactive::start`](crate::Interactive::start).
#[derive(Debug, Clone, Default)]
pub struct StartArgs {
    /// Command to execute once instead of starting the interactive loop.
    pub command: Option<String>,
    /// Show usage and exit.
    pub help: bool,
}

impl StartArgs {
    /// The one-shot command, if one was given and is not empty.
    pub fn one_shot(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.is_empty())
    }
}

/// Parse the embedding program's arguments.
pub fn parse_start_args() -> Result<StartArgs, ArgsError> {
    parse_start_args_from(std::env::args_os())
}

/// Parse embedding-program arguments from an iterator (for testing).
///
/// Only `-c`/`--command` and `-h`/`--help` are accepted.
pub fn parse_start_args_from<I>(args: I) -> Result<StartArgs, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = StartArgs::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('c') | Long("command") => {
                result.command = Some(parser.value()?.parse()?);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print usage for an embedding program.
pub fn print_start_usage() {
    let program = std::env::args_os()
        .next()
        .map(PathBuf::from)
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "interaction".to_string());
    println!(
        r#"Usage: {program} [-c <command>]

    -c, --command <CMD>     Execute a single command and exit
    -h, --help              Print help

Without -c an interactive shell is started."#
    );
}

/// Command-line arguments of the `interaction` binary.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Command to execute once instead of starting the interactive loop.
    pub command: Option<String>,
    /// Prompt shown before each input line.
    pub prompt: Option<String>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

impl Args {
    /// The one-shot command, if one was given and is not empty.
    pub fn one_shot(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.is_empty())
    }
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("command") => {
                result.command = Some(parser.value()?.parse()?);
            }
            Short('p') | Long("prompt") => {
                result.prompt = Some(parser.value()?.parse()?);
            }
            Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                let value: String = parser.value()?.parse()?;
                if !is_log_level(&value) {
                    return Err(ArgsError::InvalidValue("log-level", value));
                }
                result.log_level = Some(value);
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

fn is_log_level(value: &str) -> bool {
    matches!(value, "error" | "warn" | "info" | "debug" | "trace")
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"interaction {version}
Interactive REPL shell

USAGE:
    interaction [OPTIONS]

OPTIONS:
    -c, --command <CMD>     Execute a single command and exit
    -p, --prompt <TEXT>     Prompt to display [default: <user>@<host>> ]
        --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    INTERACTION_PROMPT           Prompt (overrides config)
    INTERACTION_EXIT_SIGNALS     Comma separated exit signals, e.g. INT,TERM
    INTERACTION_RESUME_DELAY_MS  Resume delay when SIGCONT cannot be watched
    INTERACTION_LOG_LEVEL        Log level (overrides config)
    RUST_LOG                     Alternative log level setting

KEYS:
    Ctrl-A / Ctrl-E         Move to start / end of line
    Ctrl-U                  Clear the line
    Ctrl-C / Ctrl-D         Exit
    Ctrl-Z                  Suspend

EXAMPLES:
    # Start the interactive shell
    interaction

    # Run one command
    interaction -c status

    # Custom prompt
    interaction -p "> "
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("interaction {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Invalid argument value.
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::InvalidValue(name, value) => {
                write!(f, "invalid value for --{}: '{}'", name, value)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
