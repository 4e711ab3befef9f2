//! Demo shell: prints every command upper-cased.

use interaction::cli::{self, print_help, print_version};
use interaction::config::Config;
use interaction::{logging, Interactive, InteractionError};
use tracing::debug;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        if matches!(e, InteractionError::Args(_)) {
            eprintln!("Run 'interaction --help' for usage.");
        }
        std::process::exit(1);
    }
}

fn run() -> interaction::Result<()> {
    let args = cli::parse_args()?;

    if args.help {
        print_help();
        return Ok(());
    }

    if args.version {
        print_version();
        return Ok(());
    }

    let config = Config::load(&args)?;

    logging::try_init_with(config.log_filter()).ok();
    debug!("interaction v{}", env!("CARGO_PKG_VERSION"));

    Interactive::from_config(&config)?
        .with_execute(|command| {
            println!("{}", command.to_uppercase());
            Ok(())
        })
        .start_with_command(args.one_shot())
}
