#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod fs;
pub mod journal;
pub mod ops;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;
    use command::Command;

    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Perform(args) => command::perform::execute(args),
        Command::Undo(args) => command::undo::execute(args),
        Command::Test(args) => command::test::execute(args),
        Command::List => {
            command::list();
            Ok(())
        }
    }
}

/// `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}
