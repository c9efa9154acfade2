use crate::command::Command;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "installer-ops",
    version,
    about = "Perform and undo reversible installer file system operations"
)]
pub struct Cli {
    /// Print debug output for every file touched
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}
