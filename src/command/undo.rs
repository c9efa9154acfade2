use crate::command::{PruneArgs, display_path};
use crate::error::Result;
use crate::journal::Journal;
use crate::ops::OperationRecord;

use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Arguments for the `undo` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UndoArgs {
    /// Operation log written by `perform`
    #[arg(long, value_name = "FILE")]
    pub log: PathBuf,

    /// Undo at most this many operations
    #[arg(long, short = 'n', value_name = "COUNT")]
    pub count: Option<usize>,

    #[command(flatten)]
    pub prune: PruneArgs,
}

/// Undoes logged operations newest first.
///
/// Stops at the first failure. The log keeps every record not yet undone,
/// including the one that failed.
pub fn execute(args: UndoArgs) -> Result<()> {
    let registry = args.prune.registry();
    let mut journal = Journal::load(&args.log)?;

    if journal.is_empty() {
        println!("{}", "Nothing to undo".yellow());
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let mut report = |path: &Path| {
        println!("{:>12} {}", "Removed".green().bold(), display_path(path, &cwd));
    };

    let limit = args.count.unwrap_or(usize::MAX);
    let mut undone = 0;

    while undone < limit {
        let Some(record) = journal.last() else {
            break;
        };
        let mut op = match registry.restore(record) {
            Ok(op) => op,
            Err(e) => {
                journal.save()?;
                return Err(e);
            }
        };

        if let Err(e) = op.undo(&mut report) {
            // Keep whatever the failed undo did not get to.
            if let Some(last) = journal.pop() {
                journal.push(OperationRecord {
                    values: op.state().clone(),
                    ..last
                });
            }
            journal.save()?;
            return Err(e.into());
        }

        journal.pop();
        undone += 1;
        println!("{:>12} {}", "Undone".green().bold(), op.name());
    }

    journal.save()?;
    println!(
        "{} Undid {} operation{}",
        "✓".green().bold(),
        undone,
        if undone == 1 { "" } else { "s" }
    );
    Ok(())
}
