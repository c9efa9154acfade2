use crate::command::{PruneArgs, display_path};
use crate::error::Result;
use crate::journal::Journal;
use crate::ops::OperationRecord;

use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Arguments for the `perform` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct PerformArgs {
    /// Operation name, e.g. CopyDirectory or CreateShortcut
    pub name: String,

    /// Arguments passed to the operation, in order (use `--` before
    /// arguments starting with a hyphen)
    pub arguments: Vec<String>,

    /// Operation log to append the performed operation to
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    #[command(flatten)]
    pub prune: PruneArgs,
}

pub fn execute(args: PerformArgs) -> Result<()> {
    let registry = args.prune.registry();
    let mut op = registry.create(&args.name, args.arguments.clone())?;

    let cwd = std::env::current_dir()?;
    let mut report = |path: &Path| {
        println!("{:>12} {}", "Created".green().bold(), display_path(path, &cwd));
    };

    op.backup();
    let result = op.perform(&mut report);

    // A failed perform may still have created files; log them so undo can clean up.
    if let Some(log_path) = &args.log
        && (result.is_ok() || !op.state().is_blank())
    {
        let mut journal = Journal::load(log_path)?;
        journal.push(OperationRecord::from_operation(op.as_ref()));
        journal.save()?;
        log::debug!("Logged {} to {}", op.name(), journal.path().display());
    }

    if let Err(e) = result {
        if args.log.is_some() && !op.state().is_blank() {
            eprintln!(
                "{}",
                "Partial changes were logged; run `undo` to remove them.".yellow()
            );
        }
        return Err(e.into());
    }

    println!("{:>12} {}", "Finished".green().bold(), op.name());
    Ok(())
}
