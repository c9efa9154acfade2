pub mod perform;
pub mod undo;

use crate::config::{OperationConfig, PrunePolicy};
use crate::ops::OperationRegistry;

use clap::{Args, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Perform an operation and append it to the operation log
    Perform(perform::PerformArgs),
    /// Undo logged operations, newest first
    Undo(undo::UndoArgs),
    /// Run an operation's side-effect-free check
    Test(test::TestArgs),
    /// List the available operations
    List,
}

/// Directory cleanup after a shortcut is removed.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PruneMode {
    /// Remove empty directories up to the home directory (or --prune-boundary)
    #[default]
    Home,
    /// Remove only directories the operation created
    Created,
    /// Keep all directories
    None,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PruneArgs {
    /// How shortcut undo cleans up directories
    #[arg(long, value_enum, default_value_t = PruneMode::Home)]
    pub prune: PruneMode,

    /// Stop directory cleanup at this directory instead of the home directory
    #[arg(long, value_name = "DIR")]
    pub prune_boundary: Option<PathBuf>,
}

impl PruneArgs {
    pub fn to_config(&self) -> OperationConfig {
        let prune = match (self.prune, &self.prune_boundary) {
            (PruneMode::Home, Some(dir)) => PrunePolicy::Boundary(dir.clone()),
            (PruneMode::Home, None) => PrunePolicy::HomeBoundary,
            (PruneMode::Created, _) => PrunePolicy::CreatedByOperation,
            (PruneMode::None, _) => PrunePolicy::Disabled,
        };
        OperationConfig::default().with_prune(prune)
    }

    pub fn registry(&self) -> OperationRegistry {
        OperationRegistry::with_config(self.to_config())
    }
}

/// Formats `path` relative to `base` with forward slashes when possible.
pub(crate) fn display_path(path: &Path, base: &Path) -> String {
    let relative = pathdiff::diff_paths(path, base)
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf());
    relative.to_string_lossy().replace('\\', "/")
}

pub fn list() {
    let registry = OperationRegistry::new();
    for name in registry.names() {
        println!("{}", name);
    }
}
