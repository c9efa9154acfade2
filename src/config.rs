//! Configuration shared by the operations a registry creates.

use std::path::PathBuf;

/// Which directories `CreateShortcut` undo may remove after deleting the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PrunePolicy {
    /// Climb from the link's directory toward the user's home directory,
    /// removing every level that is empty. Home itself is never removed.
    #[default]
    HomeBoundary,
    /// Same climb, bounded by an explicit directory instead of home.
    Boundary(PathBuf),
    /// Remove only the directories `perform` created for the link.
    CreatedByOperation,
    /// Leave directories alone.
    Disabled,
}

impl PrunePolicy {
    /// Resolves the directory the upward climb must stop at, if this policy
    /// climbs at all.
    pub fn boundary(&self) -> Option<PathBuf> {
        match self {
            Self::HomeBoundary => dirs::home_dir(),
            Self::Boundary(dir) => Some(dir.clone()),
            Self::CreatedByOperation | Self::Disabled => None,
        }
    }
}

/// Settings applied to every operation created through an
/// [`OperationRegistry`](crate::ops::OperationRegistry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationConfig {
    pub prune: PrunePolicy,
}

impl OperationConfig {
    pub fn with_prune(mut self, prune: PrunePolicy) -> Self {
        self.prune = prune;
        self
    }
}
