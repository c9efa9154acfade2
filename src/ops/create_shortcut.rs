//! Shortcut creation.
//!
//! Arguments: `<linkTarget> <linkLocation> [invocationArguments]`, plus an
//! optional `workingDirectory=<path>` token anywhere in the list.
//!
//! Undo is lenient: a link that cannot be deleted is logged and the undo
//! still succeeds. Which directories are pruned afterwards is decided by the
//! configured [`PrunePolicy`].

use crate::config::PrunePolicy;
use crate::error::OperationError;
use crate::fs::{
    ShortcutSpec, create_dir_all_tracked, create_shortcut, delete_file_now_or_later,
    prune_empty_ancestors, remove_dir_if_empty, remove_system_generated_files, to_absolute,
};
use crate::ops::operation::{
    OpResult, Operation, PersistedState, Progress, argument_count_error, track,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix of the optional working directory argument.
pub const WORKING_DIRECTORY_PREFIX: &str = "workingDirectory=";

/// Persisted key holding the directories `perform` created, deepest first.
pub const CREATED_DIRECTORIES_KEY: &str = "createdDirectories";

/// Creates a link or shortcut at a location pointing to a target.
#[derive(Debug, Default)]
pub struct CreateShortcut {
    arguments: Vec<String>,
    state: PersistedState,
    last_error: Option<OperationError>,
    prune: PrunePolicy,
}

#[derive(Debug, PartialEq, Eq)]
struct ShortcutArgs {
    target: PathBuf,
    location: PathBuf,
    working_directory: Option<PathBuf>,
    invocation_arguments: Option<String>,
}

/// Removes the first `workingDirectory=` token from `args` and returns its
/// value.
fn take_working_directory(args: &mut Vec<String>) -> Option<String> {
    let idx = args
        .iter()
        .position(|arg| arg.starts_with(WORKING_DIRECTORY_PREFIX))?;
    let token = args.remove(idx);
    token
        .strip_prefix(WORKING_DIRECTORY_PREFIX)
        .map(str::to_string)
}

fn parse_arguments(arguments: &[String]) -> OpResult<ShortcutArgs> {
    let mut args = arguments.to_vec();
    let working_directory = take_working_directory(&mut args)
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from);

    if !(2..=3).contains(&args.len()) {
        return Err(argument_count_error(
            CreateShortcut::NAME,
            args.len(),
            "<linkTarget> <linkLocation> [arguments] (optional: \"workingDirectory=...\")",
        ));
    }

    let mut args = args.into_iter();
    let target = args.next().map(PathBuf::from).unwrap_or_default();
    let location = args.next().map(PathBuf::from).unwrap_or_default();
    let invocation_arguments = args.next();

    Ok(ShortcutArgs {
        target,
        location,
        working_directory,
        invocation_arguments,
    })
}

impl CreateShortcut {
    pub const NAME: &'static str = "CreateShortcut";

    pub fn new(arguments: Vec<String>) -> Self {
        Self {
            arguments,
            ..Self::default()
        }
    }

    pub fn with_prune_policy(mut self, prune: PrunePolicy) -> Self {
        self.prune = prune;
        self
    }

    pub fn prune_policy(&self) -> &PrunePolicy {
        &self.prune
    }

    fn link_location(args: &ShortcutArgs) -> OpResult<PathBuf> {
        to_absolute(&args.location).map_err(|e| {
            OperationError::InvalidArguments(format!(
                "Invalid link location {}: {}",
                args.location.display(),
                e
            ))
        })
    }

    fn run_perform(&mut self, progress: &mut dyn Progress) -> OpResult {
        let args = parse_arguments(&self.arguments)?;
        let location = Self::link_location(&args)?;
        let parent = location.parent().ok_or_else(|| {
            OperationError::InvalidArguments(format!(
                "Invalid link location {}: no parent directory",
                location.display()
            ))
        })?;

        let created = create_dir_all_tracked(parent).map_err(|e| {
            OperationError::UserDefined(format!(
                "Could not create folder {}: {}",
                parent.display(),
                e
            ))
        })?;
        for dir in created.iter().rev() {
            log::debug!("Created directory: {}", dir.display());
        }
        self.state.set_paths(CREATED_DIRECTORIES_KEY, &created);

        // Replace a link left behind by an earlier install.
        if fs::symlink_metadata(&location).is_ok() {
            delete_file_now_or_later(&location).map_err(|e| {
                OperationError::UserDefined(format!(
                    "Failed to overwrite {}: {}",
                    location.display(),
                    e
                ))
            })?;
        }

        let spec = ShortcutSpec {
            target: &args.target,
            location: &location,
            working_directory: args.working_directory.as_deref(),
            arguments: args.invocation_arguments.as_deref(),
        };
        create_shortcut(&spec).map_err(|e| {
            OperationError::UserDefined(format!(
                "Could not create link {}: {}",
                location.display(),
                e
            ))
        })?;

        log::info!(
            "Created link {} -> {}",
            location.display(),
            args.target.display()
        );
        progress.touched(&location);
        Ok(())
    }

    fn run_undo(&mut self, progress: &mut dyn Progress) -> OpResult {
        let args = parse_arguments(&self.arguments)?;
        let location = Self::link_location(&args)?;

        match delete_file_now_or_later(&location) {
            Ok(_) => progress.touched(&location),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Link already gone: {}", location.display());
            }
            Err(e) => log::warn!("Can't delete {}: {}", location.display(), e),
        }

        if let Some(parent) = location.parent() {
            self.prune_directories(parent);
        }

        self.state.clear();
        Ok(())
    }

    fn prune_directories(&self, link_dir: &Path) {
        match &self.prune {
            PrunePolicy::Disabled => {}
            PrunePolicy::CreatedByOperation => {
                for dir in self.state.paths(CREATED_DIRECTORIES_KEY) {
                    if let Err(e) = remove_system_generated_files(&dir) {
                        log::debug!("Could not clear {}: {}", dir.display(), e);
                    }
                    if !remove_dir_if_empty(&dir) {
                        break;
                    }
                }
            }
            policy @ (PrunePolicy::HomeBoundary | PrunePolicy::Boundary(_)) => {
                let Some(boundary) = policy.boundary() else {
                    log::debug!("No home directory, skipping directory cleanup");
                    return;
                };
                let boundary = to_absolute(&boundary).unwrap_or(boundary);
                if !link_dir.starts_with(&boundary) {
                    log::debug!(
                        "{} is outside {}, skipping directory cleanup",
                        link_dir.display(),
                        boundary.display()
                    );
                    return;
                }
                prune_empty_ancestors(link_dir, &boundary, true);
            }
        }
    }
}

impl Operation for CreateShortcut {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn arguments(&self) -> &[String] {
        &self.arguments
    }

    fn state(&self) -> &PersistedState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PersistedState {
        &mut self.state
    }

    fn last_error(&self) -> Option<&OperationError> {
        self.last_error.as_ref()
    }

    fn perform(&mut self, progress: &mut dyn Progress) -> OpResult {
        let result = self.run_perform(progress);
        track(&mut self.last_error, result)
    }

    fn undo(&mut self, progress: &mut dyn Progress) -> OpResult {
        let result = self.run_undo(progress);
        track(&mut self.last_error, result)
    }

    fn clone_fresh(&self) -> Box<dyn Operation> {
        Box::new(Self::default().with_prune_policy(self.prune.clone()))
    }
}
