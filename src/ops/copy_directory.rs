//! Recursive directory copy with exact undo.
//!
//! Every file and link the copy creates is recorded under [`FILES_KEY`],
//! newest first. Undo walks that list in stored order, so files disappear
//! before the directories holding them are pruned.
//!
//! ## Symbolic links
//!
//! Links are recreated, never followed. A link whose target lies inside the
//! source tree is re-rooted to the same offset under the target tree; a link
//! pointing anywhere else keeps its absolute target.

use crate::error::OperationError;
use crate::fs::{
    create_symlink, delete_file_now_or_later, normalize, prune_empty_ancestors, remove_entry,
    resolve_link_target, to_absolute,
};
use crate::ops::operation::{
    OpResult, Operation, PersistedState, Progress, argument_count_error, track,
};

use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted key holding the created artifacts, newest first.
pub const FILES_KEY: &str = "files";

/// Optional third argument enabling destructive overwrite.
pub const FORCE_OVERWRITE: &str = "forceOverwrite";

/// Copies a directory tree into an existing target directory.
///
/// Arguments: `<source> <target> [forceOverwrite]`.
#[derive(Debug, Default)]
pub struct CopyDirectory {
    arguments: Vec<String>,
    state: PersistedState,
    last_error: Option<OperationError>,
}

#[derive(Debug)]
struct CopyArgs {
    source: PathBuf,
    target: PathBuf,
    overwrite: bool,
}

impl CopyDirectory {
    pub const NAME: &'static str = "CopyDirectory";

    pub fn new(arguments: Vec<String>) -> Self {
        Self {
            arguments,
            ..Self::default()
        }
    }

    /// Artifacts currently recorded, newest first.
    pub fn files(&self) -> Vec<PathBuf> {
        self.state.paths(FILES_KEY)
    }

    fn parse_arguments(&self) -> OpResult<CopyArgs> {
        let args = &self.arguments;
        if !(2..=3).contains(&args.len()) {
            return Err(argument_count_error(
                Self::NAME,
                args.len(),
                "<source> <target> [forceOverwrite]",
            ));
        }

        let overwrite = match args.get(2) {
            None => false,
            Some(flag) if flag == FORCE_OVERWRITE => true,
            Some(_) => {
                return Err(OperationError::InvalidArguments(format!(
                    "Invalid argument in {}: Third argument needs to be {}, if specified",
                    Self::NAME,
                    FORCE_OVERWRITE
                )));
            }
        };

        let (source, target) = (Path::new(&args[0]), Path::new(&args[1]));
        if !source.is_dir() || !target.is_dir() {
            return Err(OperationError::InvalidArguments(format!(
                "Invalid arguments in {}: Directories are invalid: {} {}",
                Self::NAME,
                source.display(),
                target.display()
            )));
        }

        let absolute = |path: &Path| {
            to_absolute(path).map_err(|e| {
                OperationError::InvalidArguments(format!(
                    "Invalid arguments in {}: {}: {}",
                    Self::NAME,
                    path.display(),
                    e
                ))
            })
        };

        Ok(CopyArgs {
            source: absolute(source)?,
            target: absolute(target)?,
            overwrite,
        })
    }

    /// Root under which undo may prune, taken from the second argument.
    fn target_root(&self) -> Option<PathBuf> {
        self.arguments
            .get(1)
            .and_then(|target| to_absolute(Path::new(target)).ok())
    }

    fn run_perform(&mut self, progress: &mut dyn Progress) -> OpResult {
        let args = self.parse_arguments()?;

        let mut created = Vec::new();
        let result = copy_tree(&args, &mut created, progress);

        // Written on every exit path, failures included.
        created.reverse();
        self.state.set_paths(FILES_KEY, &created);
        result?;

        log::info!(
            "Copied {} into {} ({} entries)",
            args.source.display(),
            args.target.display(),
            created.len()
        );
        Ok(())
    }

    fn run_undo(&mut self, progress: &mut dyn Progress) -> OpResult {
        let files = self.files();
        let root = self.target_root();

        for (idx, file) in files.iter().enumerate() {
            if let Err(e) = remove_entry(file) {
                self.state.set_paths(FILES_KEY, &files[idx..]);
                return Err(OperationError::InvalidArguments(format!(
                    "Could not remove {}: {}",
                    file.display(),
                    e
                )));
            }
            log::debug!("Removed: {}", file.display());

            if let (Some(parent), Some(root)) = (file.parent(), root.as_deref()) {
                prune_empty_ancestors(parent, root, false);
            }
            progress.touched(file);
        }

        self.state.remove(FILES_KEY);
        if !files.is_empty() {
            log::info!("Removed {} copied entries", files.len());
        }
        Ok(())
    }
}

impl Operation for CopyDirectory {
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
        Box::new(Self::default())
    }
}

/// Walks `args.source` in pre-order and mirrors each entry under
/// `args.target`. Hidden entries are included and links are never followed.
fn copy_tree(args: &CopyArgs, created: &mut Vec<PathBuf>, progress: &mut dyn Progress) -> OpResult {
    let walker = WalkBuilder::new(&args.source)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = entry.map_err(|e| {
            OperationError::UserDefined(format!(
                "Could not read {}: {}",
                args.source.display(),
                e
            ))
        })?;
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&args.source).map_err(|_| {
            OperationError::UserDefined(format!(
                "{} is not inside {}",
                path.display(),
                args.source.display()
            ))
        })?;
        let destination = args.target.join(relative);

        // Recorded paths are stored as strings and must name the entry exactly.
        if destination.to_str().is_none() {
            return Err(OperationError::UserDefined(format!(
                "Could not copy {}: path is not valid UTF-8",
                path.display()
            )));
        }

        let Some(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_symlink() {
            copy_symlink(args, path, &destination)?;
        } else if file_type.is_dir() {
            fs::create_dir_all(&destination).map_err(|e| {
                OperationError::InvalidArguments(format!(
                    "Could not create {}: {}",
                    destination.display(),
                    e
                ))
            })?;
            continue;
        } else if file_type.is_file() {
            copy_file(args, path, &destination)?;
        } else {
            return Err(OperationError::UserDefined(format!(
                "Could not copy {}: not a regular file, directory or link",
                path.display()
            )));
        }

        log::debug!("Created: {}", destination.display());
        progress.touched(&destination);
        created.push(destination);
    }

    Ok(())
}

/// Maps a link target inside the source tree to the same offset under the
/// target tree. Targets outside the source tree are returned unchanged.
fn relocate_link_target(resolved: &Path, source: &Path, target: &Path) -> PathBuf {
    if !resolved.starts_with(source) {
        return resolved.to_path_buf();
    }
    match pathdiff::diff_paths(resolved, source) {
        Some(offset) if !offset.as_os_str().is_empty() => normalize(&target.join(offset)),
        _ => target.to_path_buf(),
    }
}

fn copy_symlink(args: &CopyArgs, link: &Path, destination: &Path) -> OpResult {
    let resolved = resolve_link_target(link).map_err(|e| {
        OperationError::UserDefined(format!("Could not read link {}: {}", link.display(), e))
    })?;
    let points_to = relocate_link_target(&resolved, &args.source, &args.target);

    clear_destination(destination, args.overwrite)?;
    create_symlink(&points_to, destination, resolved.is_dir()).map_err(|e| {
        OperationError::UserDefined(format!(
            "Could not create link {} -> {}: {}",
            destination.display(),
            points_to.display(),
            e
        ))
    })
}

fn copy_file(args: &CopyArgs, file: &Path, destination: &Path) -> OpResult {
    let copy_error = |reason: &dyn std::fmt::Display| {
        OperationError::UserDefined(format!(
            "Could not copy {} to {}, error was: {}",
            file.display(),
            destination.display(),
            reason
        ))
    };

    if !args.overwrite && fs::symlink_metadata(destination).is_ok() {
        return Err(copy_error(&"Destination file exists"));
    }
    clear_destination(destination, args.overwrite)?;

    fs::copy(file, destination).map_err(|e| copy_error(&e))?;
    Ok(())
}

/// With `overwrite`, deletes whatever occupies `destination` (now, or later
/// if it is locked).
fn clear_destination(destination: &Path, overwrite: bool) -> OpResult {
    if !overwrite || fs::symlink_metadata(destination).is_err() {
        return Ok(());
    }
    delete_file_now_or_later(destination)
        .map(|_| ())
        .map_err(|e| {
            OperationError::UserDefined(format!(
                "Failed to overwrite {}: {}",
                destination.display(),
                e
            ))
        })
}
