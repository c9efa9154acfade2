//! Directory creation and pruning.
//!
//! Undo never removes a directory that still has content. Pruning walks
//! upward one level at a time and stops at the first directory that cannot
//! be removed.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Files dropped into directories by desktop shells.
const SYSTEM_GENERATED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Returns `true` if `name` is a file a desktop shell creates on its own.
pub fn is_system_generated_file(name: &OsStr) -> bool {
    SYSTEM_GENERATED_FILES.iter().any(|known| name == *known)
}

/// Deletes shell clutter from `dir` when it is the only thing left in it.
///
/// Directories holding anything else are left untouched. Returns the number
/// of files removed.
pub fn remove_system_generated_files(dir: &Path) -> io::Result<usize> {
    let mut clutter = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() || !is_system_generated_file(&entry.file_name()) {
            return Ok(0);
        }
        clutter.push(entry.path());
    }

    for path in &clutter {
        fs::remove_file(path)?;
        log::debug!("Removed system file: {}", path.display());
    }
    Ok(clutter.len())
}

/// Removes `dir` if it is empty.
pub fn remove_dir_if_empty(dir: &Path) -> bool {
    match fs::remove_dir(dir) {
        Ok(()) => {
            log::debug!("Deleted directory: {}", dir.display());
            true
        }
        Err(_) => false,
    }
}

/// Removes `start` and its ancestors while they are empty, stopping before
/// `boundary`.
///
/// Nothing happens unless `start` lies strictly below `boundary`. With
/// `strip_clutter`, shell clutter is cleared from each level first. Returns
/// the directories removed, deepest first.
pub fn prune_empty_ancestors(start: &Path, boundary: &Path, strip_clutter: bool) -> Vec<PathBuf> {
    let mut removed = Vec::new();
    let mut current = Some(start);

    while let Some(dir) = current {
        if dir == boundary || !dir.starts_with(boundary) {
            break;
        }
        if strip_clutter {
            if let Err(e) = remove_system_generated_files(dir) {
                log::debug!("Could not clear {}: {}", dir.display(), e);
            }
        }
        if !remove_dir_if_empty(dir) {
            break;
        }
        removed.push(dir.to_path_buf());
        current = dir.parent();
    }

    removed
}

/// Like [`fs::create_dir_all`], but reports which directories it created,
/// deepest first.
pub fn create_dir_all_tracked(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut missing = Vec::new();
    let mut current = Some(dir);
    while let Some(path) = current {
        if path.as_os_str().is_empty() || path.is_dir() {
            break;
        }
        missing.push(path.to_path_buf());
        current = path.parent();
    }

    let mut created = Vec::new();
    for path in missing.iter().rev() {
        match fs::create_dir(path) {
            Ok(()) => created.push(path.clone()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => {}
            Err(e) => return Err(e),
        }
    }

    created.reverse();
    Ok(created)
}
