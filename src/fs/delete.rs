//! Deletion of files and links, with a deferred fallback for locked files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of [`delete_file_now_or_later`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deletion {
    /// The entry is gone.
    Removed,
    /// The entry was moved aside to the contained path and queued for removal
    /// by the platform. The original path is free.
    Deferred(PathBuf),
}

/// Removes a file or a symbolic link without following it.
///
/// Directory links on Windows need `remove_dir` semantics, so that is tried
/// when `remove_file` refuses.
pub fn remove_entry(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(remove_file_err) => match fs::symlink_metadata(path) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    fs::remove_dir(path).map_err(|_| remove_file_err)
                }
                _ => Err(remove_file_err),
            },
        }
    }

    #[cfg(not(windows))]
    {
        fs::remove_file(path)
    }
}

/// Deletes `path` immediately, or schedules it for removal when the file is
/// held open by another process.
///
/// A deferred deletion counts as success. The entry may stay visible under a
/// different name until the platform gets around to removing it.
pub fn delete_file_now_or_later(path: &Path) -> io::Result<Deletion> {
    match remove_entry(path) {
        Ok(()) => {
            log::debug!("Deleted: {}", path.display());
            Ok(Deletion::Removed)
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(err),
        Err(err) => schedule_removal(path, err),
    }
}

#[cfg(windows)]
fn schedule_removal(path: &Path, err: io::Error) -> io::Result<Deletion> {
    let Some(file_name) = path.file_name() else {
        return Err(err);
    };

    // Move the locked file out of the way so the original path can be reused.
    let mut aside = None;
    for attempt in 0..100u32 {
        let mut name = file_name.to_os_string();
        name.push(format!(".{}-{attempt}.pending-delete", std::process::id()));
        let candidate = path.with_file_name(name);
        if candidate.exists() {
            continue;
        }
        if fs::rename(path, &candidate).is_ok() {
            aside = Some(candidate);
        }
        break;
    }
    let Some(aside) = aside else {
        return Err(err);
    };

    if let Err(e) = delay_until_reboot(&aside) {
        log::warn!(
            "Could not schedule {} for removal: {}",
            aside.display(),
            e
        );
    } else {
        log::warn!(
            "{} is in use, scheduled {} for removal",
            path.display(),
            aside.display()
        );
    }
    Ok(Deletion::Deferred(aside))
}

#[cfg(windows)]
#[allow(unsafe_code)]
fn delay_until_reboot(path: &Path) -> io::Result<()> {
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Storage::FileSystem::{MOVEFILE_DELAY_UNTIL_REBOOT, MoveFileExW};

    let mut wide: Vec<u16> = path.as_os_str().encode_wide().collect();
    wide.push(0);

    // SAFETY: `wide` is an owned, NUL-terminated UTF-16 buffer that outlives
    // the synchronous call. A null destination requests deletion.
    let queued = unsafe {
        MoveFileExW(
            wide.as_ptr(),
            std::ptr::null(),
            MOVEFILE_DELAY_UNTIL_REBOOT,
        )
    };
    if queued == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

// Unlinking an open file always works on Unix, so there is nothing to defer.
#[cfg(not(windows))]
fn schedule_removal(_path: &Path, err: io::Error) -> io::Result<Deletion> {
    Err(err)
}
