//! Native shortcut creation.
//!
//! Windows gets a `.lnk` Shell Link carrying the working directory and
//! invocation arguments. Elsewhere a shortcut is a plain symbolic link and the
//! metadata has nowhere to go.

use std::io;
use std::path::Path;

/// Describes a shortcut to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutSpec<'a> {
    pub target: &'a Path,
    pub location: &'a Path,
    pub working_directory: Option<&'a Path>,
    pub arguments: Option<&'a str>,
}

/// Returns `true` if shortcuts on this platform store a working directory
/// and arguments.
pub fn supports_shortcut_metadata() -> bool {
    cfg!(windows)
}

/// Creates the shortcut described by `spec`.
///
/// `spec.location` must not exist.
pub fn create_shortcut(spec: &ShortcutSpec<'_>) -> io::Result<()> {
    #[cfg(windows)]
    {
        use super::lnk::{ShellLink, encode_shell_link};
        use std::io::Write;

        let target = super::to_absolute(spec.target)?;
        let bytes = encode_shell_link(&ShellLink {
            target,
            working_directory: spec.working_directory.map(Path::to_path_buf),
            arguments: spec.arguments.map(str::to_string),
        })?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(spec.location)?;
        if let Err(e) = file.write_all(&bytes).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = std::fs::remove_file(spec.location);
            return Err(e);
        }
        Ok(())
    }

    #[cfg(not(windows))]
    {
        if spec.working_directory.is_some() || spec.arguments.is_some() {
            log::debug!(
                "Shortcut metadata is not supported on this platform, ignoring it for {}",
                spec.location.display()
            );
        }
        super::create_symlink(spec.target, spec.location, spec.target.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_create_shortcut_refuses_existing_location() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app");
        let location = temp.path().join("App.lnk");
        fs::write(&target, "").unwrap();
        fs::write(&location, "occupied").unwrap();

        let spec = ShortcutSpec {
            target: &target,
            location: &location,
            working_directory: None,
            arguments: None,
        };

        assert!(create_shortcut(&spec).is_err());
        assert_eq!(fs::read_to_string(&location).unwrap(), "occupied");
    }

    #[cfg(unix)]
    #[test]
    fn test_shortcut_is_symlink_on_unix() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app");
        let location = temp.path().join("App.lnk");
        fs::write(&target, "").unwrap();

        let spec = ShortcutSpec {
            target: &target,
            location: &location,
            working_directory: Some(Path::new("/tmp")),
            arguments: Some("--fullscreen"),
        };
        create_shortcut(&spec).unwrap();

        assert!(!supports_shortcut_metadata());
        assert_eq!(fs::read_link(&location).unwrap(), target);
    }

    #[cfg(windows)]
    #[test]
    fn test_shortcut_is_shell_link_on_windows() {
        use crate::fs::decode_shell_link;

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("app.exe");
        let location = temp.path().join("App.lnk");
        fs::write(&target, "").unwrap();

        let spec = ShortcutSpec {
            target: &target,
            location: &location,
            working_directory: Some(Path::new("C:\\Temp")),
            arguments: Some("--fullscreen"),
        };
        create_shortcut(&spec).unwrap();

        let decoded = decode_shell_link(&fs::read(&location).unwrap()).unwrap();
        assert_eq!(decoded.working_directory.as_deref(), Some("C:\\Temp"));
        assert_eq!(decoded.arguments.as_deref(), Some("--fullscreen"));
    }
}
