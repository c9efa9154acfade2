//! Symbolic link creation and lexical path helpers.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Creates a symbolic link at `link` pointing to `original`.
///
/// `points_to_dir` selects a directory link on Windows, where the target may
/// not exist yet. Other platforms ignore it.
pub fn create_symlink(original: &Path, link: &Path, points_to_dir: bool) -> io::Result<()> {
    #[cfg(unix)]
    {
        let _ = points_to_dir;
        std::os::unix::fs::symlink(original, link)
    }

    #[cfg(windows)]
    {
        if points_to_dir {
            std::os::windows::fs::symlink_dir(original, link)
        } else {
            std::os::windows::fs::symlink_file(original, link)
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = (original, link, points_to_dir);
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symbolic links are not supported on this platform",
        ))
    }
}

/// Reads the link at `link` and returns its target as an absolute,
/// lexically normalised path.
///
/// Relative targets resolve against the directory containing the link. Only
/// the link itself is read; the target does not need to exist.
pub fn resolve_link_target(link: &Path) -> io::Result<PathBuf> {
    let raw = fs::read_link(link)?;
    let absolute = if raw.is_absolute() {
        raw
    } else {
        link.parent().unwrap_or_else(|| Path::new("")).join(raw)
    };
    Ok(normalize(&absolute))
}

/// Makes `path` absolute against the current directory and normalises it.
pub fn to_absolute(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize(&std::path::absolute(path)?))
}

/// Removes `.` components and folds `..` into its parent without touching
/// the file system. `..` never climbs above the root.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component.as_os_str()),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_parent_components() {
        assert_eq!(
            normalize(Path::new("/opt/app/./lib/../bin/tool")),
            PathBuf::from("/opt/app/bin/tool")
        );
    }

    #[test]
    fn test_normalize_stops_at_root() {
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
    }

    #[test]
    fn test_normalize_keeps_leading_parent_of_relative_path() {
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_relative_link_target() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join("a");
        fs::create_dir(&dir).unwrap();
        let link = dir.join("link");
        std::os::unix::fs::symlink("../b/target", &link).unwrap();

        assert_eq!(
            resolve_link_target(&link).unwrap(),
            temp.path().join("b").join("target")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_create_symlink_dangling_target() {
        let temp = tempfile::TempDir::new().unwrap();
        let link = temp.path().join("dangling");

        create_symlink(Path::new("/nonexistent/target"), &link, false).unwrap();

        assert_eq!(
            fs::read_link(&link).unwrap(),
            PathBuf::from("/nonexistent/target")
        );
    }
}
