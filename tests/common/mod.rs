//! Shared helpers for the installer-ops integration tests.
//!
//! These build small source trees on disk and capture directory snapshots so
//! tests can assert that undo restores the exact pre-perform state.

use assert_cmd::cargo::cargo_bin_cmd;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Temp dir with an empty `source/` and `target/`.
#[allow(unused)]
pub fn create_copy_fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("source")).unwrap();
    fs::create_dir(temp.path().join("target")).unwrap();
    temp
}

/// Writes `files` (relative path, content) under `root`, creating parents.
#[allow(unused)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

/// Every entry under `root` as a forward-slash relative path. Links are
/// listed but not followed.
#[allow(unused)]
pub fn snapshot(root: &Path) -> BTreeSet<String> {
    let mut entries = BTreeSet::new();
    collect(root, root, &mut entries);
    entries
}

fn collect(root: &Path, dir: &Path, entries: &mut BTreeSet<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap()
            .to_string_lossy()
            .replace('\\', "/");
        entries.insert(relative);
        if entry.file_type().unwrap().is_dir() {
            collect(root, &path, entries);
        }
    }
}

/// Strings from string slices.
#[allow(unused)]
pub fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

/// Path as an owned argument string.
#[allow(unused)]
pub fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Runs `installer-ops <args>` inside `dir`.
#[allow(unused)]
pub fn run_installer_ops(dir: &Path, args: &[&str]) -> std::process::Output {
    let mut cmd = cargo_bin_cmd!("installer-ops");
    cmd.args(args).current_dir(dir).env("NO_COLOR", "1");
    cmd.output().unwrap()
}
