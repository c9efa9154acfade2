mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{arg, create_copy_fixture, run_installer_ops, snapshot, write_tree};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_list_shows_builtin_operations() {
    cargo_bin_cmd!("installer-ops")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("CopyDirectory"))
        .stdout(predicate::str::contains("CreateShortcut"));
}

#[test]
fn test_unknown_operation_fails() {
    let temp = create_copy_fixture();
    cargo_bin_cmd!("installer-ops")
        .args(["perform", "ExtractArchive", "a", "b"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown operation 'ExtractArchive'"));
}

#[test]
fn test_perform_then_undo_via_log() {
    let temp = create_copy_fixture();
    let source = temp.path().join("source");
    let target = temp.path().join("target");
    write_tree(&source, &[("bin/tool", "x"), ("share/doc.txt", "d")]);
    let log = temp.path().join("state/ops.json");

    let output = run_installer_ops(
        temp.path(),
        &[
            "perform",
            "CopyDirectory",
            &arg(&source),
            &arg(&target),
            "--log",
            &arg(&log),
        ],
    );
    assert!(output.status.success(), "{:?}", output);
    assert!(target.join("bin/tool").exists());

    let logged = fs::read_to_string(&log).unwrap();
    assert!(logged.contains("\"CopyDirectory\""));
    assert!(logged.contains("\"files\""));

    let output = run_installer_ops(temp.path(), &["undo", "--log", &arg(&log)]);
    assert!(output.status.success(), "{:?}", output);
    assert!(snapshot(&target).is_empty());

    let remaining: serde_json::Value = serde_json::from_str(&fs::read_to_string(&log).unwrap())
        .unwrap();
    assert_eq!(remaining, serde_json::json!([]));
}

#[test]
fn test_failed_perform_logs_partial_state() {
    let temp = create_copy_fixture();
    let source = temp.path().join("source");
    let target = temp.path().join("target");
    write_tree(&source, &[("a.txt", "new"), ("b.txt", "new")]);
    write_tree(&target, &[("b.txt", "old")]);
    let log = temp.path().join("ops.json");

    cargo_bin_cmd!("installer-ops")
        .args(["perform", "CopyDirectory", &arg(&source), &arg(&target)])
        .args(["--log", &arg(&log)])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Destination file exists"));

    assert!(target.join("a.txt").exists());

    cargo_bin_cmd!("installer-ops")
        .args(["undo", "--log", &arg(&log)])
        .current_dir(temp.path())
        .assert()
        .success();

    assert!(!target.join("a.txt").exists());
    assert_eq!(fs::read_to_string(target.join("b.txt")).unwrap(), "old");
}

#[test]
fn test_undo_with_missing_log_is_noop() {
    let temp = create_copy_fixture();
    cargo_bin_cmd!("installer-ops")
        .args(["undo", "--log", "nothing-here.json"])
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to undo"));
}

#[test]
fn test_undo_count_limits_operations() {
    let temp = create_copy_fixture();
    let source = temp.path().join("source");
    let target = temp.path().join("target");
    let second = temp.path().join("second");
    fs::create_dir(&second).unwrap();
    write_tree(&source, &[("a.txt", "a")]);
    let log = temp.path().join("ops.json");

    for dest in [&target, &second] {
        cargo_bin_cmd!("installer-ops")
            .args(["perform", "CopyDirectory", &arg(&source), &arg(dest)])
            .args(["--log", &arg(&log)])
            .current_dir(temp.path())
            .assert()
            .success();
    }

    cargo_bin_cmd!("installer-ops")
        .args(["undo", "--log", &arg(&log), "-n", "1"])
        .current_dir(temp.path())
        .assert()
        .success();

    assert!(target.join("a.txt").exists());
    assert!(!second.join("a.txt").exists());
}

#[test]
fn test_check_reports_pass() {
    let temp = create_copy_fixture();
    cargo_bin_cmd!("installer-ops")
        .args(["test", "CreateShortcut", "target", "location"])
        .current_dir(temp.path())
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Passed"));
}

#[cfg(unix)]
#[test]
fn test_shortcut_perform_and_undo_with_boundary() {
    let temp = create_copy_fixture();
    let target = temp.path().join("source/app");
    fs::write(&target, "bin").unwrap();
    let location = temp.path().join("Desktop/App");
    let log = temp.path().join("ops.json");

    cargo_bin_cmd!("installer-ops")
        .args(["perform", "CreateShortcut", &arg(&target), &arg(&location)])
        .args(["--log", &arg(&log)])
        .current_dir(temp.path())
        .assert()
        .success();
    assert_eq!(fs::read_link(&location).unwrap(), target);

    cargo_bin_cmd!("installer-ops")
        .args(["undo", "--log", &arg(&log)])
        .args(["--prune-boundary", &arg(temp.path())])
        .current_dir(temp.path())
        .assert()
        .success();

    assert!(!temp.path().join("Desktop").exists());
    assert!(temp.path().join("source").exists());
}
