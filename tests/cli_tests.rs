#![cfg(unix)]

//! Binary-level checks for the `atomic_replace` CLI.

use assert_fs::prelude::*;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::process::{Command, Stdio};

fn bin() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("atomic_replace"));
    cmd.env_remove("ATOMIC_REPLACE_LOG");
    cmd
}

#[test]
fn write_from_stdin_replaces_destination() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dest = temp.child("metrics.txt");
    dest.write_str("stale\n").unwrap();

    let mut child = bin()
        .args(["write", "--static-mode", "0644"])
        .arg(dest.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn binary");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"temperature_degc 31.2\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    dest.assert("temperature_degc 31.2\n");
    assert_eq!(fs::metadata(dest.path()).unwrap().permissions().mode() & 0o777, 0o644);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn write_from_input_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("in.txt");
    input.write_str("from file").unwrap();
    let dest = temp.child("out.txt");

    let out = bin()
        .args(["write", "--no-sync", "--sync-dir", "--input"])
        .arg(input.path())
        .arg(dest.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    dest.assert("from file");
}

#[test]
fn write_into_missing_directory_fails_with_error_line() {
    let temp = assert_fs::TempDir::new().unwrap();
    let out = bin()
        .args(["write", "--input", "/dev/null"])
        .arg(temp.child("no/such/dir/f").path())
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(11));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
}

#[test]
fn bad_mode_is_rejected_by_parser() {
    let out = bin().args(["write", "--mode", "999", "/tmp/never"]).output().unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("octal"));
}

#[test]
fn temp_dir_prints_one_row_per_destination() {
    let temp = assert_fs::TempDir::new().unwrap();
    let a = temp.child("a.txt");
    let b = temp.child("b.txt");

    let out = bin()
        .arg("temp-dir")
        .arg(a.path())
        .arg(b.path())
        .env("TMPDIR", "/nonexistant")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let rows: Vec<_> = stdout.lines().collect();
    assert_eq!(rows.len(), 2, "stdout: {stdout}");
    let expected = format!("{}\t{}\t{}", a.path().display(), temp.path().display(), temp.path().display());
    assert_eq!(rows[0], expected);
}

#[test]
fn symlink_subcommand_points_link_at_target() {
    let temp = assert_fs::TempDir::new().unwrap();
    let link = temp.child("current");

    let out = bin().arg("symlink").arg("release-7").arg(link.path()).output().unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read_link(link.path()).unwrap(), std::path::PathBuf::from("release-7"));
}

#[test]
fn log_file_receives_debug_events() {
    let temp = assert_fs::TempDir::new().unwrap();
    let log = temp.child("logs/run.log");
    let dest = temp.child("d");

    let out = bin()
        .args(["--debug", "--log-file"])
        .arg(log.path())
        .args(["write", "--input", "/dev/null"])
        .arg(dest.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let text = fs::read_to_string(log.path()).unwrap();
    assert!(text.contains("committed"), "log: {text}");
    assert_eq!(fs::metadata(log.path()).unwrap().permissions().mode() & 0o777, 0o600);
}

#[test]
fn log_file_behind_symlinked_dir_is_refused() {
    let temp = assert_fs::TempDir::new().unwrap();
    let real = temp.child("real");
    real.create_dir_all().unwrap();
    let via = temp.child("via");
    std::os::unix::fs::symlink(real.path(), via.path()).unwrap();

    let out = bin()
        .arg("--log-file")
        .arg(via.child("run.log").path())
        .arg("symlink")
        .arg("t")
        .arg(temp.child("l").path())
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(!real.child("run.log").path().exists());
    assert!(String::from_utf8_lossy(&out.stderr).contains("symlink"));
}
