#![cfg(unix)]

//! Final file modes for each way of asking for permissions.

use atomic_replace::{Environment, ModeSource, Options, PendingReplacement, write_file};
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::tempdir;

fn mode_of(p: &Path) -> u32 {
    fs::metadata(p).unwrap().permissions().mode() & 0o7777
}

fn commit(dest: &Path, opts: &Options) -> u32 {
    let env = Environment::from_process().with_preferred_temp_dir(None);
    let mut pf = PendingReplacement::with_env(dest, opts, &env).unwrap();
    let expected = pf.mode_plan().effective_mode;
    pf.write_all(b"payload").unwrap();
    pf.commit().unwrap();
    expected
}

#[test]
fn default_mode_is_0600_masked() {
    let td = tempdir().unwrap();
    let dest = td.path().join("default");
    let umask = Environment::from_process().umask;
    let expected = commit(&dest, &Options::new());
    assert_eq!(expected, 0o600 & !umask);
    assert_eq!(mode_of(&dest), expected);
}

#[test]
fn requested_mode_is_masked_by_umask() {
    let td = tempdir().unwrap();
    let dest = td.path().join("metrics.txt");
    let umask = Environment::from_process().umask;
    let expected = commit(&dest, &Options::new().mode(0o644));
    assert_eq!(expected, 0o644 & !umask);
    assert_eq!(mode_of(&dest), expected);
}

#[test]
fn injected_umask_decides_final_mode() {
    let td = tempdir().unwrap();

    let strict = td.path().join("strict");
    let mut pf = PendingReplacement::with_env(&strict, &Options::new().mode(0o666), &Environment::new(0o077, None)).unwrap();
    assert_eq!(pf.mode_plan().effective_mode, 0o600);
    pf.write_all(b"x").unwrap();
    pf.commit().unwrap();
    assert_eq!(mode_of(&strict), 0o600);

    // Looser than any usual process umask: bits the kernel would strip come back.
    let loose = td.path().join("loose");
    let mut pf = PendingReplacement::with_env(&loose, &Options::new().mode(0o666), &Environment::new(0o002, None)).unwrap();
    pf.write_all(b"x").unwrap();
    pf.commit().unwrap();
    assert_eq!(mode_of(&loose), 0o664);
}

#[test]
fn default_mode_under_injected_umask() {
    let td = tempdir().unwrap();
    let dest = td.path().join("metrics.txt");
    let mut pf = PendingReplacement::with_env(&dest, &Options::new(), &Environment::new(0o022, None)).unwrap();
    pf.write_all(b"temperature_degc 31.2\n").unwrap();
    pf.commit().unwrap();
    assert_eq!(mode_of(&dest), 0o600);
    assert_eq!(fs::read(&dest).unwrap(), b"temperature_degc 31.2\n");
}

#[test]
fn ignore_umask_applies_requested_mode_verbatim() {
    let td = tempdir().unwrap();
    let dest = td.path().join("shared");
    commit(&dest, &Options::new().mode(0o666).ignore_umask());
    assert_eq!(mode_of(&dest), 0o666);
}

#[test]
fn static_mode_is_exact() {
    let td = tempdir().unwrap();
    let dest = td.path().join("static");
    commit(&dest, &Options::new().static_mode(0o632).mode(0o765).ignore_umask());
    assert_eq!(mode_of(&dest), 0o632);
}

#[test]
fn static_mode_wins_over_existing() {
    let td = tempdir().unwrap();
    let dest = td.path().join("both");
    fs::write(&dest, b"old").unwrap();
    fs::set_permissions(&dest, fs::Permissions::from_mode(0o644)).unwrap();
    commit(&dest, &Options::new().existing_permissions().static_mode(0o612));
    assert_eq!(mode_of(&dest), 0o612);
}

#[test]
fn existing_mode_is_preserved() {
    let td = tempdir().unwrap();
    let dest = td.path().join("perm.txt");
    fs::write(&dest, b"").unwrap();
    fs::set_permissions(&dest, fs::Permissions::from_mode(0o640)).unwrap();

    commit(&dest, &Options::new().existing_permissions().mode(0o600));
    assert_eq!(mode_of(&dest), 0o640);
    assert_eq!(fs::read(&dest).unwrap(), b"payload");
}

#[test]
fn existing_requested_for_missing_destination_uses_mode() {
    let td = tempdir().unwrap();
    let dest = td.path().join("absent");
    let env = Environment::new(0o012, None);
    let pf = PendingReplacement::with_env(&dest, &Options::new().mode(0o633).existing_permissions(), &env).unwrap();
    assert_eq!(pf.mode_plan().source, ModeSource::Requested);
    assert_eq!(pf.mode_plan().effective_mode, 0o621);
}

#[test]
fn existing_symlink_is_not_a_mode_source() {
    let td = tempdir().unwrap();
    let target = td.path().join("target");
    fs::write(&target, b"").unwrap();
    fs::set_permissions(&target, fs::Permissions::from_mode(0o755)).unwrap();
    let dest = td.path().join("link");
    std::os::unix::fs::symlink(&target, &dest).unwrap();

    let env = Environment::new(0o022, None);
    let pf = PendingReplacement::with_env(&dest, &Options::new().existing_permissions(), &env).unwrap();
    assert_eq!(pf.mode_plan().source, ModeSource::Default);
}

#[test]
fn write_file_mode_is_exact() {
    let td = tempdir().unwrap();
    let dest = td.path().join("wf");
    write_file(&dest, b"data", 0o604).unwrap();
    assert_eq!(mode_of(&dest), 0o604);
}
