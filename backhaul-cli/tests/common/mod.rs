#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Directory of executable stub tools, for scrubbed-`PATH` runs.
pub fn fake_tool_dir(tools: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("tool dir");
    for tool in tools {
        let path = dir.path().join(tool);
        fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    }
    dir
}

/// `PATH` that leads with `extra` and falls back to the ambient search path,
/// so system tools (`id`, `getent`, `sh`) keep resolving.
pub fn path_with(extra: &std::path::Path) -> std::ffi::OsString {
    let mut paths = vec![extra.to_path_buf()];
    if let Some(ambient) = std::env::var_os("PATH") {
        paths.extend(std::env::split_paths(&ambient));
    }
    std::env::join_paths(paths).expect("join PATH")
}

pub fn current_user() -> String {
    id_output(&["-un"])
}

pub fn current_group() -> String {
    id_output(&["-gn"])
}

fn id_output(args: &[&str]) -> String {
    let output = Command::new("id").args(args).output().expect("run id");
    assert!(output.status.success(), "id {args:?} failed");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Write a plan whose data paths live under `data` and whose log ownership
/// is the current (unprivileged) user, so chown is a permitted no-op.
pub fn write_unprivileged_plan(data: &TempDir) -> PathBuf {
    let source = data.path().join("source");
    fs::create_dir_all(&source).expect("mkdir source");
    let cfg = data.path().join("plan.yaml");
    fs::write(
        &cfg,
        format!(
            "source: {}\ndestination: {}\nlog_owner: {}\nlog_group: {}\n",
            source.display(),
            data.path().join("dest").display(),
            current_user(),
            current_group(),
        ),
    )
    .expect("write plan");
    cfg
}
