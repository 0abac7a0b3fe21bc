pub mod diff;
pub mod install;
pub mod run;
pub mod status;
pub mod uninstall;

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

/// True when operating on the live filesystem rather than a staged tree.
pub(crate) fn is_live_root(root: &Path) -> bool {
    root == Path::new("/")
}

/// Installing under `/` writes into `/etc` and drives systemd; insist on
/// euid 0 so the failure is one clear message instead of a trail of
/// permission errors.
pub(crate) fn require_root() -> Result<()> {
    let output = Command::new("id")
        .arg("-u")
        .output()
        .context("failed to resolve current uid via `id -u`")?;
    if !output.status.success() {
        anyhow::bail!("`id -u` failed (status {})", output.status);
    }
    let uid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if uid != "0" {
        anyhow::bail!("this command modifies /etc and systemd state; re-run as root");
    }
    Ok(())
}
