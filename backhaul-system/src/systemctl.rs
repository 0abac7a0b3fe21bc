//! Control interface to the scheduling daemon.
//!
//! The installer only ever talks to systemd through the [`SystemCtl`] trait,
//! so reconciliation logic is testable against a recording fake. The real
//! implementation shells out to `systemctl`.

use std::process::Command;

use crate::error::InstallError;

/// Capability set the installer needs from the scheduling daemon:
/// reload the unit cache, enable/disable, trigger a run, query state.
pub trait SystemCtl {
    fn daemon_reload(&self) -> Result<(), InstallError>;
    fn enable_now(&self, unit: &str) -> Result<(), InstallError>;
    fn disable_now(&self, unit: &str) -> Result<(), InstallError>;
    fn start(&self, unit: &str) -> Result<(), InstallError>;
    fn is_enabled(&self, unit: &str) -> Result<bool, InstallError>;
    fn is_active(&self, unit: &str) -> Result<bool, InstallError>;
    /// Next scheduled fire time of a timer unit, if one is pending.
    fn next_trigger(&self, unit: &str) -> Result<Option<String>, InstallError>;
}

/// Shell-out implementation backed by the `systemctl` binary.
pub struct Systemctl;

impl SystemCtl for Systemctl {
    fn daemon_reload(&self) -> Result<(), InstallError> {
        run_systemctl(&["daemon-reload"]).map(|_| ())
    }

    fn enable_now(&self, unit: &str) -> Result<(), InstallError> {
        run_systemctl(&["enable", "--now", unit]).map(|_| ())
    }

    fn disable_now(&self, unit: &str) -> Result<(), InstallError> {
        run_systemctl(&["disable", "--now", unit]).map(|_| ())
    }

    fn start(&self, unit: &str) -> Result<(), InstallError> {
        run_systemctl(&["start", unit]).map(|_| ())
    }

    fn is_enabled(&self, unit: &str) -> Result<bool, InstallError> {
        query_state(&["is-enabled", unit])
    }

    fn is_active(&self, unit: &str) -> Result<bool, InstallError> {
        query_state(&["is-active", unit])
    }

    fn next_trigger(&self, unit: &str) -> Result<Option<String>, InstallError> {
        let stdout = run_systemctl(&[
            "show",
            unit,
            "--property=NextElapseUSecRealtime",
            "--value",
        ])?;
        let next = stdout.trim();
        if next.is_empty() || next == "n/a" {
            return Ok(None);
        }
        Ok(Some(next.to_owned()))
    }
}

/// Run `systemctl` and fail on a non-zero exit, echoing its output.
fn run_systemctl(args: &[&str]) -> Result<String, InstallError> {
    let output = Command::new("systemctl")
        .args(args)
        .output()
        .map_err(|e| InstallError::Systemctl(format!("failed to spawn systemctl: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    Err(InstallError::Systemctl(format!(
        "systemctl {} failed (status {}): {} {}",
        args.join(" "),
        output.status,
        stdout,
        stderr
    )))
}

/// `is-enabled`/`is-active` use the exit status as the answer, so a non-zero
/// exit is a negative result rather than an error.
fn query_state(args: &[&str]) -> Result<bool, InstallError> {
    let output = Command::new("systemctl")
        .args(args)
        .output()
        .map_err(|e| InstallError::Systemctl(format!("failed to spawn systemctl: {e}")))?;
    Ok(output.status.success())
}
