//! Run-log preparation and log-directory permission tightening.
//!
//! logrotate refuses to rotate a log whose parent directory is writable by
//! group or other ("insecure parent directory"), so the installer enforces
//! that precondition up front instead of letting rotation fail weeks later.

use std::fs::{self, OpenOptions, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use crate::error::{io_err, InstallError};

/// Ceiling for the log's parent directory mode. Tightening intersects the
/// current mode with this mask, so it can only ever clear bits.
pub const SAFE_DIR_MODE: u32 = 0o755;

/// Mode of the run log: owner read-write, group read, no other access.
pub const LOG_FILE_MODE: u32 = 0o640;

// ---------------------------------------------------------------------------
// Ownership resolution
// ---------------------------------------------------------------------------

/// Numeric identity applied to the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOwnership {
    pub uid: u32,
    pub gid: u32,
}

/// Resolve `owner`/`group` names to numeric ids via `id -u` and `getent`.
pub fn resolve_ownership(owner: &str, group: &str) -> Result<LogOwnership, InstallError> {
    Ok(LogOwnership {
        uid: resolve_uid(owner)?,
        gid: resolve_gid(group)?,
    })
}

fn resolve_uid(owner: &str) -> Result<u32, InstallError> {
    let output = Command::new("id")
        .args(["-u", owner])
        .output()
        .map_err(|e| InstallError::Lookup(format!("failed to spawn `id -u {owner}`: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::Lookup(format!(
            "unknown user '{owner}' (status {})",
            output.status
        )));
    }
    let uid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    uid.parse()
        .map_err(|_| InstallError::Lookup(format!("uid for '{owner}' was not numeric: '{uid}'")))
}

fn resolve_gid(group: &str) -> Result<u32, InstallError> {
    let output = Command::new("getent")
        .args(["group", group])
        .output()
        .map_err(|e| InstallError::Lookup(format!("failed to spawn `getent group {group}`: {e}")))?;
    if !output.status.success() {
        return Err(InstallError::Lookup(format!(
            "unknown group '{group}' (status {})",
            output.status
        )));
    }
    // getent group format: name:passwd:gid:members
    let line = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let gid = line
        .split(':')
        .nth(2)
        .ok_or_else(|| InstallError::Lookup(format!("malformed getent entry: '{line}'")))?;
    gid.parse()
        .map_err(|_| InstallError::Lookup(format!("gid for '{group}' was not numeric: '{gid}'")))
}

// ---------------------------------------------------------------------------
// Run log
// ---------------------------------------------------------------------------

/// Create the run log if absent and apply ownership and mode `0640`.
///
/// Returns `true` when the file was newly created. Existing content is
/// never touched; the service appends, logrotate truncates.
pub fn prepare_log_file(path: &Path, ownership: LogOwnership) -> Result<bool, InstallError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let created = !path.exists();
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;

    std::os::unix::fs::chown(path, Some(ownership.uid), Some(ownership.gid))
        .map_err(|e| io_err(path, e))?;
    fs::set_permissions(path, Permissions::from_mode(LOG_FILE_MODE))
        .map_err(|e| io_err(path, e))?;

    Ok(created)
}

// ---------------------------------------------------------------------------
// Directory tightening
// ---------------------------------------------------------------------------

/// A mode adjustment performed on the log's parent directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub before: u32,
    pub after: u32,
}

/// Intersect the directory mode with [`SAFE_DIR_MODE`].
///
/// One operation covers both requirements: group/other-write bits are
/// revoked and anything above the ceiling is reduced to it. A directory
/// already at or below the ceiling is left untouched (`None`).
pub fn tighten_dir_mode(dir: &Path) -> Result<Option<ModeChange>, InstallError> {
    let meta = fs::metadata(dir).map_err(|e| io_err(dir, e))?;
    let mode = meta.permissions().mode() & 0o7777;
    let tightened = mode & SAFE_DIR_MODE;

    if tightened == mode {
        return Ok(None);
    }

    fs::set_permissions(dir, Permissions::from_mode(tightened)).map_err(|e| io_err(dir, e))?;
    tracing::info!(
        "tightened {} from {mode:04o} to {tightened:04o}",
        dir.display()
    );
    Ok(Some(ModeChange {
        before: mode,
        after: tightened,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
