//! Service-mode backup run: start marker → rsync → end marker.
//!
//! This is what `ExecStart` invokes on every timer firing. The markers
//! bracket the sync unconditionally — a failing rsync still gets its exit
//! code recorded in the end marker — and rsync's own output streams are
//! appended to the run log between them. systemd's `Type=oneshot` guarantees
//! there is exactly one writer at a time.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use chrono::{SecondsFormat, Utc};

use backhaul_core::BackupPlan;
use backhaul_units::{rsync_args, RSYNC_BIN};

use crate::error::{io_err, InstallError};

/// Run the plan's rsync invocation, logging to `log_path`.
///
/// Returns rsync's exit code; the caller decides whether to propagate it as
/// the process status. Errors are reserved for the runner's own failures
/// (log unwritable, rsync missing).
pub fn run_backup(plan: &BackupPlan, log_path: &Path) -> Result<i32, InstallError> {
    let mut sync = Command::new(RSYNC_BIN);
    sync.args(rsync_args(plan));
    run_with_sync(plan, log_path, sync)
}

/// Inner run with an arbitrary sync command, so tests can substitute a
/// scripted process for rsync.
pub fn run_with_sync(
    plan: &BackupPlan,
    log_path: &Path,
    mut sync: Command,
) -> Result<i32, InstallError> {
    // Pre-start directory ensure. The unit's directory condition already
    // gated on the backup volume; this covers first runs and direct
    // `backhaul run` invocations.
    std::fs::create_dir_all(&plan.destination).map_err(|e| io_err(&plan.destination, e))?;

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| io_err(log_path, e))?;

    writeln!(
        log,
        "[{}] backup start: {} -> {}",
        timestamp(),
        plan.source.display(),
        plan.destination.display()
    )
    .map_err(|e| io_err(log_path, e))?;
    tracing::info!(
        source = %plan.source.display(),
        destination = %plan.destination.display(),
        "backup run started"
    );

    let status = sync
        .stdout(Stdio::from(
            log.try_clone().map_err(|e| io_err(log_path, e))?,
        ))
        .stderr(Stdio::from(
            log.try_clone().map_err(|e| io_err(log_path, e))?,
        ))
        .status()
        .map_err(|e| io_err(RSYNC_BIN, e))?;

    let code = exit_code(status);
    writeln!(log, "[{}] backup end: exit {}", timestamp(), code)
        .map_err(|e| io_err(log_path, e))?;

    if code == 0 {
        tracing::info!("backup run finished");
    } else {
        tracing::warn!(exit_code = code, "backup run failed");
    }
    Ok(code)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Exit code of the sync process; signal terminations map to 128+N, the
/// shell convention.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
