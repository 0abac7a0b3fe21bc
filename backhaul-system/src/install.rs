//! Install / uninstall / status reconciliation.
//!
//! `install` computes the desired state from the plan and converges the host
//! onto it: render the three artifacts, write only what differs, prepare the
//! run log, tighten its parent directory, then activate the timer through
//! the injected [`SystemCtl`]. Running it twice is a no-op by construction.

use std::env;
use std::ffi::{OsStr, OsString};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use backhaul_core::BackupPlan;
use backhaul_units::{logrotate_policy, service_unit, timer_unit, RSYNC_BIN};

use crate::error::{io_err, InstallError};
use crate::paths;
use crate::permissions::{self, LogOwnership, ModeChange};
use crate::systemctl::SystemCtl;
use crate::writer::{write_if_changed, WriteResult};

// ---------------------------------------------------------------------------
// Options and reports
// ---------------------------------------------------------------------------

/// Knobs for a single install invocation.
pub struct InstallOptions {
    /// Report what would change without touching the filesystem or systemd.
    pub dry_run: bool,

    /// Reload/enable/start after writing. Off for staged (`--root`) installs
    /// where no live systemd owns the tree.
    pub activate: bool,

    /// Pre-resolved log ownership; `None` resolves `log_owner`/`log_group`
    /// from the plan via the system databases.
    pub ownership: Option<LogOwnership>,

    /// Search path for the rsync pre-flight probe; `None` uses `$PATH`.
    pub search_path: Option<OsString>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            activate: true,
            ownership: None,
            search_path: None,
        }
    }
}

/// Outcome of the validation run triggered at the end of installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The on-demand service start was accepted.
    Passed,
    /// The on-demand start failed; the schedule is still installed.
    Failed(String),
    /// Activation was skipped (dry-run or staged install).
    Skipped,
}

/// What an install invocation did.
#[derive(Debug)]
pub struct InstallReport {
    pub writes: Vec<WriteResult>,
    pub log_created: bool,
    pub dir_mode: Option<ModeChange>,
    pub validation: Validation,
    pub next_run: Option<String>,
}

impl InstallReport {
    /// True when nothing on disk needed changing.
    pub fn converged(&self) -> bool {
        self.writes
            .iter()
            .all(|w| matches!(w, WriteResult::Unchanged { .. }))
    }
}

/// What an uninstall invocation removed.
#[derive(Debug)]
pub struct UninstallReport {
    pub removed: Vec<PathBuf>,
}

/// Point-in-time view of the installation for `backhaul status`.
#[derive(Debug)]
pub struct StatusReport {
    pub artifacts: Vec<ArtifactStatus>,
    pub log_present: bool,
    pub timer_enabled: Option<bool>,
    pub service_active: Option<bool>,
    pub next_run: Option<String>,
}

/// One generated artifact: is it on disk, and does it match the plan?
#[derive(Debug)]
pub struct ArtifactStatus {
    pub path: PathBuf,
    pub present: bool,
    pub current: bool,
}

// ---------------------------------------------------------------------------
// Desired state
// ---------------------------------------------------------------------------

/// The three artifacts and their target paths, in write order.
pub fn rendered_artifacts(plan: &BackupPlan, root: &Path) -> Vec<(PathBuf, String)> {
    vec![
        (paths::service_path_at(root, plan), service_unit(plan)),
        (paths::timer_path_at(root, plan), timer_unit(plan)),
        (paths::logrotate_path_at(root, plan), logrotate_policy(plan)),
    ]
}

// ---------------------------------------------------------------------------
// install
// ---------------------------------------------------------------------------

/// Converge the host onto the plan. Safe to invoke repeatedly.
pub fn install(
    plan: &BackupPlan,
    root: &Path,
    ctl: &dyn SystemCtl,
    opts: &InstallOptions,
) -> Result<InstallReport, InstallError> {
    // Pre-flight comes first: a missing rsync must abort before anything is
    // written, leaving the host untouched.
    let search = opts
        .search_path
        .clone()
        .or_else(|| env::var_os("PATH"))
        .unwrap_or_default();
    if find_in_path(RSYNC_BIN, &search).is_none() {
        return Err(InstallError::MissingDependency { binary: RSYNC_BIN });
    }

    let mut report = InstallReport {
        writes: Vec::new(),
        log_created: false,
        dir_mode: None,
        validation: Validation::Skipped,
        next_run: None,
    };

    // Destination preparation. The backing filesystem is assumed mounted;
    // only the directory is created.
    if !opts.dry_run {
        let dest = paths::rebase_at(root, &plan.destination);
        std::fs::create_dir_all(&dest).map_err(|e| io_err(&dest, e))?;
    }

    let service_path = paths::service_path_at(root, plan);
    report
        .writes
        .push(write_if_changed(&service_path, &service_unit(plan), opts.dry_run)?);

    let timer_path = paths::timer_path_at(root, plan);
    report
        .writes
        .push(write_if_changed(&timer_path, &timer_unit(plan), opts.dry_run)?);

    if !opts.dry_run {
        let ownership = match opts.ownership {
            Some(o) => o,
            None => permissions::resolve_ownership(&plan.log_owner, &plan.log_group)?,
        };
        let log = paths::rebase_at(root, &plan.log_path);
        report.log_created = permissions::prepare_log_file(&log, ownership)?;
        if let Some(dir) = log.parent() {
            report.dir_mode = permissions::tighten_dir_mode(dir)?;
        }
    }

    let logrotate_path = paths::logrotate_path_at(root, plan);
    report
        .writes
        .push(write_if_changed(&logrotate_path, &logrotate_policy(plan), opts.dry_run)?);

    if opts.activate && !opts.dry_run {
        ctl.daemon_reload()?;
        ctl.enable_now(&plan.job.timer_unit())?;

        report.validation = match ctl.start(&plan.job.service_unit()) {
            Ok(()) => Validation::Passed,
            Err(err) => {
                tracing::warn!(error = %err, "validation run failed; schedule is installed anyway");
                Validation::Failed(err.to_string())
            }
        };

        report.next_run = match ctl.next_trigger(&plan.job.timer_unit()) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(error = %err, "could not query next trigger");
                None
            }
        };
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// uninstall
// ---------------------------------------------------------------------------

/// Inverse procedure: disable the timer, remove the three artifacts, reload.
///
/// The run log and any backups are operator data and stay in place.
pub fn uninstall(
    plan: &BackupPlan,
    root: &Path,
    ctl: &dyn SystemCtl,
    deactivate: bool,
) -> Result<UninstallReport, InstallError> {
    if deactivate {
        // The timer may never have been enabled; that is not a failure.
        if let Err(err) = ctl.disable_now(&plan.job.timer_unit()) {
            tracing::debug!(error = %err, "disable skipped");
        }
    }

    let mut removed = Vec::new();
    for (path, _) in rendered_artifacts(plan, root) {
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
            removed.push(path);
        }
    }

    if deactivate {
        ctl.daemon_reload()?;
    }

    Ok(UninstallReport { removed })
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

/// Inspect artifact presence and drift; query systemd when `ctl` is given.
pub fn status(
    plan: &BackupPlan,
    root: &Path,
    ctl: Option<&dyn SystemCtl>,
) -> Result<StatusReport, InstallError> {
    let mut artifacts = Vec::new();
    for (path, desired) in rendered_artifacts(plan, root) {
        let on_disk = match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => return Err(io_err(&path, err)),
        };
        artifacts.push(ArtifactStatus {
            present: on_disk.is_some(),
            current: on_disk.as_deref() == Some(desired.as_str()),
            path,
        });
    }

    let log_present = paths::rebase_at(root, &plan.log_path).exists();

    let (timer_enabled, service_active, next_run) = match ctl {
        Some(ctl) => (
            Some(ctl.is_enabled(&plan.job.timer_unit())?),
            Some(ctl.is_active(&plan.job.service_unit())?),
            ctl.next_trigger(&plan.job.timer_unit())?,
        ),
        None => (None, None, None),
    };

    Ok(StatusReport {
        artifacts,
        log_present,
        timer_enabled,
        service_active,
        next_run,
    })
}

// ---------------------------------------------------------------------------
// Pre-flight
// ---------------------------------------------------------------------------

/// Locate an executable on a PATH-style search string.
pub fn find_in_path(binary: &str, search: &OsStr) -> Option<PathBuf> {
    env::split_paths(search)
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
