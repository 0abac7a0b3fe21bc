//! Text generation for the service unit, timer unit, and rotation policy.
//!
//! # Field mapping
//!
//! | Artifact       | Consumer  | Key lines                                        |
//! |----------------|-----------|--------------------------------------------------|
//! | `<job>.service`| systemd   | `RequiresMountsFor`, `ConditionPathIsDirectory`, `Nice`, `IOSchedulingClass`, `ExecStart` |
//! | `<job>.timer`  | systemd   | `OnCalendar`, `Persistent`, `AccuracySec`, `Unit`|
//! | `<job>` policy | logrotate | path stanza, `rotate`, `delaycompress`, `create` |

use backhaul_core::BackupPlan;

/// Installed location of the backhaul binary; the service unit invokes it.
pub const BIN_PATH: &str = "/usr/local/bin/backhaul";

/// The external file-sync utility the runner shells out to.
pub const RSYNC_BIN: &str = "rsync";

/// Below-normal CPU priority for the sync run.
const CPU_NICE: i32 = 10;

/// Idle I/O scheduling so the sync never starves foreground disk access.
const IO_CLASS: &str = "idle";

/// Mode applied by logrotate when re-creating the log after rotation.
const LOG_CREATE_MODE: &str = "0640";

// ---------------------------------------------------------------------------
// Service unit
// ---------------------------------------------------------------------------

/// `ExecStart=` command line of the service unit.
///
/// The binary itself is the service action: it writes the start marker,
/// runs rsync, and writes the end marker with the exit code.
pub fn run_command(plan: &BackupPlan) -> String {
    format!("{} run --log {}", BIN_PATH, plan.log_path.display())
}

/// Render `<job>.service`.
///
/// `Type=oneshot` means systemd never starts a second instance of the unit
/// while one is still activating, so runs cannot overlap.
pub fn service_unit(plan: &BackupPlan) -> String {
    format!(
        r#"[Unit]
Description=Scheduled rsync backup of {source}
Documentation=man:rsync(1) man:systemd.timer(5)
RequiresMountsFor={source} {dest}
ConditionPathIsDirectory={dest}

[Service]
Type=oneshot
Nice={nice}
IOSchedulingClass={io_class}
ExecStart={exec_start}
"#,
        source = plan.source.display(),
        dest = plan.destination.display(),
        nice = CPU_NICE,
        io_class = IO_CLASS,
        exec_start = run_command(plan),
    )
}

// ---------------------------------------------------------------------------
// Timer unit
// ---------------------------------------------------------------------------

/// Render `<job>.timer`.
pub fn timer_unit(plan: &BackupPlan) -> String {
    format!(
        r#"[Unit]
Description=Schedule for {service}

[Timer]
OnCalendar={schedule}
AccuracySec={accuracy}
Persistent={persistent}
Unit={service}

[Install]
WantedBy=timers.target
"#,
        service = plan.job.service_unit(),
        schedule = plan.schedule,
        accuracy = plan.accuracy,
        persistent = plan.persistent,
    )
}

// ---------------------------------------------------------------------------
// Rotation policy
// ---------------------------------------------------------------------------

/// Render the logrotate stanza for the run log.
///
/// `delaycompress` keeps the most recently rotated generation readable
/// without decompressing; `create` restores the exact ownership and mode the
/// installer applied to the live log.
pub fn logrotate_policy(plan: &BackupPlan) -> String {
    format!(
        r#"{log} {{
    su {owner} {group}
    daily
    rotate {keep}
    missingok
    notifempty
    compress
    delaycompress
    create {mode} {owner} {group}
}}
"#,
        log = plan.log_path.display(),
        owner = plan.log_owner,
        group = plan.log_group,
        keep = plan.rotate_keep,
        mode = LOG_CREATE_MODE,
    )
}

// ---------------------------------------------------------------------------
// rsync invocation
// ---------------------------------------------------------------------------

/// Argument vector for the rsync invocation.
///
/// Archive semantics plus hardlinks, ACLs, and extended attributes; numeric
/// IDs so the backup survives uid/gid renames; `-x` to stay on the source
/// filesystem; deletions deferred to end-of-transfer; partial/in-place so an
/// interrupted run resumes instead of restarting. The source carries a
/// trailing slash: copy the contents, not the directory itself.
pub fn rsync_args(plan: &BackupPlan) -> Vec<String> {
    let mut args: Vec<String> = [
        "-aHAX",
        "--numeric-ids",
        "-x",
        "--delete-delay",
        "--partial",
        "--inplace",
        "--info=progress2",
        "--stats",
        "--human-readable",
    ]
    .iter()
    .map(|s| (*s).to_owned())
    .collect();

    for pattern in &plan.excludes {
        args.push(format!("--exclude={pattern}"));
    }

    args.push(format!("{}/", plan.source.display()));
    args.push(plan.destination.display().to_string());
    args
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
