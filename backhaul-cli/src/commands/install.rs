//! `backhaul install` — converge the host onto the plan and enable the schedule.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use backhaul_core::{load_plan_at, BackupPlan};
use backhaul_system::{
    install, InstallOptions, InstallReport, Systemctl, Validation, WriteResult,
};

use super::{is_live_root, require_root};

/// Arguments for `backhaul install`.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Plan file (default: <root>/etc/backhaul/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Stage the configuration tree under another root (image builds, tests).
    /// Activation is skipped for staged roots.
    #[arg(long, default_value = "/")]
    pub root: PathBuf,

    /// Show what would be written without touching the filesystem or systemd.
    #[arg(long)]
    pub dry_run: bool,

    /// Write artifacts but skip daemon-reload/enable/start.
    #[arg(long)]
    pub no_activate: bool,
}

impl InstallArgs {
    pub fn run(self) -> Result<()> {
        let live = is_live_root(&self.root);
        if live && !self.dry_run {
            require_root()?;
        }

        let plan = load_plan_at(&self.root, self.config.as_deref())
            .context("failed to load backup plan")?;

        let opts = InstallOptions {
            dry_run: self.dry_run,
            activate: live && !self.no_activate,
            ..InstallOptions::default()
        };
        let report = install(&plan, &self.root, &Systemctl, &opts)
            .with_context(|| format!("installation failed for job '{}'", plan.job))?;

        print_report(&plan, &report, self.dry_run);
        Ok(())
    }
}

fn print_report(plan: &BackupPlan, report: &InstallReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let written = report
        .writes
        .iter()
        .filter(|w| !matches!(w, WriteResult::Unchanged { .. }))
        .count();
    let unchanged = report.writes.len() - written;

    if report.converged() {
        println!("{prefix}✓ '{}' already installed — nothing to do", plan.job);
    } else {
        println!(
            "{prefix}✓ '{}' installed ({written} written, {unchanged} unchanged)",
            plan.job
        );
    }

    for w in &report.writes {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { path } => println!("  ·  {}", path.display()),
        }
    }

    if report.log_created {
        println!("  ✎  {} (run log, mode 0640)", plan.log_path.display());
    }
    if let Some(change) = report.dir_mode {
        println!(
            "  ✓  log directory tightened from {:04o} to {:04o}",
            change.before, change.after
        );
    }

    match &report.validation {
        Validation::Passed => {
            println!("{}", "✓ validation run started".green());
        }
        Validation::Failed(err) => {
            println!(
                "{}",
                format!(
                    "! validation run failed: {err}\n  the schedule is installed; inspect `journalctl -u {}`",
                    plan.job.service_unit()
                )
                .yellow()
            );
        }
        Validation::Skipped => {}
    }

    if let Some(next) = &report.next_run {
        println!("next scheduled run: {next}");
    }
}
