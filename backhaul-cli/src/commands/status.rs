//! `backhaul status` — artifact and schedule visibility.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use backhaul_core::load_plan_at;
use backhaul_system::{status, StatusReport, SystemCtl, Systemctl};

use super::is_live_root;

/// Arguments for `backhaul status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Plan file (default: <root>/etc/backhaul/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Inspect a staged tree; systemd is not queried for staged roots.
    #[arg(long, default_value = "/")]
    pub root: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusJson {
    artifacts: Vec<ArtifactJson>,
    log_present: bool,
    timer_enabled: Option<bool>,
    service_active: Option<bool>,
    next_run: Option<String>,
}

#[derive(Serialize)]
struct ArtifactJson {
    path: String,
    present: bool,
    current: bool,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "artifact")]
    artifact: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "state")]
    state: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let plan = load_plan_at(&self.root, self.config.as_deref())
            .context("failed to load backup plan")?;

        let ctl = Systemctl;
        let ctl_ref: Option<&dyn SystemCtl> = if is_live_root(&self.root) {
            Some(&ctl)
        } else {
            None
        };
        let report = status(&plan, &self.root, ctl_ref).context("failed to inspect status")?;

        if self.json {
            print_json(&report)?;
            return Ok(());
        }
        print_table(&report);
        Ok(())
    }
}

fn print_json(report: &StatusReport) -> Result<()> {
    let payload = StatusJson {
        artifacts: report
            .artifacts
            .iter()
            .map(|a| ArtifactJson {
                path: a.path.display().to_string(),
                present: a.present,
                current: a.current,
            })
            .collect(),
        log_present: report.log_present,
        timer_enabled: report.timer_enabled,
        service_active: report.service_active,
        next_run: report.next_run.clone(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to render status JSON")?
    );
    Ok(())
}

fn print_table(report: &StatusReport) {
    let rows: Vec<StatusTableRow> = report
        .artifacts
        .iter()
        .map(|a| {
            let artifact = a
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| a.path.display().to_string());
            let state = if !a.present {
                "missing".red().to_string()
            } else if !a.current {
                "drifted".yellow().to_string()
            } else {
                "ok".green().to_string()
            };
            StatusTableRow {
                artifact,
                path: a.path.display().to_string(),
                state,
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");

    println!(
        "run log: {}",
        if report.log_present { "present" } else { "missing" }
    );
    if let Some(enabled) = report.timer_enabled {
        println!("timer enabled: {}", if enabled { "yes" } else { "no" });
    }
    if let Some(active) = report.service_active {
        println!("service active: {}", if active { "yes" } else { "no" });
    }
    match &report.next_run {
        Some(next) => println!("next scheduled run: {next}"),
        None if report.timer_enabled.is_some() => println!("next scheduled run: none pending"),
        None => {}
    }
}
