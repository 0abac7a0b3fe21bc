//! `backhaul uninstall` — disable the schedule and remove the artifacts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use backhaul_core::load_plan_at;
use backhaul_system::{uninstall, Systemctl};

use super::{is_live_root, require_root};

/// Arguments for `backhaul uninstall`.
#[derive(Args, Debug)]
pub struct UninstallArgs {
    /// Plan file (default: <root>/etc/backhaul/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Operate on a staged tree instead of the live filesystem.
    #[arg(long, default_value = "/")]
    pub root: PathBuf,
}

impl UninstallArgs {
    pub fn run(self) -> Result<()> {
        let live = is_live_root(&self.root);
        if live {
            require_root()?;
        }

        let plan = load_plan_at(&self.root, self.config.as_deref())
            .context("failed to load backup plan")?;

        let report = uninstall(&plan, &self.root, &Systemctl, live)
            .with_context(|| format!("uninstall failed for job '{}'", plan.job))?;

        if report.removed.is_empty() {
            println!("✓ '{}' was not installed — nothing to remove", plan.job);
            return Ok(());
        }

        println!("✓ '{}' uninstalled", plan.job);
        for path in &report.removed {
            println!("  ✗  {}", path.display());
        }
        println!(
            "run log {} left in place; remove it manually if unwanted",
            plan.log_path.display()
        );
        Ok(())
    }
}
