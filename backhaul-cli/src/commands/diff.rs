//! `backhaul diff` — unified diff of what install would write.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use backhaul_core::load_plan_at;
use backhaul_system::diff_install;

/// Arguments for `backhaul diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Plan file (default: <root>/etc/backhaul/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compare against a staged tree instead of the live filesystem.
    #[arg(long, default_value = "/")]
    pub root: PathBuf,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let plan = load_plan_at(&self.root, self.config.as_deref())
            .context("failed to load backup plan")?;

        let diffs = diff_install(&plan, &self.root).context("diff failed")?;
        if diffs.is_empty() {
            println!("No differences for '{}'.", plan.job);
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
