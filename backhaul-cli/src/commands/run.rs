//! `backhaul run` — one backup run; the generated service unit's entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use backhaul_core::load_plan_at;
use backhaul_system::run_backup;

/// Arguments for `backhaul run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Plan file (default: /etc/backhaul/config.yaml when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run log target; defaults to the plan's log path. The generated unit
    /// passes this explicitly so the descriptor names its own log.
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        init_tracing();

        let plan = load_plan_at(Path::new("/"), self.config.as_deref())
            .context("failed to load backup plan")?;
        let log = self.log.unwrap_or_else(|| plan.log_path.clone());

        let code = run_backup(&plan, &log).context("backup run failed")?;
        if code != 0 {
            // Propagate rsync's exit code so systemd records the failure.
            std::process::exit(code);
        }
        Ok(())
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
