//! backhaul — provision a scheduled rsync backup via systemd and logrotate.
//!
//! # Usage
//!
//! ```text
//! backhaul install [--config <path>] [--root <dir>] [--dry-run] [--no-activate]
//! backhaul uninstall [--config <path>] [--root <dir>]
//! backhaul status [--config <path>] [--root <dir>] [--json]
//! backhaul diff [--config <path>] [--root <dir>]
//! backhaul run [--config <path>] [--log <path>]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    diff::DiffArgs, install::InstallArgs, run::RunArgs, status::StatusArgs,
    uninstall::UninstallArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "backhaul",
    version,
    about = "Provision a daily rsync backup job on this host",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the service unit, timer unit, and rotation policy, then enable the schedule.
    Install(InstallArgs),

    /// Disable the schedule and remove the generated artifacts.
    Uninstall(UninstallArgs),

    /// Show artifact state, timer state, and the next scheduled run.
    Status(StatusArgs),

    /// Show a unified diff of what install would write.
    Diff(DiffArgs),

    /// Execute one backup run (the generated service unit's entry point).
    Run(RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Install(args) => args.run(),
        Commands::Uninstall(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Run(args) => args.run(),
    }
}
