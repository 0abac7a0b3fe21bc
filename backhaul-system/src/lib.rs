//! Host-side provisioning for backhaul: fixed artifact paths, an idempotent
//! reconciling writer, run-log permission handling, a `systemctl` control
//! interface, and the install/uninstall/status flows plus the service-mode
//! backup runner.

pub mod diff;
pub mod error;
pub mod install;
pub mod paths;
pub mod permissions;
pub mod runner;
pub mod systemctl;
pub mod writer;

pub use diff::{diff_install, FileDiff};
pub use error::InstallError;
pub use install::{
    install, rendered_artifacts, status, uninstall, ArtifactStatus, InstallOptions, InstallReport,
    StatusReport, UninstallReport, Validation,
};
pub use permissions::{LogOwnership, ModeChange, LOG_FILE_MODE, SAFE_DIR_MODE};
pub use runner::run_backup;
pub use systemctl::{SystemCtl, Systemctl};
pub use writer::WriteResult;
