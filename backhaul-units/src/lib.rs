//! Rendering of the three generated artifacts.
//!
//! Everything here is a pure function of the [`BackupPlan`]: same plan in,
//! byte-identical text out. That property is what makes repeated installs
//! converge instead of churning files.

mod render;

pub use render::{logrotate_policy, rsync_args, service_unit, timer_unit, BIN_PATH, RSYNC_BIN};
