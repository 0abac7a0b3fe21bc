//! Domain types for the backup plan.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! The plan is serializable/deserializable via serde + serde_yaml.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed job name. Unit file names and the rotation policy file
/// name all derive from it, so the generated artifacts stay consistent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobName(pub String);

impl JobName {
    /// `<job>.service`
    pub fn service_unit(&self) -> String {
        format!("{}.service", self.0)
    }

    /// `<job>.timer`
    pub fn timer_unit(&self) -> String {
        format!("{}.timer", self.0)
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JobName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Everything needed to render and activate one scheduled backup job.
///
/// A plan loads from `/etc/backhaul/config.yaml` when present; every field
/// has a default, so an empty or absent file yields the stock nightly
/// `/home` backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupPlan {
    /// Name shared by the service unit, timer unit, and rotation policy.
    pub job: JobName,

    /// Directory tree to back up. Rendered with a trailing slash so rsync
    /// copies the contents rather than the directory itself.
    pub source: PathBuf,

    /// Destination directory on the backup volume.
    pub destination: PathBuf,

    /// rsync exclude patterns for high-churn subtrees.
    pub excludes: Vec<String>,

    /// systemd `OnCalendar` expression.
    pub schedule: String,

    /// Timer coalescing window (`AccuracySec`).
    pub accuracy: String,

    /// Re-run a firing that was missed while the machine was off.
    pub persistent: bool,

    /// Append-only run log written by every service run.
    pub log_path: PathBuf,

    /// Rotated generations kept by logrotate.
    pub rotate_keep: u32,

    /// Owner applied to the run log and to rotated copies.
    pub log_owner: String,

    /// Group applied to the run log and to rotated copies.
    pub log_group: String,
}

impl Default for BackupPlan {
    fn default() -> Self {
        Self {
            job: JobName::from("backhaul"),
            source: PathBuf::from("/home"),
            destination: PathBuf::from("/srv/backup/home"),
            excludes: vec![
                ".cache/".to_owned(),
                ".thumbnails/".to_owned(),
                ".local/share/Trash/".to_owned(),
                ".local/share/containers/".to_owned(),
                "snap/".to_owned(),
            ],
            schedule: "*-*-* 01:00:00".to_owned(),
            accuracy: "1min".to_owned(),
            persistent: true,
            log_path: PathBuf::from("/var/log/backhaul.log"),
            rotate_keep: 14,
            log_owner: "root".to_owned(),
            log_group: "adm".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_name_derives_unit_names() {
        let job = JobName::from("backhaul");
        assert_eq!(job.service_unit(), "backhaul.service");
        assert_eq!(job.timer_unit(), "backhaul.timer");
        assert_eq!(job.to_string(), "backhaul");
    }

    #[test]
    fn default_plan_is_internally_consistent() {
        let plan = BackupPlan::default();
        assert!(plan.source.is_absolute());
        assert!(plan.destination.is_absolute());
        assert!(plan.log_path.is_absolute());
        assert_eq!(plan.excludes.len(), 5);
        assert_eq!(plan.rotate_keep, 14);
    }

    #[test]
    fn partial_yaml_merges_over_defaults() {
        let plan: BackupPlan =
            serde_yaml::from_str("source: /srv/data\nrotate_keep: 7\n").expect("parse");
        assert_eq!(plan.source, PathBuf::from("/srv/data"));
        assert_eq!(plan.rotate_keep, 7);
        // Untouched fields keep their defaults.
        assert_eq!(plan.job, JobName::from("backhaul"));
        assert_eq!(plan.schedule, "*-*-* 01:00:00");
    }

    #[test]
    fn plan_yaml_roundtrip() {
        let plan = BackupPlan::default();
        let yaml = serde_yaml::to_string(&plan).expect("serialize");
        let back: BackupPlan = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(plan, back);
    }
}
