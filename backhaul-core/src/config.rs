//! Optional YAML plan file.
//!
//! # Storage layout
//!
//! ```text
//! <root>/etc/backhaul/config.yaml    (absent → built-in defaults)
//! ```
//!
//! # API pattern
//!
//! Loading takes an explicit `root` so tests can point it at a `TempDir`
//! instead of the live filesystem. Production callers pass `/`.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::BackupPlan;

/// `<root>/etc/backhaul/config.yaml` — pure, no I/O.
pub fn config_path_at(root: &Path) -> PathBuf {
    root.join("etc").join("backhaul").join("config.yaml")
}

/// Load the backup plan rooted at `root`.
///
/// `explicit` names a plan file directly (CLI `--config`); it must exist.
/// Without it, the default path is read when present and the built-in plan
/// is used otherwise. The result is validated either way.
pub fn load_plan_at(root: &Path, explicit: Option<&Path>) -> Result<BackupPlan, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config_path_at(root),
    };

    if !path.exists() {
        if explicit.is_some() {
            return Err(ConfigError::ConfigNotFound { path });
        }
        let plan = BackupPlan::default();
        validate(&plan)?;
        return Ok(plan);
    }

    let contents = std::fs::read_to_string(&path)?;
    let plan: BackupPlan =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })?;
    validate(&plan)?;
    Ok(plan)
}

/// Reject plans that would render broken or dangerous unit files.
fn validate(plan: &BackupPlan) -> Result<(), ConfigError> {
    if plan.job.0.is_empty() || plan.job.0.contains(['/', ' ']) {
        return Err(invalid(format!(
            "job name '{}' must be non-empty and contain no '/' or spaces",
            plan.job
        )));
    }
    if !plan.source.is_absolute() {
        return Err(invalid(format!(
            "source '{}' must be an absolute path",
            plan.source.display()
        )));
    }
    if !plan.destination.is_absolute() {
        return Err(invalid(format!(
            "destination '{}' must be an absolute path",
            plan.destination.display()
        )));
    }
    if plan.destination.starts_with(&plan.source) {
        return Err(invalid(format!(
            "destination '{}' lies inside source '{}'",
            plan.destination.display(),
            plan.source.display()
        )));
    }
    if !plan.log_path.is_absolute() || plan.log_path.parent().is_none() {
        return Err(invalid(format!(
            "log path '{}' must be an absolute file path",
            plan.log_path.display()
        )));
    }
    if plan.schedule.trim().is_empty() {
        return Err(invalid("schedule must not be empty".to_owned()));
    }
    if plan.rotate_keep == 0 {
        return Err(invalid("rotate_keep must be at least 1".to_owned()));
    }
    if plan.excludes.iter().any(|e| e.trim().is_empty()) {
        return Err(invalid("exclude patterns must not be empty".to_owned()));
    }
    Ok(())
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::InvalidPlan { reason }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_yields_builtin_plan() {
        let root = TempDir::new().unwrap();
        let plan = load_plan_at(root.path(), None).expect("load");
        assert_eq!(plan, BackupPlan::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope.yaml");
        let err = load_plan_at(root.path(), Some(&missing)).expect_err("must fail");
        assert!(matches!(err, ConfigError::ConfigNotFound { .. }));
    }

    #[test]
    fn default_path_file_is_picked_up() {
        let root = TempDir::new().unwrap();
        let cfg = config_path_at(root.path());
        std::fs::create_dir_all(cfg.parent().unwrap()).unwrap();
        std::fs::write(&cfg, "destination: /mnt/tank/home\n").unwrap();

        let plan = load_plan_at(root.path(), None).expect("load");
        assert_eq!(plan.destination, PathBuf::from("/mnt/tank/home"));
        assert_eq!(plan.source, PathBuf::from("/home"));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let root = TempDir::new().unwrap();
        let cfg = root.path().join("bad.yaml");
        std::fs::write(&cfg, "source: [not, a, path\n").unwrap();

        let err = load_plan_at(root.path(), Some(&cfg)).expect_err("must fail");
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, cfg),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[rstest]
    #[case("source: relative/path\n")]
    #[case("destination: relative\n")]
    #[case("job: 'has space'\n")]
    #[case("schedule: '  '\n")]
    #[case("rotate_keep: 0\n")]
    #[case("excludes: ['']\n")]
    #[case("source: /srv\ndestination: /srv/backup\n")]
    fn invalid_plans_are_rejected(#[case] yaml: &str) {
        let root = TempDir::new().unwrap();
        let cfg = root.path().join("plan.yaml");
        std::fs::write(&cfg, yaml).unwrap();

        let err = load_plan_at(root.path(), Some(&cfg)).expect_err("must fail");
        assert!(matches!(err, ConfigError::InvalidPlan { .. }), "{err:?}");
    }
}
