//! Fixed filesystem locations for the generated artifacts.
//!
//! Every helper takes an explicit `root` so tests and staged installs
//! (`--root`) can work against a scratch tree. Production callers pass `/`.

use std::path::{Path, PathBuf};

use backhaul_core::BackupPlan;

/// `<root>/etc/systemd/system/`
pub fn unit_dir_at(root: &Path) -> PathBuf {
    root.join("etc").join("systemd").join("system")
}

/// `<root>/etc/systemd/system/<job>.service`
pub fn service_path_at(root: &Path, plan: &BackupPlan) -> PathBuf {
    unit_dir_at(root).join(plan.job.service_unit())
}

/// `<root>/etc/systemd/system/<job>.timer`
pub fn timer_path_at(root: &Path, plan: &BackupPlan) -> PathBuf {
    unit_dir_at(root).join(plan.job.timer_unit())
}

/// `<root>/etc/logrotate.d/<job>`
pub fn logrotate_path_at(root: &Path, plan: &BackupPlan) -> PathBuf {
    root.join("etc").join("logrotate.d").join(&plan.job.0)
}

/// Re-root an absolute path under `root`.
///
/// Plans always carry live absolute paths (`/var/log/...`); staged installs
/// and tests need them relocated under the scratch root. `/` is the identity.
pub fn rebase_at(root: &Path, absolute: &Path) -> PathBuf {
    if root == Path::new("/") {
        return absolute.to_path_buf();
    }
    match absolute.strip_prefix("/") {
        Ok(rel) => root.join(rel),
        Err(_) => root.join(absolute),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_derive_from_the_job_name() {
        let plan = BackupPlan::default();
        let root = Path::new("/");
        assert_eq!(
            service_path_at(root, &plan),
            PathBuf::from("/etc/systemd/system/backhaul.service")
        );
        assert_eq!(
            timer_path_at(root, &plan),
            PathBuf::from("/etc/systemd/system/backhaul.timer")
        );
        assert_eq!(
            logrotate_path_at(root, &plan),
            PathBuf::from("/etc/logrotate.d/backhaul")
        );
    }

    #[test]
    fn rebase_is_identity_on_live_root() {
        let p = Path::new("/var/log/backhaul.log");
        assert_eq!(rebase_at(Path::new("/"), p), p);
    }

    #[test]
    fn rebase_relocates_under_staged_root() {
        let rebased = rebase_at(Path::new("/tmp/stage"), Path::new("/var/log/backhaul.log"));
        assert_eq!(rebased, PathBuf::from("/tmp/stage/var/log/backhaul.log"));
    }
}
