//! Unified diff support for `backhaul diff`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use similar::TextDiff;

use backhaul_core::BackupPlan;

use crate::error::{io_err, InstallError};
use crate::install::rendered_artifacts;

/// A single artifact diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render what `install` would write and compare it to on-disk content.
///
/// No files are written.
pub fn diff_install(plan: &BackupPlan, root: &Path) -> Result<Vec<FileDiff>, InstallError> {
    let mut diffs = Vec::new();
    for (path, rendered) in rendered_artifacts(plan, root) {
        let existing = read_existing_or_empty(&path)?;
        if existing == rendered {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path,
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

fn read_existing_or_empty(path: &Path) -> Result<String, InstallError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(err) => Err(io_err(path, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::writer::write_if_changed;

    #[test]
    fn fresh_root_diffs_every_artifact() {
        let root = TempDir::new().unwrap();
        let plan = BackupPlan::default();

        let diffs = diff_install(&plan, root.path()).expect("diff");
        assert_eq!(diffs.len(), 3);
        let service = &diffs[0];
        assert!(service
            .unified_diff
            .contains("--- a/etc/systemd/system/backhaul.service"));
        assert!(service
            .unified_diff
            .contains("+++ b/etc/systemd/system/backhaul.service"));
        assert!(service.unified_diff.contains("+[Unit]"));
    }

    #[test]
    fn no_diffs_after_artifacts_are_written() {
        let root = TempDir::new().unwrap();
        let plan = BackupPlan::default();

        for (path, content) in rendered_artifacts(&plan, root.path()) {
            write_if_changed(&path, &content, false).unwrap();
        }

        let diffs = diff_install(&plan, root.path()).expect("diff");
        assert!(diffs.is_empty(), "written artifacts should have no diff");
    }

    #[test]
    fn local_edit_produces_unified_diff() {
        let root = TempDir::new().unwrap();
        let plan = BackupPlan::default();

        for (path, content) in rendered_artifacts(&plan, root.path()) {
            write_if_changed(&path, &content, false).unwrap();
        }

        let timer = crate::paths::timer_path_at(root.path(), &plan);
        let edited = fs::read_to_string(&timer)
            .unwrap()
            .replace("01:00:00", "03:30:00");
        fs::write(&timer, edited).unwrap();

        let diffs = diff_install(&plan, root.path()).expect("diff");
        assert_eq!(diffs.len(), 1);
        assert!(diffs[0].unified_diff.contains("-OnCalendar=*-*-* 03:30:00"));
        assert!(diffs[0].unified_diff.contains("+OnCalendar=*-*-* 01:00:00"));
        assert!(diffs[0].unified_diff.contains("@@"));
    }
}
