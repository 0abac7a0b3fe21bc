//! Reconciling writer for generated artifacts.
//!
//! ## `write_if_changed` protocol
//!
//! 1. Read the current on-disk content (absent file → no content).
//! 2. Compare with the rendered content → skip if identical.
//! 3. Write to `<path>.backhaul.tmp`.
//! 4. Rename to the final path (atomic on POSIX).
//!
//! Skipping identical content is what makes a second install a true no-op:
//! no mtime churn, no partial rewrites, byte-identical descriptors.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, InstallError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual artifact write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped — on-disk content already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// write_if_changed
// ---------------------------------------------------------------------------

/// Write `content` to `path` only when the on-disk content differs.
pub fn write_if_changed(
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, InstallError> {
    let tmp = PathBuf::from(format!("{}.backhaul.tmp", path.display()));
    write_if_changed_with_tmp(path, content, dry_run, &tmp)
}

fn write_if_changed_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, InstallError> {
    match read_existing(path)? {
        Some(existing) if existing == content => {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
        _ => {}
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

fn read_existing(path: &Path) -> Result<Option<String>, InstallError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("backhaul.service");
        let result = write_if_changed(&path, "[Unit]\n", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[Unit]\n");
    }

    #[test]
    fn second_write_same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("backhaul.timer");
        write_if_changed(&path, "same", false).unwrap();

        let mtime_1 = fs::metadata(&path).unwrap().modified().unwrap();
        let result = write_if_changed(&path, "same", false).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));

        let mtime_2 = fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(mtime_2, mtime_1, "no-op write must not touch the file");
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("backhaul");
        write_if_changed(&path, "v1", false).unwrap();
        let result = write_if_changed(&path, "v2", false).unwrap();
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn dry_run_does_not_write_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.service");
        let result = write_if_changed(&path, "content", true).unwrap();
        assert!(matches!(result, WriteResult::WouldWrite { .. }));
        assert!(!path.exists(), "dry-run must not create files");
    }

    #[test]
    fn dry_run_reports_unchanged_for_matching_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("same.timer");
        write_if_changed(&path, "content", false).unwrap();
        let result = write_if_changed(&path, "content", true).unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.service");
        write_if_changed(&path, "data", false).unwrap();
        let tmp_path = PathBuf::from(format!("{}.backhaul.tmp", path.display()));
        assert!(!tmp_path.exists(), ".backhaul.tmp must be cleaned up");
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp
            .path()
            .join("etc")
            .join("systemd")
            .join("system")
            .join("backhaul.service");
        write_if_changed(&path, "content", false).unwrap();
        assert!(path.exists());
    }

    #[test]
    #[cfg(unix)]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        use std::os::unix::fs::PermissionsExt;

        let root = TempDir::new().unwrap();
        let readonly_dir = root.path().join("readonly");
        fs::create_dir_all(&readonly_dir).unwrap();

        let path = readonly_dir.join("backhaul.service");
        fs::write(&path, "original").unwrap();

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o555);
        fs::set_permissions(&readonly_dir, perms).unwrap();

        let tmp_dir = TempDir::new().unwrap();
        let tmp_path = tmp_dir.path().join("backhaul.service.backhaul.tmp");

        let err = write_if_changed_with_tmp(&path, "new content", false, &tmp_path)
            .expect_err("rename should fail on readonly dir");
        let _ = err;

        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
        assert!(!tmp_path.exists(), "tmp file should be cleaned up");

        let mut perms = fs::metadata(&readonly_dir).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&readonly_dir, perms).unwrap();
    }
}
