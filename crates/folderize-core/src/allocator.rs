use std::path::{Path, PathBuf};
use tracing::warn;

use crate::naming::DEFAULT_FOLDER_NAME;

/// Highest numbered suffix probed before giving up.
pub const MAX_SUFFIX: u32 = 999;

/// Find a free sibling path for `base_name` under `parent`, probing the file system.
///
/// The probe is a read-only existence check, not a reservation.
pub fn allocate(parent: &Path, base_name: &str) -> PathBuf {
    allocate_with(parent, base_name, path_taken)
}

/// Same as [`allocate`] but with a caller supplied existence probe.
///
/// Tries `base_name`, then `base_name (2)` up to `base_name (999)`. When every
/// candidate is taken the fixed name "New Folder" is returned even if it exists.
pub fn allocate_with<F>(parent: &Path, base_name: &str, is_taken: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let candidate = parent.join(base_name);
    if !is_taken(&candidate) {
        return candidate;
    }

    for i in 2..=MAX_SUFFIX {
        let candidate = parent.join(format!("{} ({})", base_name, i));
        if !is_taken(&candidate) {
            return candidate;
        }
    }

    warn!(
        "No free name for '{}' under {} after {} probes, falling back to '{}'",
        base_name,
        parent.display(),
        MAX_SUFFIX,
        DEFAULT_FOLDER_NAME
    );
    parent.join(DEFAULT_FOLDER_NAME)
}

/// Errors other than "not found" count as taken.
pub(crate) fn path_taken(path: &Path) -> bool {
    path.symlink_metadata().is_ok() || path.try_exists().unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_allocate_absent_returns_base() {
        let tmp = tempdir().unwrap();
        assert_eq!(allocate(tmp.path(), "Photos"), tmp.path().join("Photos"));
    }

    #[test]
    fn test_allocate_existing_appends_suffix() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("Photos")).unwrap();
        assert_eq!(allocate(tmp.path(), "Photos"), tmp.path().join("Photos (2)"));

        fs::write(tmp.path().join("Photos (2)"), b"a file also blocks the name").unwrap();
        assert_eq!(allocate(tmp.path(), "Photos"), tmp.path().join("Photos (3)"));
    }

    #[test]
    fn test_allocate_is_idempotent_without_creation() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("Docs")).unwrap();
        let first = allocate(tmp.path(), "Docs");
        let second = allocate(tmp.path(), "Docs");
        assert_eq!(first, second);
        assert!(!first.exists());
    }

    #[test]
    fn test_allocate_exhaustion_falls_back() {
        let parent = Path::new("/virtual");
        let result = allocate_with(parent, "Busy", |_| true);
        assert_eq!(result, parent.join(DEFAULT_FOLDER_NAME));
    }

    #[test]
    fn test_allocate_with_reserved_set() {
        let parent = Path::new("/virtual");
        let taken: HashSet<PathBuf> = [parent.join("A"), parent.join("A (2)")]
            .into_iter()
            .collect();
        let result = allocate_with(parent, "A", |p| taken.contains(p));
        assert_eq!(result, parent.join("A (3)"));
    }
}
