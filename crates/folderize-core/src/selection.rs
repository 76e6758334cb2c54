use std::path::{Path, PathBuf};

use crate::error::Error;

/// Ordered snapshot of the selected paths and the directory they live in.
#[derive(Debug, Clone)]
pub struct Selection {
    files: Vec<PathBuf>,
    parent: PathBuf,
}

impl Selection {
    /// Build a selection whose parent is the directory containing the first path.
    pub fn new(files: Vec<PathBuf>) -> Result<Self, Error> {
        let first = files.first().ok_or(Error::EmptySelection)?;
        let parent = match first.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => return Err(Error::MissingParent(first.clone())),
        };
        Ok(Self { files, parent })
    }

    /// Build a selection with an explicitly supplied parent directory.
    pub fn with_parent(files: Vec<PathBuf>, parent: PathBuf) -> Result<Self, Error> {
        if files.is_empty() {
            return Err(Error::EmptySelection);
        }
        if parent.as_os_str().is_empty() {
            return Err(Error::MissingParent(files[0].clone()));
        }
        Ok(Self { files, parent })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn parent(&self) -> &Path {
        &self.parent
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_from_first_path() {
        let sel = Selection::new(vec![
            PathBuf::from("/data/in/a.txt"),
            PathBuf::from("/data/other/b.txt"),
        ])
        .unwrap();
        assert_eq!(sel.parent(), Path::new("/data/in"));
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert!(matches!(Selection::new(vec![]), Err(Error::EmptySelection)));
        assert!(matches!(
            Selection::with_parent(vec![], PathBuf::from("/data")),
            Err(Error::EmptySelection)
        ));
    }

    #[test]
    fn test_missing_parent_rejected() {
        assert!(matches!(
            Selection::new(vec![PathBuf::from("a.txt")]),
            Err(Error::MissingParent(_))
        ));
        assert!(matches!(
            Selection::new(vec![PathBuf::from("/")]),
            Err(Error::MissingParent(_))
        ));
    }
}
