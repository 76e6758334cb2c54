use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::executor::FileOpExecutor;
use crate::organize::{FailureKind, MovedFile, OpFailure};

/// Everything needed to revert one organize operation as a single user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoJournal {
    pub parent: PathBuf,
    pub recorded_at: String,
    pub created_folders: Vec<PathBuf>,
    pub moves: Vec<MovedFile>,
}

impl UndoJournal {
    pub fn new(parent: PathBuf, created_folders: Vec<PathBuf>, moves: Vec<MovedFile>) -> Self {
        Self {
            parent,
            recorded_at: Utc::now().to_rfc3339(),
            created_folders,
            moves,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.created_folders.is_empty() && self.moves.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("Undo journal written to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the journal, or remove a stale one at `path` when there is
    /// nothing left to undo.
    pub fn store(&self, path: &Path) -> Result<(), Error> {
        if !self.is_empty() {
            return self.save(path);
        }
        match fs::remove_file(path) {
            Ok(()) => {
                debug!("Removed undo journal {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct UndoReport {
    pub restored: usize,
    pub removed_folders: usize,
    pub failures: Vec<OpFailure>,
    /// The entries that could not be reverted, ready to retry.
    pub remaining: Option<UndoJournal>,
}

impl UndoReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Move every file back where it came from, newest first, then remove the
/// folders the operation created if they are empty.
pub fn undo<E>(journal: &UndoJournal, executor: &mut E) -> UndoReport
where
    E: FileOpExecutor + ?Sized,
{
    let mut report = UndoReport::default();
    let mut pending_moves = Vec::new();
    let mut pending_folders = Vec::new();

    for moved in journal.moves.iter().rev() {
        match executor.move_to(&moved.destination, &moved.source) {
            Ok(()) => {
                debug!(
                    "Restored {} -> {}",
                    moved.destination.display(),
                    moved.source.display()
                );
                report.restored += 1;
            }
            Err(e) => {
                error!("Failed to restore {}: {}", moved.source.display(), e);
                report.failures.push(OpFailure {
                    path: moved.destination.clone(),
                    kind: FailureKind::Restore,
                    reason: e.to_string(),
                });
                pending_moves.push(moved.clone());
            }
        }
    }

    for folder in journal.created_folders.iter().rev() {
        match executor.remove_empty_folder(folder) {
            Ok(()) => report.removed_folders += 1,
            Err(e) => {
                warn!("Keeping folder {}: {}", folder.display(), e);
                report.failures.push(OpFailure {
                    path: folder.clone(),
                    kind: FailureKind::RemoveFolder,
                    reason: e.to_string(),
                });
                pending_folders.push(folder.clone());
            }
        }
    }

    info!(
        "Undo under {}: {} restored, {} folder(s) removed, {} failure(s)",
        journal.parent.display(),
        report.restored,
        report.removed_folders,
        report.failures.len()
    );

    pending_moves.reverse();
    pending_folders.reverse();
    let remaining = UndoJournal {
        parent: journal.parent.clone(),
        recorded_at: journal.recorded_at.clone(),
        created_folders: pending_folders,
        moves: pending_moves,
    };
    report.remaining = Some(remaining).filter(|j| !j.is_empty());
    report
}
