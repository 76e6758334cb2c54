use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::allocator::{self, path_taken};
use crate::config::VisibilityWait;
use crate::error::Error;
use crate::executor::FileOpExecutor;
use crate::flatten::FlattenOptions;
use crate::journal::UndoJournal;
use crate::policy::{GroupingPolicy, Partition};
use crate::progress::ProgressReporter;
use crate::selection::Selection;

/// What has to happen to an intent's target folder before files move into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderAction {
    /// Newly allocated, must be created.
    Create,
    /// A folder with the group's exact name already exists; merge into it.
    Reuse,
    /// The parent directory itself (Flatten).
    InPlace,
}

/// One target folder and the files destined for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeIntent {
    pub folder_name: String,
    pub folder: PathBuf,
    pub action: FolderAction,
    pub moves: Vec<PathBuf>,
}

/// A single ordered operation, as submitted to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    CreateFolder(PathBuf),
    Move { source: PathBuf, folder: PathBuf },
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOp::CreateFolder(path) => write!(f, "mkdir {}", path.display()),
            FileOp::Move { source, folder } => {
                write!(f, "move  {} -> {}", source.display(), folder.display())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrganizePlan {
    pub parent: PathBuf,
    pub policy: GroupingPolicy,
    pub intents: Vec<OrganizeIntent>,
    /// Selected paths left where they are.
    pub skipped: Vec<PathBuf>,
}

impl OrganizePlan {
    pub fn folders_to_create(&self) -> impl Iterator<Item = &Path> {
        self.intents
            .iter()
            .filter(|i| i.action == FolderAction::Create)
            .map(|i| i.folder.as_path())
    }

    pub fn move_count(&self) -> usize {
        self.intents.iter().map(|i| i.moves.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.move_count() == 0
    }

    /// All folder creations first, then every move, in intent order.
    pub fn operations(&self) -> Vec<FileOp> {
        let creates = self
            .folders_to_create()
            .map(|p| FileOp::CreateFolder(p.to_path_buf()));
        let moves = self.intents.iter().flat_map(|intent| {
            intent.moves.iter().map(move |source| FileOp::Move {
                source: source.clone(),
                folder: intent.folder.clone(),
            })
        });
        creates.chain(moves).collect()
    }
}

/// Turn a selection into ordered intents for `policy`.
///
/// Fails only on preconditions; nothing on disk is touched besides existence probes.
pub fn plan(
    selection: &Selection,
    policy: GroupingPolicy,
    options: &FlattenOptions,
) -> Result<OrganizePlan, Error> {
    let parent = selection.parent();
    if !parent.is_dir() {
        return Err(Error::MissingParent(parent.to_path_buf()));
    }

    let mut intents = Vec::new();
    match policy.partition(selection, options) {
        Partition::Folders(groups) => {
            let mut claimed: HashSet<PathBuf> = HashSet::new();
            for group in groups {
                let literal = parent.join(&group.name);
                let (folder, action) = if policy.reuses_existing_folders() && literal.is_dir() {
                    debug!("Reusing existing folder {}", literal.display());
                    (literal, FolderAction::Reuse)
                } else {
                    let folder = allocator::allocate_with(parent, &group.name, |p| {
                        claimed.contains(p) || path_taken(p)
                    });
                    (folder, FolderAction::Create)
                };
                claimed.insert(folder.clone());

                let folder_name = folder
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| group.name.clone());
                intents.push(OrganizeIntent {
                    folder_name,
                    folder,
                    action,
                    moves: group.files,
                });
            }
        }
        Partition::Flat(files) => {
            intents.push(OrganizeIntent {
                folder_name: String::new(),
                folder: parent.to_path_buf(),
                action: FolderAction::InPlace,
                moves: files,
            });
        }
    }

    // A selected entry that is itself a target folder stays put.
    let targets: HashSet<PathBuf> = intents.iter().map(|i| i.folder.clone()).collect();
    let mut skipped = Vec::new();
    for intent in intents.iter_mut() {
        let folder = intent.folder.clone();
        intent.moves.retain(|source| {
            let keep = !targets.contains(source) && source.parent() != Some(folder.as_path());
            if !keep {
                debug!("Leaving {} in place", source.display());
                skipped.push(source.clone());
            }
            keep
        });
    }
    intents.retain(|intent| {
        let empty = intent.action == FolderAction::Create && intent.moves.is_empty();
        if empty {
            debug!("Dropping empty group {}", intent.folder_name);
        }
        !empty
    });

    let plan = OrganizePlan {
        parent: parent.to_path_buf(),
        policy,
        intents,
        skipped,
    };
    info!(
        "Planned {:?}: {} folder(s) to create, {} move(s), {} left in place",
        policy,
        plan.folders_to_create().count(),
        plan.move_count(),
        plan.skipped.len()
    );
    Ok(plan)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Create,
    NotVisible,
    /// The target folder was not available, so the move was never attempted.
    Blocked,
    Move,
    Restore,
    RemoveFolder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Default)]
pub struct OrganizeReport {
    pub created: Vec<PathBuf>,
    pub moved: Vec<MovedFile>,
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<OpFailure>,
    pub duration: Duration,
}

impl OrganizeReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn journal(&self, parent: &Path) -> UndoJournal {
        UndoJournal::new(parent.to_path_buf(), self.created.clone(), self.moved.clone())
    }
}

/// Run a plan: create folders, wait for them to become visible, then move.
///
/// Per-item failures are collected in the report. A folder that could not be
/// created blocks only the moves aimed at it.
pub fn execute<E>(
    plan: &OrganizePlan,
    executor: &mut E,
    wait: VisibilityWait,
    reporter: &dyn ProgressReporter,
) -> OrganizeReport
where
    E: FileOpExecutor + ?Sized,
{
    let start = Instant::now();
    let mut report = OrganizeReport {
        skipped: plan.skipped.clone(),
        ..OrganizeReport::default()
    };

    reporter.on_plan_complete(plan.intents.len(), plan.move_count());
    if plan.is_empty() {
        info!("Nothing to move under {}", plan.parent.display());
        report.duration = start.elapsed();
        return report;
    }

    // Phase 1: create
    let to_create: Vec<&Path> = plan.folders_to_create().collect();
    reporter.on_create_start(to_create.len());
    let mut unavailable: HashSet<PathBuf> = HashSet::new();
    for folder in &to_create {
        match executor.create_folder(folder) {
            Ok(()) => report.created.push(folder.to_path_buf()),
            Err(e) => {
                error!("Failed to create folder {}: {}", folder.display(), e);
                unavailable.insert(folder.to_path_buf());
                report.failures.push(OpFailure {
                    path: folder.to_path_buf(),
                    kind: FailureKind::Create,
                    reason: e.to_string(),
                });
            }
        }
    }

    // Phase 2: wait until the new folders can be addressed
    for folder in wait_for_folders(executor, &report.created, wait) {
        warn!(
            "Folder {} not visible after {} ms",
            folder.display(),
            wait.timeout.as_millis()
        );
        report.failures.push(OpFailure {
            path: folder.clone(),
            kind: FailureKind::NotVisible,
            reason: format!("not visible after {} ms", wait.timeout.as_millis()),
        });
        unavailable.insert(folder);
    }
    reporter.on_create_complete(
        report.created.len(),
        to_create.len() - report.created.len(),
    );

    // Phase 3: move
    let total = plan.move_count();
    let mut done = 0usize;
    let mut failed = 0usize;
    reporter.on_move_start(total);
    for intent in &plan.intents {
        let blocked = unavailable.contains(&intent.folder);
        for source in &intent.moves {
            done += 1;
            if blocked {
                failed += 1;
                report.failures.push(OpFailure {
                    path: source.clone(),
                    kind: FailureKind::Blocked,
                    reason: format!("target folder {} unavailable", intent.folder.display()),
                });
                reporter.on_move_progress(done, total, &source.to_string_lossy());
                continue;
            }

            match executor.move_into(source, &intent.folder) {
                Ok(destination) => {
                    debug!("Moved {} -> {}", source.display(), destination.display());
                    report.moved.push(MovedFile {
                        source: source.clone(),
                        destination,
                    });
                }
                Err(e) => {
                    failed += 1;
                    error!(
                        "Failed to move {} into {}: {}",
                        source.display(),
                        intent.folder.display(),
                        e
                    );
                    report.failures.push(OpFailure {
                        path: source.clone(),
                        kind: FailureKind::Move,
                        reason: e.to_string(),
                    });
                }
            }
            reporter.on_move_progress(done, total, &source.to_string_lossy());
        }
    }

    report.duration = start.elapsed();
    reporter.on_move_complete(report.moved.len(), failed, report.duration.as_secs_f64());
    info!(
        "Organized {}: {} folder(s) created, {} moved, {} failure(s) in {:.2}s",
        plan.parent.display(),
        report.created.len(),
        report.moved.len(),
        report.failures.len(),
        report.duration.as_secs_f64()
    );
    report
}

/// Poll until every folder exists or the timeout passes. Returns the stragglers.
fn wait_for_folders<E>(executor: &E, folders: &[PathBuf], wait: VisibilityWait) -> Vec<PathBuf>
where
    E: FileOpExecutor + ?Sized,
{
    let start = Instant::now();
    let mut pending: Vec<PathBuf> = folders.to_vec();
    loop {
        pending.retain(|folder| !executor.folder_exists(folder));
        if pending.is_empty() || start.elapsed() >= wait.timeout {
            return pending;
        }
        thread::sleep(wait.poll_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;

    use crate::progress::SilentReporter;

    /// Records calls and fails on request, without touching the disk.
    #[derive(Default)]
    struct ScriptedExecutor {
        fail_create: HashSet<PathBuf>,
        fail_move: HashSet<PathBuf>,
        invisible: HashSet<PathBuf>,
        folders: HashSet<PathBuf>,
        log: Vec<FileOp>,
        entries: HashMap<PathBuf, PathBuf>,
    }

    impl FileOpExecutor for ScriptedExecutor {
        fn create_folder(&mut self, path: &Path) -> io::Result<()> {
            if self.fail_create.contains(path) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            self.log.push(FileOp::CreateFolder(path.to_path_buf()));
            self.folders.insert(path.to_path_buf());
            Ok(())
        }

        fn folder_exists(&self, path: &Path) -> bool {
            self.folders.contains(path) && !self.invisible.contains(path)
        }

        fn move_to(&mut self, from: &Path, to: &Path) -> io::Result<()> {
            if self.fail_move.contains(from) {
                return Err(io::Error::new(io::ErrorKind::NotFound, "vanished"));
            }
            self.log.push(FileOp::Move {
                source: from.to_path_buf(),
                folder: to.parent().unwrap().to_path_buf(),
            });
            self.entries.insert(to.to_path_buf(), from.to_path_buf());
            Ok(())
        }

        fn remove_empty_folder(&mut self, path: &Path) -> io::Result<()> {
            self.folders.remove(path);
            Ok(())
        }
    }

    fn plan_for(groups: Vec<(&str, FolderAction, Vec<&str>)>) -> OrganizePlan {
        OrganizePlan {
            parent: PathBuf::from("/p"),
            policy: GroupingPolicy::ByExtension,
            intents: groups
                .into_iter()
                .map(|(name, action, files)| OrganizeIntent {
                    folder_name: name.to_string(),
                    folder: PathBuf::from("/p").join(name),
                    action,
                    moves: files.into_iter().map(PathBuf::from).collect(),
                })
                .collect(),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_operations_put_creates_first() {
        let plan = plan_for(vec![
            ("JPG", FolderAction::Create, vec!["/p/a.jpg"]),
            ("TXT", FolderAction::Reuse, vec!["/p/b.txt"]),
            ("PNG", FolderAction::Create, vec!["/p/c.png"]),
        ]);
        let ops = plan.operations();
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[0], FileOp::CreateFolder(PathBuf::from("/p/JPG")));
        assert_eq!(ops[1], FileOp::CreateFolder(PathBuf::from("/p/PNG")));
        assert!(ops[2..].iter().all(|op| matches!(op, FileOp::Move { .. })));
    }

    #[test]
    fn test_execute_submits_creates_before_moves() {
        let plan = plan_for(vec![
            ("A", FolderAction::Create, vec!["/p/a1", "/p/a2"]),
            ("B", FolderAction::Create, vec!["/p/b1"]),
        ]);
        let mut exec = ScriptedExecutor::default();
        let report = execute(&plan, &mut exec, VisibilityWait::immediate(), &SilentReporter);

        assert!(report.is_success());
        assert_eq!(exec.log, plan.operations());
        assert_eq!(report.moved.len(), 3);
        assert_eq!(report.moved[0].destination, PathBuf::from("/p/A/a1"));
    }

    #[test]
    fn test_create_failure_blocks_only_its_group() {
        let plan = plan_for(vec![
            ("A", FolderAction::Create, vec!["/p/a1"]),
            ("B", FolderAction::Create, vec!["/p/b1", "/p/b2"]),
        ]);
        let mut exec = ScriptedExecutor::default();
        exec.fail_create.insert(PathBuf::from("/p/A"));
        let report = execute(&plan, &mut exec, VisibilityWait::immediate(), &SilentReporter);

        assert_eq!(report.created, vec![PathBuf::from("/p/B")]);
        assert_eq!(report.moved.len(), 2);
        let kinds: Vec<FailureKind> = report.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FailureKind::Create, FailureKind::Blocked]);
        assert_eq!(report.failures[1].path, PathBuf::from("/p/a1"));
    }

    #[test]
    fn test_invisible_folder_blocks_its_moves() {
        let plan = plan_for(vec![
            ("A", FolderAction::Create, vec!["/p/a1"]),
            ("B", FolderAction::Reuse, vec!["/p/b1"]),
        ]);
        let mut exec = ScriptedExecutor::default();
        exec.invisible.insert(PathBuf::from("/p/A"));
        let wait = VisibilityWait {
            timeout: Duration::from_millis(20),
            poll_interval: Duration::from_millis(5),
        };
        let report = execute(&plan, &mut exec, wait, &SilentReporter);

        let kinds: Vec<FailureKind> = report.failures.iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![FailureKind::NotVisible, FailureKind::Blocked]);
        assert_eq!(report.moved.len(), 1);
        assert_eq!(report.moved[0].source, PathBuf::from("/p/b1"));
    }

    #[test]
    fn test_move_failure_does_not_stop_siblings() {
        let plan = plan_for(vec![("A", FolderAction::Create, vec!["/p/1", "/p/2", "/p/3"])]);
        let mut exec = ScriptedExecutor::default();
        exec.fail_move.insert(PathBuf::from("/p/2"));
        let report = execute(&plan, &mut exec, VisibilityWait::immediate(), &SilentReporter);

        assert!(!report.is_success());
        assert_eq!(report.moved.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Move);
    }

    #[test]
    fn test_empty_plan_is_a_successful_no_op() {
        let plan = plan_for(vec![("", FolderAction::InPlace, vec![])]);
        let mut exec = ScriptedExecutor::default();
        let report = execute(&plan, &mut exec, VisibilityWait::immediate(), &SilentReporter);
        assert!(report.is_success());
        assert!(exec.log.is_empty());
    }
}
