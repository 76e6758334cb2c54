use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Performs the file-system side of an organize operation.
///
/// Calls arrive in the order the orchestrator needs them: every folder
/// creation of a plan precedes the moves that target it.
pub trait FileOpExecutor {
    fn create_folder(&mut self, path: &Path) -> io::Result<()>;

    /// Whether a created folder can already be addressed as a move target.
    fn folder_exists(&self, path: &Path) -> bool;

    /// Move `from` to the exact path `to`. Must not overwrite an existing entry.
    fn move_to(&mut self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove_empty_folder(&mut self, path: &Path) -> io::Result<()>;

    /// Move `source` into `folder`, keeping its file name. Returns the new path.
    fn move_into(&mut self, source: &Path, folder: &Path) -> io::Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            io::Error::new(
                ErrorKind::InvalidInput,
                format!("{} has no file name", source.display()),
            )
        })?;
        let destination = folder.join(name);
        self.move_to(source, &destination)?;
        Ok(destination)
    }
}

/// Executor backed by `std::fs`.
#[derive(Debug, Default)]
pub struct FsExecutor;

impl FsExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FileOpExecutor for FsExecutor {
    fn create_folder(&mut self, path: &Path) -> io::Result<()> {
        fs::create_dir(path)?;
        debug!("Created folder {}", path.display());
        Ok(())
    }

    fn folder_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn move_to(&mut self, from: &Path, to: &Path) -> io::Result<()> {
        if to.symlink_metadata().is_ok() {
            return Err(io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }

        match fs::rename(from, to) {
            Ok(()) => {
                trace!("Renamed {} -> {}", from.display(), to.display());
                Ok(())
            }
            Err(rename_err) if is_cross_device(&rename_err) => {
                if !fs::symlink_metadata(from)?.is_file() {
                    return Err(rename_err);
                }
                if let Err(e) = fs::copy(from, to) {
                    let _ = fs::remove_file(to);
                    return Err(e);
                }
                if let Err(e) = fs::remove_file(from) {
                    let _ = fs::remove_file(to);
                    return Err(e);
                }
                trace!("Copied {} -> {} and removed source", from.display(), to.display());
                Ok(())
            }
            Err(rename_err) => Err(rename_err),
        }
    }

    fn remove_empty_folder(&mut self, path: &Path) -> io::Result<()> {
        fs::remove_dir(path)
    }
}

/// `rename` cannot cross volumes; only that failure falls back to copying.
fn is_cross_device(err: &io::Error) -> bool {
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18; // EXDEV
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17; // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    err.raw_os_error() == Some(CROSS_DEVICE)
}
