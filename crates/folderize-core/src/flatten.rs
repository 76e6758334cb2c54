use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::config::AppConfig;

#[derive(Debug, Clone, Default)]
pub struct FlattenOptions {
    pub ignore_patterns: Vec<Pattern>,
    /// Levels below each selected directory to descend. `None` is unlimited.
    pub max_depth: Option<usize>,
}

impl FlattenOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            ignore_patterns,
            max_depth: config.flatten_max_depth,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns.iter().any(|p| {
            p.matches_path(path)
                || path
                    .file_name()
                    .map(|name| p.matches(&name.to_string_lossy()))
                    .unwrap_or(false)
        })
    }
}

/// Expand selected directories into the files beneath them.
///
/// Plain files in `paths` are kept in place. Directories themselves never
/// appear in the output. Unreadable entries are logged and skipped.
pub fn expand(paths: &[PathBuf], options: &FlattenOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            if options.is_ignored(path) {
                debug!("Ignoring {}", path.display());
            } else {
                files.push(path.clone());
            }
            continue;
        }

        let mut walker = WalkDir::new(path).min_depth(1).sort_by_file_name();
        if let Some(depth) = options.max_depth {
            walker = walker.max_depth(depth.max(1));
        }

        let mut iter = walker.into_iter();
        while let Some(entry) = iter.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                    continue;
                }
            };

            if options.is_ignored(entry.path()) {
                debug!("Ignoring {}", entry.path().display());
                if entry.file_type().is_dir() {
                    iter.skip_current_dir();
                }
                continue;
            }

            if !entry.file_type().is_dir() {
                files.push(entry.into_path());
            }
        }
    }

    files
}
