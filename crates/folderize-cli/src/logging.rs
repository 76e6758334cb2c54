use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/folderize.log";

/// Split `LOG_FILE_PATH` into the directory the appender writes to and the file name.
fn log_target(raw: &str) -> (PathBuf, PathBuf) {
    let path = Path::new(raw);
    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("folderize.log"));
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (directory, file_name)
}

/// Console output goes to stderr so `--dry-run` listings on stdout stay clean.
pub fn init_logger() -> WorkerGuard {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let raw = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (directory, file_name) = log_target(&raw);
    let file_appender = tracing_appender::rolling::never(&directory, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(filter_layer)
        .init();

    debug!(
        "folderize {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        directory.join(&file_name).display()
    );

    guard
}
