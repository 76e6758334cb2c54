use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Journal error: {0}")]
    Journal(#[from] serde_json::Error),

    #[error("Selection is empty")]
    EmptySelection,

    #[error("Parent directory missing for {0}")]
    MissingParent(PathBuf),

    #[error("Window error: {0}")]
    Window(String),

    #[error("{0} is not supported on this platform")]
    UnsupportedPlatform(&'static str),
}
