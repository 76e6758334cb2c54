use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Glob patterns skipped while Flatten expands directories.
    pub ignore_patterns: Vec<String>,
    /// Directory descent limit for Flatten. `None` walks the whole tree.
    pub flatten_max_depth: Option<usize>,
    pub visibility_timeout_ms: u64,
    pub visibility_poll_ms: u64,
    pub journal_path: String,
    pub window_state_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            flatten_max_depth: None,
            visibility_timeout_ms: 500,
            visibility_poll_ms: 50,
            journal_path: "folderize_journal.json".to_string(),
            window_state_path: "window_state.json".to_string(),
        }
    }
}

impl AppConfig {
    pub fn visibility_wait(&self) -> VisibilityWait {
        VisibilityWait {
            timeout: Duration::from_millis(self.visibility_timeout_ms),
            poll_interval: Duration::from_millis(self.visibility_poll_ms.max(1)),
        }
    }
}

/// Bounded wait between the create phase and the move phase.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityWait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl VisibilityWait {
    /// No waiting at all: folders not visible on the first probe are treated as failed.
    pub fn immediate() -> Self {
        Self {
            timeout: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("FOLDERIZE"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
