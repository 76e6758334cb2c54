pub mod allocator;
pub mod config;
pub mod error;
pub mod executor;
pub mod flatten;
pub mod journal;
pub mod naming;
pub mod organize;
pub mod platform;
pub mod policy;
pub mod progress;
pub mod selection;
pub mod window;

pub use config::AppConfig;
pub use error::Error;
pub use executor::{FileOpExecutor, FsExecutor};
pub use journal::UndoJournal;
pub use organize::{OrganizePlan, OrganizeReport};
pub use policy::{CommandId, DateGranularity, GroupingPolicy};
pub use progress::{ProgressReporter, SilentReporter};
pub use selection::Selection;
pub use window::{CycleCenterer, CycleOutcome, Rect};
