/// Trait for reporting organize progress.
///
/// The CLI implements this with indicatif bars. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_plan_complete(&self, _groups: usize, _moves: usize) {}
    fn on_create_start(&self, _folders: usize) {}
    fn on_create_complete(&self, _created: usize, _failed: usize) {}
    fn on_move_start(&self, _total: usize) {}
    fn on_move_progress(&self, _done: usize, _total: usize, _current_path: &str) {}
    fn on_move_complete(&self, _moved: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
