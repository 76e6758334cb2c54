use folderize_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Create phase: spinner
/// - Move phase: progress bar (total known from the plan)
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_plan_complete(&self, groups: usize, moves: usize) {
        eprintln!(
            "  \x1b[32m✓\x1b[0m Plan: {} folder group(s), {} move(s)",
            groups, moves
        );
    }

    fn on_create_start(&self, folders: usize) {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_chars(TICK_CHARS));
        }
        pb.set_message(format!("Creating {} folder(s)...", folders));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_create_complete(&self, created: usize, failed: usize) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Folders: {} created, {} failed",
            created, failed
        );
    }

    fn on_move_start(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(
            "  {spinner:.cyan} Moving [{bar:30.cyan/dim}] {pos}/{len} {wide_msg}",
        ) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICK_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_move_progress(&self, done: usize, _total: usize, current_path: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(done as u64);
                pb.set_message(current_path.to_string());
            }
        }
    }

    fn on_move_complete(&self, moved: usize, failed: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Moves: {} done, {} failed in {:.2}s",
            moved, failed, duration_secs
        );
    }
}
