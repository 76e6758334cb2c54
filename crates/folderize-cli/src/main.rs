mod commands;
mod logging;
mod progress;

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands, OrganizeArgs};
use dotenv::dotenv;
use folderize_core::flatten::FlattenOptions;
use folderize_core::policy::{context_menu, MenuEntry};
use folderize_core::window::FileStore;
use folderize_core::{
    journal, organize, platform, AppConfig, CycleCenterer, CycleOutcome, FsExecutor, Selection,
    UndoJournal,
};
use progress::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match folderize_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::Organize(organize_args)) => run_organize(&config, organize_args),
        Some(Commands::Undo) => run_undo(&config),
        Some(Commands::Commands) => {
            print_menu(&context_menu(), 0);
            Ok(())
        }
        Some(Commands::Center) => run_center(&config),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        process::exit(1);
    }
}

fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()
            .context("cannot resolve the current directory")?
            .join(path))
    }
}

fn run_organize(config: &AppConfig, args: OrganizeArgs) -> anyhow::Result<()> {
    let files = args
        .paths
        .iter()
        .map(|p| absolute(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let selection = Selection::new(files)?;
    let policy = args.by.policy();
    info!(
        "{} item(s) in {} with '{}'",
        selection.len(),
        selection.parent().display(),
        args.by.label()
    );

    let plan = organize::plan(&selection, policy, &FlattenOptions::from_config(config))?;

    if args.dry_run {
        for op in plan.operations() {
            println!("{}", op);
        }
        for path in &plan.skipped {
            println!("{}  {}", "keep".dimmed(), path.display());
        }
        return Ok(());
    }

    let reporter = CliReporter::new();
    let report = organize::execute(
        &plan,
        &mut FsExecutor::new(),
        config.visibility_wait(),
        &reporter,
    );

    let journal_path = Path::new(&config.journal_path);
    if let Err(e) = report.journal(&plan.parent).store(journal_path) {
        warn!("Could not update undo journal {}: {}", journal_path.display(), e);
    }

    info!(
        "{} folder(s) created, {} moved, {} left in place, {} failed",
        format!("{}", report.created.len()).green(),
        format!("{}", report.moved.len()).green(),
        format!("{}", report.skipped.len()).cyan(),
        format!("{}", report.failures.len()).red(),
    );
    for failure in &report.failures {
        eprintln!(
            "  {} {:?} {}: {}",
            "✗".red(),
            failure.kind,
            failure.path.display(),
            failure.reason
        );
    }

    if !report.is_success() {
        bail!("{} operation(s) failed", report.failures.len());
    }
    Ok(())
}

fn run_undo(config: &AppConfig) -> anyhow::Result<()> {
    let journal_path = Path::new(&config.journal_path);
    let journal = UndoJournal::load(journal_path)
        .with_context(|| format!("no undo journal at {}", journal_path.display()))?;

    let report = journal::undo(&journal, &mut FsExecutor::new());
    info!(
        "{} restored, {} folder(s) removed, {} failed",
        format!("{}", report.restored).green(),
        format!("{}", report.removed_folders).green(),
        format!("{}", report.failures.len()).red(),
    );
    for failure in &report.failures {
        eprintln!(
            "  {} {:?} {}: {}",
            "✗".red(),
            failure.kind,
            failure.path.display(),
            failure.reason
        );
    }

    let remaining = report
        .remaining
        .unwrap_or_else(|| UndoJournal::new(journal.parent.clone(), Vec::new(), Vec::new()));
    remaining
        .store(journal_path)
        .with_context(|| format!("cannot update {}", journal_path.display()))?;

    if !report.failures.is_empty() {
        bail!(
            "undo finished with {} failure(s); run undo again to retry them",
            report.failures.len()
        );
    }
    Ok(())
}

fn run_center(config: &AppConfig) -> anyhow::Result<()> {
    let id = platform::foreground_window()?;
    let accessor = platform::native_accessor()?;
    let store = FileStore::open(Path::new(&config.window_state_path));
    let centerer = CycleCenterer::new(store);

    match centerer.cycle(id, &*accessor)? {
        CycleOutcome::Maximized => info!("Window is maximized, nothing to do"),
        CycleOutcome::Moved { mode, rect } => {
            info!("{:?} centering applied at {}", mode, rect)
        }
    }

    centerer.store().save()?;
    Ok(())
}

fn print_menu(entry: &MenuEntry, depth: usize) {
    let indent = "  ".repeat(depth);
    match entry {
        MenuEntry::Command(id) => println!(
            "{}{:<28} {:<20} {}",
            indent,
            id.label(),
            id.verb().cyan(),
            id.help_text().dimmed()
        ),
        MenuEntry::Submenu { label, entries } => {
            println!("{}{}", indent, label.bold());
            for child in entries {
                print_menu(child, depth + 1);
            }
        }
    }
}
