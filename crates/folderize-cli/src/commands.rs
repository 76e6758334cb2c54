use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use folderize_core::CommandId;

#[derive(Debug, Parser)]
#[command(name = "folderize")]
#[command(about = "Gather selected files into new folders, and cycle-center windows", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move the given files into folder(s) chosen by a grouping command
    Organize(OrganizeArgs),
    /// Revert the most recent organize operation
    Undo,
    /// List the organize commands and the menu they appear in
    Commands,
    /// Cycle the foreground window between full, horizontal and vertical centering
    Center,
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Grouping command verb, see `folderize commands`
    #[arg(short, long, default_value = "newfolderfromfiles", value_parser = parse_command)]
    pub by: CommandId,

    /// Only print the planned operations
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Selected files and folders; the parent of the first one is the target directory
    #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,
}

fn parse_command(s: &str) -> Result<CommandId, String> {
    s.parse()
}
