use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::debug;

use crate::flatten::{self, FlattenOptions};
use crate::naming::{self, FileFacts};
use crate::selection::Selection;

pub use crate::naming::DateGranularity;

/// How a selection is split into folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupingPolicy {
    /// One folder named after the common prefix of the selection.
    Default,
    ByDate(DateGranularity),
    ByType,
    ByExtension,
    BySize,
    Alphabetical,
    /// One folder per file: "Folder 1", "Folder 2", ... in selection order.
    Numbered,
    /// Pull files out of the selected directories into the parent.
    Flatten,
}

/// A named subset of the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition {
    /// Groups in creation order.
    Folders(Vec<Group>),
    /// Files to place directly into the parent directory.
    Flat(Vec<PathBuf>),
}

impl Partition {
    pub fn file_count(&self) -> usize {
        match self {
            Partition::Folders(groups) => groups.iter().map(|g| g.files.len()).sum(),
            Partition::Flat(files) => files.len(),
        }
    }
}

impl GroupingPolicy {
    pub fn partition(&self, selection: &Selection, options: &FlattenOptions) -> Partition {
        let files = selection.files();
        let partition = match *self {
            GroupingPolicy::Default => Partition::Folders(vec![Group {
                name: naming::common_prefix(files),
                files: files.to_vec(),
            }]),
            GroupingPolicy::ByDate(granularity) => {
                let facts = FileFacts::collect(files);
                Partition::Folders(keyed(facts.into_iter().map(|f| {
                    (naming::date_key(f.modified, granularity), f.path)
                })))
            }
            GroupingPolicy::ByType => Partition::Folders(keyed(
                files
                    .iter()
                    .map(|p| (naming::type_category(p).to_string(), p.clone())),
            )),
            GroupingPolicy::ByExtension => Partition::Folders(keyed(
                files.iter().map(|p| (naming::extension_key(p), p.clone())),
            )),
            GroupingPolicy::BySize => {
                let facts = FileFacts::collect(files);
                Partition::Folders(keyed(
                    facts
                        .into_iter()
                        .map(|f| (naming::size_key(f.size), f.path)),
                ))
            }
            GroupingPolicy::Alphabetical => Partition::Folders(keyed(
                files.iter().map(|p| (naming::alpha_key(p), p.clone())),
            )),
            GroupingPolicy::Numbered => Partition::Folders(
                files
                    .iter()
                    .enumerate()
                    .map(|(i, p)| Group {
                        name: format!("Folder {}", i + 1),
                        files: vec![p.clone()],
                    })
                    .collect(),
            ),
            GroupingPolicy::Flatten => Partition::Flat(flatten::expand(files, options)),
        };

        if let Partition::Folders(groups) = &partition {
            for group in groups {
                debug!("Group '{}': {} file(s)", group.name, group.files.len());
            }
        }
        partition
    }

    /// Whether a folder already named like a group is merged into instead of
    /// allocating a fresh numbered sibling.
    pub fn reuses_existing_folders(&self) -> bool {
        !matches!(self, GroupingPolicy::Default | GroupingPolicy::Flatten)
    }
}

/// Collect `(key, path)` pairs into groups sorted by key, keeping selection
/// order inside each group.
fn keyed<I>(pairs: I) -> Vec<Group>
where
    I: IntoIterator<Item = (String, PathBuf)>,
{
    let mut map: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for (key, path) in pairs {
        map.entry(key).or_default().push(path);
    }
    map.into_iter()
        .map(|(name, files)| Group { name, files })
        .collect()
}

/// The closed set of organize commands offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    NewFolder,
    ByDay,
    ByMonth,
    ByYear,
    ByMonthYear,
    ByFullDate,
    ByType,
    ByExtension,
    BySize,
    Alphabetical,
    Numbered,
    Flatten,
}

impl CommandId {
    pub const ALL: [CommandId; 12] = [
        CommandId::NewFolder,
        CommandId::ByDay,
        CommandId::ByMonth,
        CommandId::ByYear,
        CommandId::ByMonthYear,
        CommandId::ByFullDate,
        CommandId::ByType,
        CommandId::ByExtension,
        CommandId::BySize,
        CommandId::Alphabetical,
        CommandId::Numbered,
        CommandId::Flatten,
    ];

    pub fn policy(&self) -> GroupingPolicy {
        match self {
            CommandId::NewFolder => GroupingPolicy::Default,
            CommandId::ByDay => GroupingPolicy::ByDate(DateGranularity::Day),
            CommandId::ByMonth => GroupingPolicy::ByDate(DateGranularity::Month),
            CommandId::ByYear => GroupingPolicy::ByDate(DateGranularity::Year),
            CommandId::ByMonthYear => GroupingPolicy::ByDate(DateGranularity::MonthYear),
            CommandId::ByFullDate => GroupingPolicy::ByDate(DateGranularity::FullDate),
            CommandId::ByType => GroupingPolicy::ByType,
            CommandId::ByExtension => GroupingPolicy::ByExtension,
            CommandId::BySize => GroupingPolicy::BySize,
            CommandId::Alphabetical => GroupingPolicy::Alphabetical,
            CommandId::Numbered => GroupingPolicy::Numbered,
            CommandId::Flatten => GroupingPolicy::Flatten,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            CommandId::NewFolder => "newfolderfromfiles",
            CommandId::ByDay => "by-day",
            CommandId::ByMonth => "by-month",
            CommandId::ByYear => "by-year",
            CommandId::ByMonthYear => "by-month-year",
            CommandId::ByFullDate => "by-full-date",
            CommandId::ByType => "by-type",
            CommandId::ByExtension => "by-extension",
            CommandId::BySize => "by-size",
            CommandId::Alphabetical => "alphabetical",
            CommandId::Numbered => "numbered",
            CommandId::Flatten => "flatten",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CommandId::NewFolder => "New folder with selection",
            CommandId::ByDay => "Day",
            CommandId::ByMonth => "Month",
            CommandId::ByYear => "Year",
            CommandId::ByMonthYear => "Month and Year",
            CommandId::ByFullDate => "Full Date",
            CommandId::ByType => "By Type",
            CommandId::ByExtension => "By Extension",
            CommandId::BySize => "By Size",
            CommandId::Alphabetical => "Alphabetically",
            CommandId::Numbered => "Numbered Folders",
            CommandId::Flatten => "Flatten Folders",
        }
    }

    pub fn help_text(&self) -> &'static str {
        match self {
            CommandId::NewFolder => "Create a new folder containing the selected items",
            CommandId::ByDay => "Group the selected items into folders by day of month",
            CommandId::ByMonth => "Group the selected items into folders by month",
            CommandId::ByYear => "Group the selected items into folders by year",
            CommandId::ByMonthYear => "Group the selected items into folders by year and month",
            CommandId::ByFullDate => "Group the selected items into folders by date",
            CommandId::ByType => "Group the selected items into Video, Photo, Audio, Document and Other",
            CommandId::ByExtension => "Group the selected items into folders by file extension",
            CommandId::BySize => "Group the selected items into small, medium and large",
            CommandId::Alphabetical => "Group the selected items into folders by first letter",
            CommandId::Numbered => "Put each selected item into its own numbered folder",
            CommandId::Flatten => "Move the contents of the selected folders into this folder",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl FromStr for CommandId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CommandId::ALL
            .iter()
            .copied()
            .find(|c| c.verb().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let verbs: Vec<&str> = CommandId::ALL.iter().map(|c| c.verb()).collect();
                format!("unknown command '{}', expected one of: {}", s, verbs.join(", "))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Command(CommandId),
    Submenu {
        label: &'static str,
        entries: Vec<MenuEntry>,
    },
}

/// Two-level menu: a root submenu with a nested "By Date" submenu.
pub fn context_menu() -> MenuEntry {
    MenuEntry::Submenu {
        label: "New folder with selection",
        entries: vec![
            MenuEntry::Command(CommandId::NewFolder),
            MenuEntry::Submenu {
                label: "By Date",
                entries: vec![
                    MenuEntry::Command(CommandId::ByDay),
                    MenuEntry::Command(CommandId::ByMonth),
                    MenuEntry::Command(CommandId::ByYear),
                    MenuEntry::Command(CommandId::ByMonthYear),
                    MenuEntry::Command(CommandId::ByFullDate),
                ],
            },
            MenuEntry::Command(CommandId::ByType),
            MenuEntry::Command(CommandId::ByExtension),
            MenuEntry::Command(CommandId::BySize),
            MenuEntry::Command(CommandId::Alphabetical),
            MenuEntry::Command(CommandId::Numbered),
            MenuEntry::Command(CommandId::Flatten),
        ],
    }
}

impl MenuEntry {
    /// Every command reachable from this entry, depth first.
    pub fn commands(&self) -> Vec<CommandId> {
        match self {
            MenuEntry::Command(id) => vec![*id],
            MenuEntry::Submenu { entries, .. } => {
                entries.iter().flat_map(|e| e.commands()).collect()
            }
        }
    }
}
