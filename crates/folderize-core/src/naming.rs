use chrono::{DateTime, Local};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_FOLDER_NAME: &str = "New Folder";
pub const NO_EXTENSION: &str = "No Extension";
pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const UNKNOWN_SIZE: &str = "Unknown Size";
pub const NON_LETTER_BUCKET: &str = "#";

const MIB: u64 = 1024 * 1024;
const SMALL_LIMIT: u64 = MIB;
const MEDIUM_LIMIT: u64 = 100 * MIB;

/// Derive a folder name shared by all `paths`.
///
/// Directory and extension are stripped from each name, the longest
/// case-insensitive common prefix is taken, and trailing spaces, underscores,
/// hyphens and periods are trimmed. A single name is returned as-is.
pub fn common_prefix<P: AsRef<Path>>(paths: &[P]) -> String {
    let names: Vec<String> = paths.iter().map(|p| file_stem(p.as_ref())).collect();

    let first = match names.first() {
        Some(first) => first,
        None => return DEFAULT_FOLDER_NAME.to_string(),
    };

    if names.len() == 1 {
        return first.clone();
    }

    let mut prefix: Vec<char> = first.chars().collect();
    for name in names.iter().skip(1) {
        if prefix.is_empty() {
            break;
        }
        let shared = prefix
            .iter()
            .zip(name.chars())
            .take_while(|(a, b)| chars_eq_ignore_case(**a, *b))
            .count();
        prefix.truncate(shared);
    }

    while let Some(last) = prefix.last() {
        if matches!(last, ' ' | '_' | '-' | '.') {
            prefix.pop();
        } else {
            break;
        }
    }

    if prefix.is_empty() {
        DEFAULT_FOLDER_NAME.to_string()
    } else {
        prefix.into_iter().collect()
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// File name without directory and without its last extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn extension_key(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => ext.to_string_lossy().to_uppercase(),
        _ => NO_EXTENSION.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Video,
    Photo,
    Audio,
    Document,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Video => "Video",
            Category::Photo => "Photo",
            Category::Audio => "Audio",
            Category::Document => "Document",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "3gp", "ts",
];
const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tif", "tiff", "webp", "heic", "heif", "raw", "cr2",
    "nef", "arw", "dng", "svg", "ico",
];
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "aiff", "mid", "midi",
];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "rtf", "odt", "ods", "odp", "xls", "xlsx", "ppt", "pptx",
    "csv", "md", "epub",
];

pub fn type_category(path: &Path) -> Category {
    let ext = match path.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase(),
        None => return Category::Other,
    };
    let ext = ext.as_str();

    if VIDEO_EXTENSIONS.contains(&ext) {
        Category::Video
    } else if PHOTO_EXTENSIONS.contains(&ext) {
        Category::Photo
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        Category::Audio
    } else if DOCUMENT_EXTENSIONS.contains(&ext) {
        Category::Document
    } else {
        Category::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateGranularity {
    Day,
    Month,
    Year,
    MonthYear,
    FullDate,
}

impl DateGranularity {
    pub const ALL: [DateGranularity; 5] = [
        DateGranularity::Day,
        DateGranularity::Month,
        DateGranularity::Year,
        DateGranularity::MonthYear,
        DateGranularity::FullDate,
    ];

    fn format(&self) -> &'static str {
        match self {
            DateGranularity::Day => "%d",
            DateGranularity::Month => "%m",
            DateGranularity::Year => "%Y",
            DateGranularity::MonthYear => "%Y-%m",
            DateGranularity::FullDate => "%Y-%m-%d",
        }
    }
}

pub fn date_key(modified: Option<DateTime<Local>>, granularity: DateGranularity) -> String {
    match modified {
        Some(ts) => ts.format(granularity.format()).to_string(),
        None => UNKNOWN_DATE.to_string(),
    }
}

pub fn size_key(size: Option<u64>) -> String {
    match size {
        Some(len) if len < SMALL_LIMIT => "Small (under 1 MB)".to_string(),
        Some(len) if len < MEDIUM_LIMIT => "Medium (1-100 MB)".to_string(),
        Some(_) => "Large (over 100 MB)".to_string(),
        None => UNKNOWN_SIZE.to_string(),
    }
}

pub fn alpha_key(path: &Path) -> String {
    match file_name(path).chars().next() {
        Some(c) if c.is_alphabetic() => c.to_uppercase().collect(),
        _ => NON_LETTER_BUCKET.to_string(),
    }
}

/// Metadata snapshot used by the date and size policies.
/// Fields are `None` when the metadata could not be read.
#[derive(Debug, Clone)]
pub struct FileFacts {
    pub path: PathBuf,
    pub modified: Option<DateTime<Local>>,
    pub size: Option<u64>,
}

impl FileFacts {
    pub fn read(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(metadata) => {
                let modified = match metadata.modified() {
                    Ok(t) => Some(DateTime::<Local>::from(t)),
                    Err(e) => {
                        warn!("Cannot read modification time of {}: {}", path.display(), e);
                        None
                    }
                };
                FileFacts {
                    path: path.to_path_buf(),
                    modified,
                    size: Some(metadata.len()),
                }
            }
            Err(e) => {
                warn!("Cannot read metadata of {}: {}", path.display(), e);
                FileFacts {
                    path: path.to_path_buf(),
                    modified: None,
                    size: None,
                }
            }
        }
    }

    /// Read metadata for every path in parallel, keeping input order.
    pub fn collect(paths: &[PathBuf]) -> Vec<FileFacts> {
        paths.par_iter().map(|p| FileFacts::read(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_common_prefix_shared_stem() {
        let names = ["Vacation_Photo1.jpg", "Vacation_Photo2.jpg"];
        assert_eq!(common_prefix(&names), "Vacation_Photo");
    }

    #[test]
    fn test_common_prefix_single_name_is_bare_stem() {
        assert_eq!(common_prefix(&["a.jpg"]), "a");
        assert_eq!(common_prefix(&["/some/dir/report.final.pdf"]), "report.final");
    }

    #[test]
    fn test_common_prefix_empty_and_disjoint() {
        let empty: [&str; 0] = [];
        assert_eq!(common_prefix(&empty), DEFAULT_FOLDER_NAME);
        assert_eq!(common_prefix(&["x", "y"]), DEFAULT_FOLDER_NAME);
    }

    #[test]
    fn test_common_prefix_case_insensitive_keeps_first_spelling() {
        assert_eq!(common_prefix(&["Invoice-2023.pdf", "invoice-2024.pdf"]), "Invoice-202");
    }

    #[test]
    fn test_common_prefix_trims_separators() {
        assert_eq!(common_prefix(&["scan - a", "scan - b"]), "scan");
        assert_eq!(common_prefix(&["scan - 01", "scan - 02"]), "scan - 0");
        assert_eq!(common_prefix(&["a_.b", "a_.c"]), "a");
        assert_eq!(common_prefix(&["__1", "__2"]), DEFAULT_FOLDER_NAME);
    }

    #[test]
    fn test_common_prefix_strips_directories() {
        let paths = [
            PathBuf::from("/home/user/pics/IMG_001.png"),
            PathBuf::from("/home/user/pics/IMG_002.png"),
        ];
        assert_eq!(common_prefix(&paths), "IMG_00");
    }

    #[test]
    fn test_extension_key() {
        assert_eq!(extension_key(Path::new("/d/movie.mkv")), "MKV");
        assert_eq!(extension_key(Path::new("/d/Makefile")), NO_EXTENSION);
        assert_eq!(extension_key(Path::new("/d/archive.tar.GZ")), "GZ");
    }

    #[test]
    fn test_type_category() {
        assert_eq!(type_category(Path::new("clip.MP4")), Category::Video);
        assert_eq!(type_category(Path::new("shot.jpeg")), Category::Photo);
        assert_eq!(type_category(Path::new("song.flac")), Category::Audio);
        assert_eq!(type_category(Path::new("notes.docx")), Category::Document);
        assert_eq!(type_category(Path::new("tool.exe")), Category::Other);
        assert_eq!(type_category(Path::new("README")), Category::Other);
    }

    #[test]
    fn test_date_key_granularities() {
        let ts = Local.with_ymd_and_hms(2023, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(date_key(Some(ts), DateGranularity::Day), "15");
        assert_eq!(date_key(Some(ts), DateGranularity::Month), "01");
        assert_eq!(date_key(Some(ts), DateGranularity::Year), "2023");
        assert_eq!(date_key(Some(ts), DateGranularity::MonthYear), "2023-01");
        assert_eq!(date_key(Some(ts), DateGranularity::FullDate), "2023-01-15");
        assert_eq!(date_key(None, DateGranularity::Year), UNKNOWN_DATE);
    }

    #[test]
    fn test_size_key_thresholds() {
        assert_eq!(size_key(Some(500 * 1024)), "Small (under 1 MB)");
        assert_eq!(size_key(Some(MIB)), "Medium (1-100 MB)");
        assert_eq!(size_key(Some(150 * MIB)), "Large (over 100 MB)");
        assert_eq!(size_key(Some(100 * MIB)), "Large (over 100 MB)");
        assert_eq!(size_key(None), UNKNOWN_SIZE);
    }

    #[test]
    fn test_alpha_key() {
        assert_eq!(alpha_key(Path::new("/x/banana.txt")), "B");
        assert_eq!(alpha_key(Path::new("/x/Apple")), "A");
        assert_eq!(alpha_key(Path::new("/x/2024 report.pdf")), NON_LETTER_BUCKET);
        assert_eq!(alpha_key(Path::new("/x/_draft")), NON_LETTER_BUCKET);
        assert_eq!(alpha_key(Path::new("/x/éclair")), "É");
    }

    #[test]
    fn test_file_facts_missing_file() {
        let facts = FileFacts::read(Path::new("/definitely/not/here.bin"));
        assert!(facts.modified.is_none());
        assert!(facts.size.is_none());
        assert_eq!(size_key(facts.size), UNKNOWN_SIZE);
    }
}
