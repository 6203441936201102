#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cognitive_complexity)]
#![warn(clippy::too_many_lines)]
#![warn(clippy::too_many_arguments)]
// Allow some common patterns that are fine in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod models;
pub mod operator;
pub mod parser;
pub mod report;
pub mod snippet;

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub use error::{Result, SpellingError};
pub use models::{compare, SpellingWarning};
pub use parser::{parse_spelling_warnings, parse_spelling_warnings_from_file};
pub use report::{group_by_category, GroupedWarnings, SummaryReporter};

/// Options for collecting warnings from files and directories
#[derive(Clone, Debug)]
pub struct CollectOptions {
    pub docs_dir: PathBuf,
    pub extensions: Vec<String>,
    pub skip_patterns: Vec<String>,
    /// Put every warning under this category instead of deriving one from the path
    pub category: Option<String>,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("."),
            extensions: vec!["spelling".to_string(), "txt".to_string()],
            skip_patterns: vec![],
            category: None,
        }
    }
}

/// Result of collecting warnings
pub struct CollectResult {
    pub warnings: GroupedWarnings,
    pub files_read: usize,
    pub files_with_errors: usize,
}

impl CollectResult {
    pub fn total_warnings(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }
}

/// Find all warning files in a directory
pub fn find_warning_files(path: &Path, extensions: &[String], skip_patterns: &[String]) -> Vec<PathBuf> {
    use walkdir::{DirEntry, WalkDir};

    // Only the part below `path` is matched, so a pattern never excludes the input itself
    let is_excluded = |entry: &DirEntry| -> bool {
        let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
        let path_str = relative.to_str().unwrap_or("");

        for component in relative.components() {
            if let Some(name) = component.as_os_str().to_str() {
                if skip_patterns
                    .iter()
                    .any(|pattern| name == pattern || path_str.contains(pattern.as_str()))
                {
                    return true;
                }
            }
        }
        false
    };

    let walker = WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(e));

    let mut files = Vec::new();
    for entry in walker.filter_map(std::result::Result::ok) {
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext));

        if path.is_file() && matches_extension {
            files.push(path.to_path_buf());
        }
    }

    files
}

/// Category of a warning file found under `root`: its parent directory relative to `root`
pub fn category_for(file: &Path, root: &Path) -> String {
    file.strip_prefix(root)
        .ok()
        .and_then(Path::parent)
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

/// Parse every warning file under `paths` and group the warnings by category.
///
/// Unreadable files are counted in `files_with_errors` and skipped.
pub fn collect_warnings(paths: &[PathBuf], options: &CollectOptions) -> CollectResult {
    let mut groups = Vec::new();
    let mut files_read = 0;
    let mut files_with_errors = 0;

    for path in paths {
        let (files, root) = if path.is_dir() {
            (
                find_warning_files(path, &options.extensions, &options.skip_patterns),
                Some(path.as_path()),
            )
        } else {
            (vec![path.clone()], None)
        };
        debug!("Found {} warning files in {}", files.len(), path.display());

        for file in files {
            match parse_spelling_warnings_from_file(&file, &options.docs_dir) {
                Ok(warnings) => {
                    files_read += 1;
                    if warnings.is_empty() {
                        continue;
                    }
                    let category = match (&options.category, root) {
                        (Some(category), _) => category.clone(),
                        (None, Some(root)) => category_for(&file, root),
                        (None, None) => String::new(),
                    };
                    groups.push((category, warnings));
                }
                Err(e) => {
                    warn!("{}", e);
                    files_with_errors += 1;
                }
            }
        }
    }

    CollectResult {
        warnings: group_by_category(groups),
        files_read,
        files_with_errors,
    }
}
