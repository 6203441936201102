//! Source excerpts shown under a located warning

use std::fs;
use std::path::Path;

use crate::error::{Result, SpellingError};

pub const DEFAULT_CONTEXT_LINES: usize = 5;

/// Produces a short, numbered excerpt of a file around one line
pub trait SnippetSource {
    fn snippet(&self, file_path: &Path, line_no: usize) -> Result<String>;
}

/// Reads the excerpt straight from disk
#[derive(Debug, Clone, Copy)]
pub struct FileSnippets {
    pub context_lines: usize,
}

impl Default for FileSnippets {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl FileSnippets {
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }
}

impl SnippetSource for FileSnippets {
    fn snippet(&self, file_path: &Path, line_no: usize) -> Result<String> {
        let code = fs::read_to_string(file_path).map_err(|source| SpellingError::ReadFile {
            path: file_path.to_path_buf(),
            source,
        })?;
        Ok(format_snippet(&code, line_no, self.context_lines))
    }
}

/// Number every line, mark `line_no` with `>`, and keep `context_lines` on each side
pub fn format_snippet(code: &str, line_no: usize, context_lines: usize) -> String {
    let start = line_no.saturating_sub(context_lines + 1);
    let end = line_no.saturating_add(context_lines);

    code.split('\n')
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .skip(start)
        .take(end.saturating_sub(start))
        .map(|(lno, line)| {
            if lno == line_no {
                format!(">{lno:3} | {line}")
            } else {
                format!("{lno:4} | {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
