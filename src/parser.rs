//! Parsing of spelling warnings printed by the documentation build
//!
//! Each warning line looks like:
//!
//! ```text
//! path/to/page.rst:42: (mispeled) misspelled the mispeled word here
//! ```
//!
//! Lines that do not fit the pattern are kept as message-only warnings.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fs;
use std::num::ParseIntError;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SpellingError};
use crate::models::SpellingWarning;

static WARNING_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(.*):(\w*):\s\((\w*)\)\s?(\w*)\s?(.*)").expect("warning pattern is valid")
});

/// Every line boundary Python's `str.splitlines` recognises
static LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new("\r\n|[\n\r\x0b\x0c\x1c\x1d\x1e\u{85}\u{2028}\u{2029}]")
        .expect("line break pattern is valid")
});

/// Parse a blob of warnings into one record per non-empty line.
///
/// Relative paths are resolved against `docs_dir`. This never fails; lines that
/// cannot be parsed degrade to [`SpellingWarning::RawOnly`].
pub fn parse_spelling_warnings(warning_text: &str, docs_dir: &Path) -> Vec<SpellingWarning> {
    LINE_BREAK
        .split(warning_text)
        .filter(|line| !line.is_empty())
        .map(|line| parse_warning_line(line, docs_dir))
        .collect()
}

/// Read `path` and parse its contents with [`parse_spelling_warnings`]
pub fn parse_spelling_warnings_from_file(path: &Path, docs_dir: &Path) -> Result<Vec<SpellingWarning>> {
    let content = fs::read_to_string(path).map_err(|source| SpellingError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_spelling_warnings(&content, docs_dir))
}

fn parse_warning_line(line: &str, docs_dir: &Path) -> SpellingWarning {
    let Some(captures) = WARNING_PATTERN.captures(line) else {
        return SpellingWarning::raw(line);
    };

    match structured_from_captures(&captures, line, docs_dir) {
        Some(Ok(warning)) => warning,
        Some(Err(e)) => {
            debug!("Keeping raw warning, bad line number in {:?}: {}", line, e);
            SpellingWarning::raw(line)
        }
        None => SpellingWarning::raw(line),
    }
}

/// `None` when a group is missing, `Some(Err)` when the line number is not a number
fn structured_from_captures(
    captures: &Captures<'_>,
    line: &str,
    docs_dir: &Path,
) -> Option<std::result::Result<SpellingWarning, ParseIntError>> {
    if captures.len() != 6 {
        return None;
    }
    let path = captures.get(1)?.as_str();
    let line_no = captures.get(2)?.as_str();
    let spelling = captures.get(3)?.as_str();
    let suggestion = captures.get(4)?.as_str();
    let context_line = captures.get(5)?.as_str();

    let line_no = match line_no {
        "" | "None" => None,
        digits => match parse_line_number(digits) {
            Ok(n) => Some(n),
            Err(e) => return Some(Err(e)),
        },
    };

    Some(Ok(SpellingWarning::Structured {
        file_path: docs_dir.join(path),
        line_no,
        spelling: spelling.to_string(),
        suggestion: (!suggestion.is_empty()).then(|| suggestion.to_string()),
        context_line: context_line.to_string(),
        message: line.to_string(),
    }))
}

/// ASCII digits, with single underscores allowed between digits as in `1_000`.
///
/// Non-ASCII digits are rejected.
fn parse_line_number(text: &str) -> std::result::Result<usize, ParseIntError> {
    let underscores_ok = !text.starts_with('_') && !text.ends_with('_') && !text.contains("__");
    if underscores_ok && text.contains('_') {
        text.replace('_', "").parse()
    } else {
        text.parse()
    }
}
