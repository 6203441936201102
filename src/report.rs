//! Rendering of grouped spelling warnings
//!
//! [`SummaryReporter`] prints the human-readable summary shown at the end of a
//! docs build. [`report_json`] and [`report_github`] are the machine-facing
//! alternatives used by the command line tool.

use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{compare, SpellingWarning};
use crate::snippet::{FileSnippets, SnippetSource};

const RED: &str = "\x1b[31m";
const BRIGHT_BLUE: &str = "\x1b[94m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Paths ending with this marker never point at a real file
const UNKNOWN_LOCATION: &str = "<unknown>";

const GENERAL_CATEGORY: &str = "General";

const GUIDANCE: &str = "
If there are spelling errors related to class or function name, make sure
those names are quoted with backticks '`' - this should exclude it from spellcheck process.
If there are spelling errors in the summary above, and the spelling is
correct, add the spelling to docs/spelling_wordlist.txt or use the
spelling directive.
Check https://sphinxcontrib-spelling.readthedocs.io/en/latest/customize.html#private-dictionaries
for more details.

If there are no spelling errors in the summary above, there might be an
issue unrelated to spelling. Please review the traceback.
";

/// Warnings keyed by category. The empty key is the general bucket.
pub type GroupedWarnings = BTreeMap<String, Vec<SpellingWarning>>;

/// Collect `(category, warnings)` pairs, merging repeated categories
pub fn group_by_category<I, K>(groups: I) -> GroupedWarnings
where
    I: IntoIterator<Item = (K, Vec<SpellingWarning>)>,
    K: Into<String>,
{
    let mut grouped = GroupedWarnings::new();
    for (category, warnings) in groups {
        grouped.entry(category.into()).or_default().extend(warnings);
    }
    grouped
}

/// Writes the spelling summary to an owned output sink
pub struct SummaryReporter<W, S = FileSnippets> {
    out: W,
    use_color: bool,
    snippets: S,
}

impl<W: Write> SummaryReporter<W, FileSnippets> {
    pub fn new(out: W, use_color: bool) -> Self {
        Self::with_snippets(out, use_color, FileSnippets::default())
    }
}

impl<W: Write, S: SnippetSource> SummaryReporter<W, S> {
    pub fn with_snippets(out: W, use_color: bool, snippets: S) -> Self {
        Self {
            out,
            use_color,
            snippets,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Print every category in key order, each with its warnings sorted and numbered
    pub fn display_summary(&mut self, spelling_errors: &GroupedWarnings) -> Result<()> {
        writeln!(self.out)?;
        let banner = format!("{} Start spelling errors summary {}", "#".repeat(30), "#".repeat(30));
        let banner = self.paint(RED, &banner);
        writeln!(self.out, "{banner}")?;
        writeln!(self.out)?;

        for (category, errors) in spelling_errors {
            let name = if category.is_empty() {
                GENERAL_CATEGORY
            } else {
                category.as_str()
            };
            let name = self.paint(BRIGHT_BLUE, name);
            writeln!(self.out, "{}  {}  {}", "=".repeat(30), name, "=".repeat(30))?;

            let mut sorted: Vec<&SpellingWarning> = errors.iter().collect();
            sorted.sort_by(|a, b| compare(a, b));

            for (warning_no, error) in sorted.into_iter().enumerate() {
                writeln!(
                    self.out,
                    "{} Error {:3} {}",
                    "-".repeat(30),
                    warning_no + 1,
                    "-".repeat(30)
                )?;
                self.display_error(error)?;
            }
        }

        writeln!(self.out, "{}", "=".repeat(100))?;
        writeln!(self.out)?;
        let guidance = self.paint(GREEN, GUIDANCE);
        writeln!(self.out, "{guidance}")?;
        writeln!(self.out)?;
        let banner = format!("{} End docs build errors summary {}", "#".repeat(30), "#".repeat(30));
        let banner = self.paint(RED, &banner);
        writeln!(self.out, "{banner}")?;
        self.out.flush()?;
        Ok(())
    }

    fn display_error(&mut self, error: &SpellingWarning) -> Result<()> {
        writeln!(self.out, "{}", error.message())?;
        writeln!(self.out)?;

        let Some(file_path) = error.file_path() else {
            return Ok(());
        };
        writeln!(self.out, "File path: {}", resolve(file_path).display())?;

        if let Some(spelling) = error.spelling().filter(|s| !s.is_empty()) {
            let line = self.paint(RED, &format!("Incorrect Spelling: '{spelling}'"));
            writeln!(self.out, "{line}")?;
        }
        if let Some(suggestion) = error.suggestion().filter(|s| !s.is_empty()) {
            writeln!(self.out, "Suggested Spelling: '{suggestion}'")?;
        }
        if let Some(context_line) = error.context_line().filter(|s| !s.is_empty()) {
            writeln!(self.out, "Line with Error: '{context_line}'")?;
        }

        if let Some(line_no) = error.line_no().filter(|n| *n > 0) {
            if has_source(file_path) {
                writeln!(self.out, "Line Number: {line_no}")?;
                let snippet = self.snippets.snippet(file_path, line_no)?;
                writeln!(self.out, "{snippet}")?;
            }
        }
        Ok(())
    }
}

/// Canonical path when the file exists, otherwise the path made absolute against the cwd
fn resolve(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn has_source(path: &Path) -> bool {
    !path.to_string_lossy().ends_with(UNKNOWN_LOCATION) && path.is_file()
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    category: &'a str,
    #[serde(flatten)]
    warning: &'a SpellingWarning,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    warnings: Vec<JsonEntry<'a>>,
    count: usize,
}

/// Pretty JSON object with every warning and its category
pub fn report_json<W: Write>(out: &mut W, spelling_errors: &GroupedWarnings) -> Result<()> {
    let mut entries = Vec::new();
    for (category, errors) in spelling_errors {
        let mut sorted: Vec<&SpellingWarning> = errors.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));
        entries.extend(sorted.into_iter().map(|warning| JsonEntry {
            category: category.as_str(),
            warning,
        }));
    }

    let output = JsonReport {
        count: entries.len(),
        warnings: entries,
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
    Ok(())
}

/// GitHub Actions workflow annotations, one per warning
pub fn report_github<W: Write>(out: &mut W, spelling_errors: &GroupedWarnings) -> Result<()> {
    for errors in spelling_errors.values() {
        let mut sorted: Vec<&SpellingWarning> = errors.iter().collect();
        sorted.sort_by(|a, b| compare(a, b));

        for error in sorted {
            // ::warning file=docs/index.rst,line=3,title=Spelling::message
            match (error.file_path(), error.line_no()) {
                (Some(path), Some(line)) => writeln!(
                    out,
                    "::warning file={},line={},title=Spelling::{}",
                    path.display(),
                    line,
                    error.message()
                )?,
                (Some(path), None) => writeln!(
                    out,
                    "::warning file={},title=Spelling::{}",
                    path.display(),
                    error.message()
                )?,
                (None, _) => writeln!(out, "::warning title=Spelling::{}", error.message())?,
            }
        }
    }
    Ok(())
}
