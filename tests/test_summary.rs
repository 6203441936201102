use docs_spelling::snippet::FileSnippets;
use docs_spelling::{group_by_category, parse_spelling_warnings, SummaryReporter};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn render(warning_text: &str, docs_dir: &std::path::Path, category: &str) -> String {
    let warnings = parse_spelling_warnings(warning_text, docs_dir);
    let grouped = group_by_category([(category, warnings)]);
    let mut reporter = SummaryReporter::with_snippets(Vec::new(), false, FileSnippets::new(1));
    reporter.display_summary(&grouped).unwrap();
    String::from_utf8(reporter.into_inner()).unwrap()
}

#[test]
fn test_summary_for_real_file() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().canonicalize().unwrap();
    fs::write(docs.join("index.rst"), "Title\n=====\n\nThis is teh page.\nEnd\n").unwrap();

    let output = render("index.rst:4: (teh) the This is teh page.", &docs, "core");

    let expected_error = format!(
        "{dash} Error   1 {dash}\n\
         index.rst:4: (teh) the This is teh page.\n\
         \n\
         File path: {path}\n\
         Incorrect Spelling: 'teh'\n\
         Suggested Spelling: 'the'\n\
         Line with Error: 'This is teh page.'\n\
         Line Number: 4\n   \
         3 | \n\
         >  4 | This is teh page.\n   \
         5 | End\n",
        dash = "-".repeat(30),
        path = docs.join("index.rst").display(),
    );
    assert!(
        output.contains(&expected_error),
        "unexpected summary:\n{output}"
    );
    assert!(output.contains(&format!("{eq}  core  {eq}", eq = "=".repeat(30))));
}

#[test]
fn test_summary_layout() {
    let output = render("", std::path::Path::new("/docs"), "");
    let hashes = "#".repeat(30);

    assert!(output.starts_with(&format!("\n{hashes} Start spelling errors summary {hashes}\n\n")));
    assert!(output.ends_with(&format!("\n\n{hashes} End docs build errors summary {hashes}\n")));
    assert!(output.contains(&format!("{}\n\n\nIf there are spelling errors", "=".repeat(100))));
}

#[test]
fn test_message_only_warning_has_no_details() {
    let output = render("WARNING: something unrelated", std::path::Path::new("/docs"), "");
    assert!(output.contains("WARNING: something unrelated\n\n"));
    assert!(!output.contains("File path:"));
}

#[test]
fn test_warnings_sorted_within_category() {
    let text = "b.rst:1: (foo) foo\na.rst:9: (bar) bar\na.rst:2: (baz) baz";
    let output = render(text, std::path::Path::new("/nowhere"), "pkg");

    let positions: Vec<usize> = ["a.rst:2:", "a.rst:9:", "b.rst:1:"]
        .iter()
        .map(|needle| output.find(needle).unwrap())
        .collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
    assert_eq!(output.matches("Error   3").count(), 1);
}
