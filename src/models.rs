use serde::Serialize;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// A spelling warning reported by the documentation build.
///
/// A line that matched the warning pattern carries its full position; any other
/// line keeps only the original text.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpellingWarning {
    Structured {
        file_path: PathBuf,
        line_no: Option<usize>,
        spelling: String,
        suggestion: Option<String>,
        context_line: String,
        message: String,
    },
    RawOnly {
        message: String,
    },
}

/// Fields that take part in equality. The suggestion is left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EqualityKey<'a> {
    pub file_path: Option<&'a Path>,
    pub line_no: Option<usize>,
    pub spelling: Option<&'a str>,
    pub context_line: Option<&'a str>,
    pub message: &'a str,
}

impl SpellingWarning {
    pub fn raw(message: impl Into<String>) -> Self {
        Self::RawOnly {
            message: message.into(),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::Structured { file_path, .. } => Some(file_path),
            Self::RawOnly { .. } => None,
        }
    }

    pub fn line_no(&self) -> Option<usize> {
        match self {
            Self::Structured { line_no, .. } => *line_no,
            Self::RawOnly { .. } => None,
        }
    }

    pub fn spelling(&self) -> Option<&str> {
        match self {
            Self::Structured { spelling, .. } => Some(spelling),
            Self::RawOnly { .. } => None,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Structured { suggestion, .. } => suggestion.as_deref(),
            Self::RawOnly { .. } => None,
        }
    }

    pub fn context_line(&self) -> Option<&str> {
        match self {
            Self::Structured { context_line, .. } => Some(context_line),
            Self::RawOnly { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Structured { message, .. } | Self::RawOnly { message } => message,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }

    pub fn equality_key(&self) -> EqualityKey<'_> {
        EqualityKey {
            file_path: self.file_path(),
            line_no: self.line_no(),
            spelling: self.spelling(),
            context_line: self.context_line(),
            message: self.message(),
        }
    }

    /// Two warnings are the same finding when everything but the suggestion matches
    pub fn same_finding(&self, other: &Self) -> bool {
        self.equality_key() == other.equality_key()
    }
}

/// Total order used for the summary: path, line, context, spelling, message.
///
/// Missing paths sort as `/`, missing line numbers as zero and missing text as "".
pub fn compare(a: &SpellingWarning, b: &SpellingWarning) -> Ordering {
    let root = Path::new("/");
    let path_a = a.file_path().unwrap_or(root);
    let path_b = b.file_path().unwrap_or(root);

    path_a
        .cmp(path_b)
        .then_with(|| a.line_no().unwrap_or(0).cmp(&b.line_no().unwrap_or(0)))
        .then_with(|| {
            a.context_line()
                .unwrap_or("")
                .cmp(b.context_line().unwrap_or(""))
        })
        .then_with(|| a.spelling().unwrap_or("").cmp(b.spelling().unwrap_or("")))
        .then_with(|| a.message().cmp(b.message()))
}

/// Sort warnings in place using [`compare`]
pub fn sort_warnings(warnings: &mut [SpellingWarning]) {
    warnings.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structured(path: &str, line_no: Option<usize>, spelling: &str, context: &str) -> SpellingWarning {
        SpellingWarning::Structured {
            file_path: PathBuf::from(path),
            line_no,
            spelling: spelling.to_string(),
            suggestion: None,
            context_line: context.to_string(),
            message: format!("{path}:{}: ({spelling}) {context}", line_no.unwrap_or(0)),
        }
    }

    #[test]
    fn test_path_dominates_ordering() {
        let a = structured("/docs/a.rst", Some(99), "zzz", "zzz");
        let b = structured("/docs/b.rst", Some(1), "aaa", "aaa");
        assert_eq!(compare(&a, &b), Ordering::Less);
        assert_eq!(compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_raw_only_sorts_as_root_path() {
        let raw = SpellingWarning::raw("zzz something broke");
        let located = structured("/docs/a.rst", Some(1), "teh", "teh cat");
        assert_eq!(compare(&raw, &located), Ordering::Less);
    }

    #[test]
    fn test_missing_line_sorts_as_zero() {
        let unknown = structured("/docs/a.rst", None, "b", "b");
        let first = structured("/docs/a.rst", Some(1), "a", "a");
        assert_eq!(compare(&unknown, &first), Ordering::Less);
    }

    #[test]
    fn test_context_before_spelling() {
        let a = structured("/docs/a.rst", Some(3), "zzz", "alpha");
        let b = structured("/docs/a.rst", Some(3), "aaa", "beta");
        assert_eq!(compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_suggestion_excluded_from_equality() {
        let a = structured("/docs/a.rst", Some(3), "teh", "teh cat");
        let mut b = a.clone();
        if let SpellingWarning::Structured { suggestion, .. } = &mut b {
            *suggestion = Some("the".to_string());
        }
        assert!(a.same_finding(&b));
        assert_eq!(compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn test_raw_only_accessors_are_empty() {
        let raw = SpellingWarning::raw("oops");
        assert!(!raw.is_structured());
        assert_eq!(raw.file_path(), None);
        assert_eq!(raw.line_no(), None);
        assert_eq!(raw.spelling(), None);
        assert_eq!(raw.suggestion(), None);
        assert_eq!(raw.context_line(), None);
        assert_eq!(raw.message(), "oops");
    }
}
