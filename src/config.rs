//! Configuration loading for docs-spelling
//!
//! Loads configuration from pyproject.toml [tool.docs-spelling] section

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, SpellingError};
use crate::snippet::DEFAULT_CONTEXT_LINES;

const SECTION: &str = "docs-spelling";

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory warning paths are relative to
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,

    /// Lines shown above and below a misspelling
    #[serde(default)]
    pub context_lines: Option<usize>,

    #[serde(default)]
    pub color: Option<bool>,

    /// File extensions collected when an input path is a directory
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Effective settings after merging defaults, config file and command line
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub docs_dir: PathBuf,
    pub context_lines: usize,
    pub color: bool,
    pub extensions: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("."),
            context_lines: DEFAULT_CONTEXT_LINES,
            color: true,
            extensions: default_extensions(),
            exclude: vec![],
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["spelling".to_string(), "txt".to_string()]
}

/// Command line values that override the config file
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub docs_dir: Option<PathBuf>,
    pub context_lines: Option<usize>,
    pub no_color: bool,
    pub exclude: Vec<String>,
}

/// Find pyproject.toml with [tool.docs-spelling] section, walking up from `start_path`
pub fn find_config_pyproject_toml(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?
    } else {
        start_path
    };

    loop {
        let pyproject = current.join("pyproject.toml");
        if pyproject.exists() {
            if let Ok(content) = std::fs::read_to_string(&pyproject) {
                if let Ok(value) = toml::from_str::<toml::Value>(&content) {
                    if value.get("tool").and_then(|tool| tool.get(SECTION)).is_some() {
                        return Some(pyproject);
                    }
                }
            }
        }

        current = current.parent()?;
    }
}

/// Load the [tool.docs-spelling] section from `path`.
///
/// Returns `Ok(None)` when the file has no such section.
pub fn load_config(path: &Path) -> Result<Option<Config>> {
    let content = std::fs::read_to_string(path).map_err(|source| SpellingError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let config_error = |message: String| SpellingError::Config {
        path: path.to_path_buf(),
        message,
    };

    let value: toml::Value = toml::from_str(&content).map_err(|e| config_error(e.to_string()))?;
    let Some(section) = value.get("tool").and_then(|tool| tool.get(SECTION)) else {
        debug!("No [tool.{}] section in {:?}", SECTION, path);
        return Ok(None);
    };

    let mut config: Config = section
        .clone()
        .try_into()
        .map_err(|e: toml::de::Error| config_error(e.to_string()))?;

    // Relative docs_dir is relative to the pyproject.toml that declared it
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.docs_dir = config.docs_dir.take().map(|docs_dir| {
        if docs_dir.is_relative() {
            base.join(docs_dir)
        } else {
            docs_dir
        }
    });

    Ok(Some(config))
}

/// Merge command line arguments with config file settings
/// Command line arguments take precedence
pub fn merge_config(config: Option<&Config>, cli: &CliOverrides) -> Settings {
    let mut settings = Settings::default();

    if let Some(cfg) = config {
        if let Some(docs_dir) = &cfg.docs_dir {
            settings.docs_dir = docs_dir.clone();
        }
        if let Some(context_lines) = cfg.context_lines {
            settings.context_lines = context_lines;
        }
        if let Some(color) = cfg.color {
            settings.color = color;
        }
        if !cfg.extensions.is_empty() {
            settings.extensions = cfg.extensions.clone();
        }
        settings.exclude.extend(cfg.exclude.iter().cloned());
    }

    if let Some(docs_dir) = &cli.docs_dir {
        settings.docs_dir = docs_dir.clone();
    }
    if let Some(context_lines) = cli.context_lines {
        settings.context_lines = context_lines;
    }
    if cli.no_color {
        settings.color = false;
    }
    settings.exclude.extend(cli.exclude.iter().cloned());

    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_merge_without_config_uses_defaults() {
        let settings = merge_config(None, &CliOverrides::default());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config {
            docs_dir: Some(PathBuf::from("/from/config")),
            context_lines: Some(2),
            color: Some(true),
            extensions: vec!["log".to_string()],
            exclude: vec!["_build".to_string()],
        };
        let cli = CliOverrides {
            docs_dir: Some(PathBuf::from("/from/cli")),
            context_lines: None,
            no_color: true,
            exclude: vec!["tmp".to_string()],
        };

        let settings = merge_config(Some(&config), &cli);
        assert_eq!(settings.docs_dir, PathBuf::from("/from/cli"));
        assert_eq!(settings.context_lines, 2);
        assert!(!settings.color);
        assert_eq!(settings.extensions, vec!["log".to_string()]);
        assert_eq!(settings.exclude, vec!["_build".to_string(), "tmp".to_string()]);
    }

    #[test]
    fn test_load_config_resolves_relative_docs_dir() {
        let dir = TempDir::new().unwrap();
        let pyproject = dir.path().join("pyproject.toml");
        fs::write(
            &pyproject,
            "[tool.docs-spelling]\ndocs_dir = \"docs\"\ncontext_lines = 3\n",
        )
        .unwrap();

        let config = load_config(&pyproject).unwrap().unwrap();
        assert_eq!(config.docs_dir, Some(dir.path().join("docs")));
        assert_eq!(config.context_lines, Some(3));
    }

    #[test]
    fn test_load_config_without_section() {
        let dir = TempDir::new().unwrap();
        let pyproject = dir.path().join("pyproject.toml");
        fs::write(&pyproject, "[project]\nname = \"x\"\n").unwrap();

        assert_eq!(load_config(&pyproject).unwrap(), None);
    }

    #[test]
    fn test_load_config_rejects_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let pyproject = dir.path().join("pyproject.toml");
        fs::write(&pyproject, "[tool.docs-spelling]\nbogus = 1\n").unwrap();

        assert!(matches!(load_config(&pyproject), Err(SpellingError::Config { .. })));
    }

    #[test]
    fn test_find_config_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[tool.docs-spelling]\n").unwrap();
        let nested = dir.path().join("docs").join("_build");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            find_config_pyproject_toml(&nested),
            Some(dir.path().join("pyproject.toml"))
        );
    }

    #[test]
    fn test_find_config_skips_unrelated_pyproject() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pyproject.toml"), "[tool.docs-spelling]\n").unwrap();
        let inner = dir.path().join("inner");
        fs::create_dir(&inner).unwrap();
        fs::write(inner.join("pyproject.toml"), "[tool.other]\n").unwrap();

        assert_eq!(
            find_config_pyproject_toml(&inner),
            Some(dir.path().join("pyproject.toml"))
        );
    }
}
