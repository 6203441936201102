use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use docs_spelling::config::{find_config_pyproject_toml, load_config, merge_config, CliOverrides};
use docs_spelling::report::{report_github, report_json};
use docs_spelling::snippet::FileSnippets;
use docs_spelling::{
    collect_warnings, group_by_category, parse_spelling_warnings, CollectOptions, GroupedWarnings,
    SummaryReporter,
};

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Terminal,
    Json,
    Github,
}

/// Exit codes used by docs-spelling
mod exit_codes {
    pub const SUCCESS: i32 = 0; // No spelling warnings
    pub const WARNINGS_FOUND: i32 = 1; // At least one warning was reported
    pub const FILE_ERROR: i32 = 3; // Input not found or unreadable
    pub const CONFIG_ERROR: i32 = 5; // Configuration file error
}

#[derive(Parser, Debug)]
#[command(
    name = "docs-spelling",
    author,
    version,
    about = "Summarize spelling warnings from a documentation build",
    long_about = "Summarize spelling warnings from a documentation build.\n\nEach path is a warning file or a directory searched for warning files. Use - to read from stdin."
)]
struct Args {
    /// Warning files or directories to read
    ///
    /// Example: docs-spelling docs/_build/spelling
    #[arg(default_value = "-")]
    paths: Vec<String>,

    /// Directory the warning paths are relative to
    ///
    /// Example: --docs-dir docs
    #[arg(long = "docs-dir")]
    docs_dir: Option<PathBuf>,

    /// Path to pyproject.toml with a [tool.docs-spelling] section
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Output format
    ///
    /// Example: -f json (for CI/CD), -f github (for GitHub Actions)
    #[arg(
        short = 'f',
        long = "output-format",
        value_enum,
        default_value = "terminal"
    )]
    output_format: OutputFormat,

    /// Report every warning under this category
    ///
    /// Example: --category apache-airflow-providers-google
    #[arg(long = "category")]
    category: Option<String>,

    /// Lines of source shown around each misspelling
    #[arg(long = "context-lines")]
    context_lines: Option<usize>,

    /// Skip files whose path matches pattern (can be used multiple times)
    #[arg(long = "skip")]
    skip: Vec<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let start = if args.paths[0] == "-" {
                std::env::current_dir()?
            } else {
                let start = PathBuf::from(&args.paths[0]);
                start.canonicalize().unwrap_or(start)
            };
            debug!("Searching for pyproject.toml from: {}", start.display());
            find_config_pyproject_toml(&start)
        }
    };

    let config = match config_path.as_deref().map(load_config).transpose() {
        Ok(config) => config.flatten(),
        Err(e) => {
            error!("{}", e);
            process::exit(exit_codes::CONFIG_ERROR);
        }
    };
    if let (Some(path), Some(cfg)) = (&config_path, &config) {
        info!("Loaded config from {}: {:?}", path.display(), cfg);
    }

    let settings = merge_config(
        config.as_ref(),
        &CliOverrides {
            docs_dir: args.docs_dir.clone(),
            context_lines: args.context_lines,
            no_color: args.no_color,
            exclude: args.skip.clone(),
        },
    );

    let options = CollectOptions {
        docs_dir: settings.docs_dir.clone(),
        extensions: settings.extensions.clone(),
        skip_patterns: settings.exclude.clone(),
        category: args.category.clone(),
    };

    let mut had_file_errors = false;
    let mut groups: Vec<(String, Vec<_>)> = Vec::new();
    let mut file_paths = Vec::new();

    for path_str in &args.paths {
        if path_str == "-" {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read warnings from stdin")?;
            let category = args.category.clone().unwrap_or_default();
            groups.push((category, parse_spelling_warnings(&text, &options.docs_dir)));
            continue;
        }

        let path = Path::new(path_str);
        if !path.exists() {
            error!("Path not found: {}", path.display());
            had_file_errors = true;
            continue;
        }
        file_paths.push(path.to_path_buf());
    }

    let collected = collect_warnings(&file_paths, &options);
    if collected.files_with_errors > 0 {
        had_file_errors = true;
    }
    info!("Read {} warning files", collected.files_read);

    let mut all_warnings: GroupedWarnings = collected.warnings;
    for (category, warnings) in group_by_category(groups) {
        if !warnings.is_empty() {
            all_warnings.entry(category).or_default().extend(warnings);
        }
    }
    let total: usize = all_warnings.values().map(Vec::len).sum();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output_format {
        OutputFormat::Terminal => {
            if total > 0 {
                let snippets = FileSnippets::new(settings.context_lines);
                let mut reporter = SummaryReporter::with_snippets(&mut out, settings.color, snippets);
                reporter.display_summary(&all_warnings)?;
            } else {
                writeln!(out, "No spelling warnings found.")?;
            }
        }
        OutputFormat::Json => report_json(&mut out, &all_warnings)?,
        OutputFormat::Github => report_github(&mut out, &all_warnings)?,
    }
    out.flush()?;

    let exit_code = if had_file_errors {
        eprintln!(
            "\nExiting with code {} due to file errors",
            exit_codes::FILE_ERROR
        );
        exit_codes::FILE_ERROR
    } else if total > 0 {
        exit_codes::WARNINGS_FOUND
    } else {
        exit_codes::SUCCESS
    };

    if exit_code != exit_codes::SUCCESS {
        process::exit(exit_code);
    }

    Ok(())
}
