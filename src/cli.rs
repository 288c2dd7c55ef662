//! Command-line orchestration for namefix.
//!
//! This module handles everything between argument parsing and the walker:
//! - The warning banner and confirmation answer parsing
//! - Configuration loading and validation
//! - Running the walk with console reporting
//! - The final summary and the optional JSON report

use crate::config::NamefixConfig;
use crate::output::{ConsoleReporter, OutputFormatter};
use crate::report::{Recorder, RunReport};
use crate::walker::{RenameSummary, TreeWalker};
use log::info;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Options for a single run, as gathered by the binary.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Plan renames without performing them.
    pub dry_run: bool,
    /// The operator's answer to the confirmation prompt (or `--yes`).
    /// Ignored for dry runs, which never modify anything.
    pub proceed: bool,
    /// Also list entries that are already sanitized.
    pub verbose: bool,
    /// Explicit configuration file; otherwise the standard lookup applies.
    pub config_path: Option<PathBuf>,
    /// Where to write the JSON report, if anywhere.
    pub report_path: Option<PathBuf>,
}

/// Prints what is about to happen to `root` and the backup warning.
pub fn print_banner(root: &Path) {
    let display_root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());

    OutputFormatter::plain(&"=".repeat(50));
    OutputFormatter::header("File & Folder Renaming");
    OutputFormatter::plain(&"=".repeat(50));
    OutputFormatter::info(&format!("Target Directory: {}", display_root.display()));
    OutputFormatter::plain("\nThis will recursively:");
    OutputFormatter::plain("  - Rename FOLDERS to lowercase, replacing spaces with hyphens (-).");
    OutputFormatter::plain(
        "  - Rename FILES to lowercase, replacing spaces and '#' with underscores (_).",
    );
    OutputFormatter::plain("  - Remove most other special characters.");
    OutputFormatter::warning("This operation is irreversible on the original files.");
    OutputFormatter::warning("PLEASE BACK UP YOUR DATA BEFORE PROCEEDING.");
    OutputFormatter::plain(&"-".repeat(50));
}

/// Reads one line of confirmation and returns true only for `yes`
/// (case-insensitive, surrounding whitespace ignored).
///
/// # Errors
///
/// Returns any error from reading `input`.
pub fn read_confirmation(mut input: impl BufRead) -> std::io::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

/// Runs a rename (or dry run) over `root`.
///
/// Returns `Ok(None)` when the operator declined, otherwise the walk's summary.
/// Per-entry conflicts and failures are part of the summary, not errors.
///
/// # Errors
///
/// Returns a message if the configuration is invalid, the root is unusable,
/// or the report cannot be written.
///
/// # Examples
///
/// ```no_run
/// use namefix::cli::{run_cli, RunOptions};
/// use std::path::Path;
///
/// let options = RunOptions { dry_run: true, ..Default::default() };
/// match run_cli(Path::new("client/src/data"), &options) {
///     Ok(Some(summary)) => println!("{} items would be renamed", summary.renamed),
///     Ok(None) => println!("cancelled"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(root: &Path, options: &RunOptions) -> Result<Option<RenameSummary>, String> {
    if !options.dry_run && !options.proceed {
        OutputFormatter::plain("\nOperation cancelled.");
        return Ok(None);
    }

    let config = NamefixConfig::load(options.config_path.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let (rules, filters) = config
        .compile()
        .map_err(|e| format!("Error compiling configuration: {}", e))?;

    let walker = TreeWalker::new(rules)
        .with_filters(filters)
        .dry_run(options.dry_run);

    if options.dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing names under: {}", root.display()));
    } else {
        OutputFormatter::info("\nStarting renaming process...");
    }
    info!("Walking {} (dry run: {})", root.display(), options.dry_run);

    let mut report = RunReport::new(root.to_path_buf(), options.dry_run);
    let mut reporter = ConsoleReporter::new(options.verbose);
    let result = {
        let mut recorder = Recorder::new(&mut report, &mut reporter);
        walker.walk(root, &mut recorder)
    };
    reporter.finish();
    let summary = result.map_err(|e| e.to_string())?;

    OutputFormatter::summary_table(&summary, options.dry_run);

    if options.dry_run {
        OutputFormatter::plain(&"=".repeat(50));
        OutputFormatter::success(&format!(
            "Dry run complete. {} items would be renamed. No files were modified.",
            summary.renamed
        ));
    } else {
        OutputFormatter::plain(&"=".repeat(50));
        OutputFormatter::success(&format!(
            "Renaming complete. {} items renamed.",
            summary.renamed
        ));
    }

    if !summary.is_complete_success() {
        OutputFormatter::warning("Some items were not renamed. Please review the messages above.");
    }

    if let Some(report_path) = &options.report_path {
        report
            .save(report_path, &summary)
            .map_err(|e| format!("Error writing report: {}", e))?;
        OutputFormatter::info(&format!("Report written to {}", report_path.display()));
    }

    Ok(Some(summary))
}
