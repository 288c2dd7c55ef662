//! Output formatting and styling module.
//!
//! Provides a centralized interface for all CLI output: colored status lines,
//! a spinner while the tree is being walked, and the final summary table.
//! [`ConsoleReporter`] is the console implementation of
//! [`RenameObserver`](crate::walker::RenameObserver).

use crate::walker::{EntryKind, RenameEvent, RenameObserver, RenameOutcome, RenameSummary};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::Path;
use std::time::Duration;

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Spinners for long walks
/// - Summary tables with statistics
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use namefix::output::OutputFormatter;
    /// OutputFormatter::success("Renaming complete.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a spinner for a walk whose length is not known up front.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use namefix::output::OutputFormatter;
    /// let spinner = OutputFormatter::create_spinner();
    /// spinner.inc(1);
    /// spinner.finish_and_clear();
    /// ```
    pub fn create_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {pos} entries checked {msg}")
                .expect("Invalid spinner template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    /// Formats one rename decision as a console line.
    ///
    /// Returns `None` for unchanged entries, which are only shown in verbose
    /// mode by the caller.
    pub fn event_line(event: &RenameEvent) -> Option<String> {
        let tag = format!("[{}]", event.kind.label());
        let line = match &event.outcome {
            RenameOutcome::Renamed => format!(
                "  {:<6} Renamed '{}' -> '{}'",
                tag.green(),
                event.old_name,
                event.new_name
            ),
            RenameOutcome::Planned => format!(
                "  {:<6} Would rename '{}' -> '{}'",
                tag.yellow(),
                event.old_name,
                event.new_name
            ),
            RenameOutcome::Conflict => format!(
                "  {} {} conflict: '{}' already exists. Skipping rename for '{}'.",
                "[SKIP]".yellow(),
                kind_word(event),
                event.new_path().display(),
                event.old_name
            ),
            RenameOutcome::Failed { reason } => format!(
                "  {} Could not rename {} '{}': {}",
                "[ERROR]".red(),
                kind_word(event).to_lowercase(),
                event.old_name,
                reason
            ),
            RenameOutcome::Unchanged => return None,
        };
        Some(line)
    }

    /// Prints a summary table of the walk.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use namefix::output::OutputFormatter;
    /// use namefix::walker::RenameSummary;
    ///
    /// OutputFormatter::summary_table(&RenameSummary::default(), false);
    /// ```
    pub fn summary_table(summary: &RenameSummary, dry_run: bool) {
        Self::header("SUMMARY");

        let rows = [
            (
                if dry_run { "Would rename" } else { "Renamed" },
                summary.renamed,
            ),
            ("Unchanged", summary.unchanged),
            ("Excluded", summary.excluded),
            ("Conflicts", summary.conflicts.len()),
            ("Failed", summary.failures.len()),
            ("Unreadable", summary.unreadable.len()),
        ];

        let width = rows
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!("{:<width$} | {}", "Outcome".bold(), "Items".bold(), width = width);
        println!("{}", "-".repeat(width + 10));

        for (label, count) in rows {
            let count = match label {
                "Conflicts" | "Unreadable" if count > 0 => count.to_string().yellow(),
                "Failed" if count > 0 => count.to_string().red(),
                _ => count.to_string().green(),
            };
            println!("{:<width$} | {}", label, count, width = width);
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            summary.total_processed().to_string().green().bold(),
            if summary.total_processed() == 1 { "item" } else { "items" },
            width = width
        );
    }
}

fn kind_word(event: &RenameEvent) -> &'static str {
    match event.kind {
        EntryKind::File => "File",
        EntryKind::Directory => "Directory",
    }
}

/// Prints every rename decision to the console while a spinner counts entries.
pub struct ConsoleReporter {
    spinner: ProgressBar,
    verbose: bool,
}

impl ConsoleReporter {
    /// Creates a reporter. With `verbose`, unchanged entries are listed too.
    pub fn new(verbose: bool) -> Self {
        Self {
            spinner: OutputFormatter::create_spinner(),
            verbose,
        }
    }

    /// Stops the spinner and removes it from the terminal.
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    /// Prints above the spinner. Unlike `ProgressBar::println`, this still
    /// prints when the spinner is hidden (output not a terminal).
    fn print(&self, line: &str) {
        self.spinner.suspend(|| println!("{}", line));
    }
}

impl RenameObserver for ConsoleReporter {
    fn directory_started(&mut self, path: &Path) {
        self.print(&format!("\nProcessing directory: {}", path.display()));
    }

    fn event(&mut self, event: &RenameEvent) {
        self.spinner.inc(1);
        match OutputFormatter::event_line(event) {
            Some(line) => self.print(&line),
            None if self.verbose => self.print(&format!(
                "  [{}] Keeping '{}' (already sanitized)",
                event.kind.label(),
                event.old_name
            )),
            None => {}
        }
    }

    fn directory_unreadable(&mut self, path: &Path, error: &io::Error) {
        let line = format!(
            "  {} Could not read directory '{}': {}",
            "[ERROR]".red(),
            path.display(),
            error
        );
        self.spinner.suspend(|| eprintln!("{}", line));
    }

    fn entry_unreadable(&mut self, path: &Path, error: &io::Error) {
        let line = format!(
            "  {} Could not read entry '{}': {}",
            "[ERROR]".red(),
            path.display(),
            error
        );
        self.spinner.suspend(|| eprintln!("{}", line));
    }
}

impl Drop for ConsoleReporter {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
