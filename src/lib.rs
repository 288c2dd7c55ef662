//! namefix - recursive file and folder name normalization
//!
//! This library lowercases and sanitizes names across a directory tree:
//! directories get hyphen-separated names, files get underscore-separated base
//! names with their extension kept. Renames happen bottom-up, never overwrite
//! an existing entry, and are reported as structured events.

pub mod cli;
pub mod config;
pub mod output;
pub mod report;
pub mod sanitize;
pub mod walker;

pub use config::{CompiledFilters, ConfigError, NamefixConfig};
pub use report::{Recorder, ReportError, RunReport};
pub use sanitize::{NamingRules, sanitize_dir_name, sanitize_file_name};
pub use walker::{
    EntryKind, FsRenamer, RenameEvent, RenameObserver, RenameOutcome, RenameSummary, Renamer,
    SkippedEntry, TreeWalker, WalkError, WalkResult, rename_recursively,
};

pub use cli::{RunOptions, run_cli};
