//! Recursive, conflict-checked renaming of a directory tree.
//!
//! The walk is post-order: every subdirectory is fully processed before the
//! files and subdirectory names of its parent are renamed, so no pending path
//! is ever invalidated by an ancestor rename. Per-item problems (a name that is
//! already taken, a rename the OS refuses) are reported to a [`RenameObserver`]
//! and never abort the walk; only an unusable root does.

use crate::config::CompiledFilters;
use crate::sanitize::NamingRules;
use log::{debug, info, warn};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Whether an entry is renamed with the file or the directory rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    /// Short tag used in console output.
    pub fn label(self) -> &'static str {
        match self {
            EntryKind::File => "FILE",
            EntryKind::Directory => "DIR",
        }
    }
}

/// What happened to a single entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RenameOutcome {
    /// The entry now carries its sanitized name.
    Renamed,
    /// Dry run only: the entry would have been renamed.
    Planned,
    /// The name was already sanitized.
    Unchanged,
    /// Something already exists at the sanitized name; the entry was left alone.
    Conflict,
    /// The rename was not performed.
    Failed { reason: String },
}

/// One decision made by the walker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameEvent {
    pub kind: EntryKind,
    /// Directory containing the entry, at the time it was processed.
    #[serde(serialize_with = "serialize_lossy_path")]
    pub directory: PathBuf,
    pub old_name: String,
    pub new_name: String,
    #[serde(flatten)]
    pub outcome: RenameOutcome,
}

impl RenameEvent {
    /// Path of the entry before the decision.
    pub fn old_path(&self) -> PathBuf {
        self.directory.join(&self.old_name)
    }

    /// Path the entry was (or would have been) renamed to.
    pub fn new_path(&self) -> PathBuf {
        self.directory.join(&self.new_name)
    }
}

/// Receives every decision the walker makes.
///
/// Closures taking `&RenameEvent` implement this trait directly.
pub trait RenameObserver {
    /// Called once per directory, right before its own entries are renamed.
    fn directory_started(&mut self, _path: &Path) {}

    /// Called once per file and per subdirectory name.
    fn event(&mut self, event: &RenameEvent);

    /// Called when a subdirectory cannot be listed; its contents are left
    /// untouched.
    fn directory_unreadable(&mut self, _path: &Path, _error: &io::Error) {}

    /// Called when a single entry of a listed directory cannot be read; only
    /// that entry is skipped.
    fn entry_unreadable(&mut self, _path: &Path, _error: &io::Error) {}
}

impl<F> RenameObserver for F
where
    F: FnMut(&RenameEvent),
{
    fn event(&mut self, event: &RenameEvent) {
        self(event)
    }
}

/// The rename primitive the walker consumes.
pub trait Renamer {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Renames through [`std::fs::rename`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRenamer;

impl Renamer for FsRenamer {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// Errors that stop a walk before anything is renamed.
#[derive(Debug)]
pub enum WalkError {
    /// The root path is missing or is not a directory.
    InvalidRoot { path: PathBuf, source: io::Error },
    /// The root directory exists but cannot be listed.
    ReadDirFailed { path: PathBuf, source: io::Error },
}

impl std::fmt::Display for WalkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRoot { path, source } => {
                write!(f, "Target directory {} not usable: {}", path.display(), source)
            }
            Self::ReadDirFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for WalkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRoot { source, .. } | Self::ReadDirFailed { source, .. } => Some(source),
        }
    }
}

/// Result type for tree walks.
pub type WalkResult<T> = Result<T, WalkError>;

/// An entry the walker left alone, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    #[serde(serialize_with = "serialize_lossy_path")]
    pub path: PathBuf,
    pub reason: String,
}

impl SkippedEntry {
    fn new(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            reason: reason.into(),
        }
    }
}

/// Paths are written as (lossy) UTF-8 so odd names never fail a report.
fn serialize_lossy_path<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// Aggregated outcome of a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenameSummary {
    /// Entries renamed (or, in a dry run, planned for renaming).
    pub renamed: usize,
    /// Entries whose name was already sanitized.
    pub unchanged: usize,
    /// Entries skipped by the configured filters.
    pub excluded: usize,
    /// Entries left alone because their target name was taken.
    pub conflicts: Vec<SkippedEntry>,
    /// Entries whose rename was refused.
    pub failures: Vec<SkippedEntry>,
    /// Subdirectories that could not be listed and entries that could not be read.
    pub unreadable: Vec<SkippedEntry>,
}

impl RenameSummary {
    fn record(&mut self, event: &RenameEvent) {
        match &event.outcome {
            RenameOutcome::Renamed | RenameOutcome::Planned => self.renamed += 1,
            RenameOutcome::Unchanged => self.unchanged += 1,
            RenameOutcome::Conflict => self.conflicts.push(SkippedEntry::new(
                event.old_path(),
                format!("{} already exists", event.new_path().display()),
            )),
            RenameOutcome::Failed { reason } => self
                .failures
                .push(SkippedEntry::new(event.old_path(), reason.clone())),
        }
    }

    /// Number of entries the walker made a decision about.
    pub fn total_processed(&self) -> usize {
        self.renamed + self.unchanged + self.conflicts.len() + self.failures.len()
    }

    /// True when nothing was skipped for a conflict and nothing failed.
    pub fn is_complete_success(&self) -> bool {
        self.conflicts.is_empty() && self.failures.is_empty() && self.unreadable.is_empty()
    }
}

/// A subdirectory found while listing.
#[derive(Debug)]
struct Subdirectory {
    name: OsString,
    /// False for symbolic links to directories: renamed, never entered.
    descend: bool,
}

/// How a listed entry is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListedKind {
    File,
    Directory,
    /// Symbolic link whose target is a directory.
    DirectoryLink,
}

/// One raw entry from a directory listing.
#[derive(Debug)]
struct ListedEntry {
    name: OsString,
    kind: io::Result<ListedKind>,
}

/// Entries of one directory, sorted by name.
#[derive(Debug, Default)]
struct Listing {
    files: Vec<OsString>,
    directories: Vec<Subdirectory>,
    excluded: usize,
    /// Entries that could not be read, with the error.
    unreadable: Vec<(PathBuf, io::Error)>,
}

/// Names a dry run has already claimed or freed in one directory.
#[derive(Debug, Default)]
struct PlannedNames {
    claimed: HashSet<String>,
    vacated: HashSet<OsString>,
}

/// Walks a tree and renames every entry to its sanitized form.
///
/// # Examples
///
/// ```no_run
/// use namefix::walker::{RenameEvent, TreeWalker};
/// use std::path::Path;
///
/// let walker = TreeWalker::default();
/// let mut print = |event: &RenameEvent| println!("{:?}", event);
/// match walker.walk(Path::new("client/src/data"), &mut print) {
///     Ok(summary) => println!("{} items renamed", summary.renamed),
///     Err(e) => eprintln!("{}", e),
/// }
/// ```
#[derive(Debug)]
pub struct TreeWalker<R = FsRenamer> {
    rules: NamingRules,
    filters: CompiledFilters,
    dry_run: bool,
    renamer: R,
}

impl Default for TreeWalker<FsRenamer> {
    fn default() -> Self {
        Self::new(NamingRules::default())
    }
}

impl TreeWalker<FsRenamer> {
    /// Creates a walker that renames through the filesystem with no filters.
    pub fn new(rules: NamingRules) -> Self {
        Self {
            rules,
            filters: CompiledFilters::default(),
            dry_run: false,
            renamer: FsRenamer,
        }
    }
}

impl<R: Renamer> TreeWalker<R> {
    /// Skips entries matched by `filters`.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// In a dry run every decision is made but nothing is renamed.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Replaces the rename primitive.
    pub fn with_renamer<T: Renamer>(self, renamer: T) -> TreeWalker<T> {
        TreeWalker {
            rules: self.rules,
            filters: self.filters,
            dry_run: self.dry_run,
            renamer,
        }
    }

    /// Renames everything below `root` (the root itself keeps its name).
    ///
    /// # Errors
    ///
    /// Returns `WalkError::InvalidRoot` if `root` does not exist or is not a
    /// directory, and `WalkError::ReadDirFailed` if it cannot be listed. In
    /// both cases nothing has been renamed.
    pub fn walk(&self, root: &Path, observer: &mut dyn RenameObserver) -> WalkResult<RenameSummary> {
        let metadata = fs::metadata(root).map_err(|e| WalkError::InvalidRoot {
            path: root.to_path_buf(),
            source: e,
        })?;
        if !metadata.is_dir() {
            return Err(WalkError::InvalidRoot {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let listing = self
            .list(root, Path::new(""))
            .map_err(|e| WalkError::ReadDirFailed {
                path: root.to_path_buf(),
                source: e,
            })?;

        let mut summary = RenameSummary::default();
        self.visit(root, Path::new(""), listing, observer, &mut summary);

        info!(
            "Walk of {} finished: {} renamed, {} conflicts, {} failures",
            root.display(),
            summary.renamed,
            summary.conflicts.len(),
            summary.failures.len()
        );
        Ok(summary)
    }

    fn visit(
        &self,
        dir: &Path,
        relative: &Path,
        listing: Listing,
        observer: &mut dyn RenameObserver,
        summary: &mut RenameSummary,
    ) {
        summary.excluded += listing.excluded;

        for (path, e) in &listing.unreadable {
            warn!("Could not read entry {}: {}", path.display(), e);
            observer.entry_unreadable(path, e);
            summary
                .unreadable
                .push(SkippedEntry::new(path.clone(), e.to_string()));
        }

        for subdirectory in listing.directories.iter().filter(|d| d.descend) {
            let path = dir.join(&subdirectory.name);
            let relative = relative.join(&subdirectory.name);
            match self.list(&path, &relative) {
                Ok(child) => self.visit(&path, &relative, child, observer, summary),
                Err(e) => {
                    warn!("Could not list {}: {}", path.display(), e);
                    observer.directory_unreadable(&path, &e);
                    summary.unreadable.push(SkippedEntry::new(path, e.to_string()));
                }
            }
        }

        debug!("Processing directory {}", dir.display());
        observer.directory_started(dir);

        let mut planned = PlannedNames::default();
        for name in &listing.files {
            let event = self.process(dir, EntryKind::File, name, &mut planned);
            summary.record(&event);
            observer.event(&event);
        }
        for subdirectory in &listing.directories {
            let event = self.process(dir, EntryKind::Directory, &subdirectory.name, &mut planned);
            summary.record(&event);
            observer.event(&event);
        }
    }

    fn process(
        &self,
        dir: &Path,
        kind: EntryKind,
        name: &OsStr,
        planned: &mut PlannedNames,
    ) -> RenameEvent {
        let old_name = name.to_string_lossy().into_owned();
        let new_name = match kind {
            EntryKind::File => self.rules.file_name(&old_name),
            EntryKind::Directory => self.rules.directory_name(&old_name),
        };
        let outcome = self.decide(dir, name, &new_name, planned);

        match &outcome {
            RenameOutcome::Renamed => {
                info!("Renamed {:?} -> {:?} in {}", old_name, new_name, dir.display())
            }
            RenameOutcome::Conflict => warn!(
                "Skipping {:?}: {} already exists",
                old_name,
                dir.join(&new_name).display()
            ),
            RenameOutcome::Failed { reason } => {
                warn!("Could not rename {:?} in {}: {}", old_name, dir.display(), reason)
            }
            RenameOutcome::Planned | RenameOutcome::Unchanged => {}
        }

        RenameEvent {
            kind,
            directory: dir.to_path_buf(),
            old_name,
            new_name,
            outcome,
        }
    }

    fn decide(
        &self,
        dir: &Path,
        name: &OsStr,
        new_name: &str,
        planned: &mut PlannedNames,
    ) -> RenameOutcome {
        if name == OsStr::new(new_name) {
            return RenameOutcome::Unchanged;
        }
        if new_name.is_empty() {
            return RenameOutcome::Failed {
                reason: "sanitized name is empty".to_string(),
            };
        }

        let target = dir.join(new_name);
        let occupied = fs::symlink_metadata(&target).is_ok();

        if self.dry_run {
            let freed = planned.vacated.contains(OsStr::new(new_name));
            if (occupied && !freed) || planned.claimed.contains(new_name) {
                return RenameOutcome::Conflict;
            }
            planned.claimed.insert(new_name.to_string());
            planned.vacated.insert(name.to_os_string());
            return RenameOutcome::Planned;
        }

        if occupied {
            return RenameOutcome::Conflict;
        }
        match self.renamer.rename(&dir.join(name), &target) {
            Ok(()) => RenameOutcome::Renamed,
            Err(e) => RenameOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }

    fn list(&self, dir: &Path, relative: &Path) -> io::Result<Listing> {
        let entries = fs::read_dir(dir)?.map(|entry| {
            entry.map(|entry| ListedEntry {
                name: entry.file_name(),
                kind: entry.file_type().map(|file_type| {
                    if file_type.is_dir() {
                        ListedKind::Directory
                    } else if file_type.is_symlink() && points_to_directory(&entry.path()) {
                        ListedKind::DirectoryLink
                    } else {
                        ListedKind::File
                    }
                }),
            })
        });
        Ok(self.build_listing(dir, relative, entries))
    }

    /// Sorts raw entries into files and subdirectories, applying the filters.
    /// An entry that cannot be read is recorded and skipped on its own.
    fn build_listing(
        &self,
        dir: &Path,
        relative: &Path,
        entries: impl IntoIterator<Item = io::Result<ListedEntry>>,
    ) -> Listing {
        let mut listing = Listing::default();

        for entry in entries {
            let ListedEntry { name, kind } = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    listing.unreadable.push((dir.to_path_buf(), e));
                    continue;
                }
            };
            let kind = match kind {
                Ok(kind) => kind,
                Err(e) => {
                    listing.unreadable.push((dir.join(&name), e));
                    continue;
                }
            };

            let is_dir = kind != ListedKind::File;
            if !self.filters.should_include(&relative.join(&name), is_dir) {
                debug!("Excluded {}", dir.join(&name).display());
                listing.excluded += 1;
                continue;
            }

            match kind {
                ListedKind::Directory => {
                    listing.directories.push(Subdirectory { name, descend: true })
                }
                ListedKind::DirectoryLink => listing.directories.push(Subdirectory {
                    name,
                    descend: false,
                }),
                ListedKind::File => listing.files.push(name),
            }
        }

        listing.files.sort();
        listing.directories.sort_by(|a, b| a.name.cmp(&b.name));
        listing
    }
}

fn points_to_directory(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Renames everything below `root` with the default rules and returns the
/// number of renamed entries.
///
/// # Errors
///
/// Fails only if `root` is missing, not a directory, or unreadable.
pub fn rename_recursively(root: &Path, observer: &mut dyn RenameObserver) -> WalkResult<usize> {
    TreeWalker::default()
        .walk(root, observer)
        .map(|summary| summary.renamed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    fn collect(walker: &TreeWalker<impl Renamer>, root: &Path) -> (RenameSummary, Vec<RenameEvent>) {
        let mut events = Vec::new();
        let summary = walker
            .walk(root, &mut |event: &RenameEvent| events.push(event.clone()))
            .expect("walk failed");
        (summary, events)
    }

    /// Fails every rename whose source file name is in `refuse` and records
    /// the rest before delegating to the filesystem.
    struct FlakyRenamer {
        refuse: Vec<&'static str>,
        attempts: RefCell<Vec<PathBuf>>,
    }

    impl Renamer for FlakyRenamer {
        fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            self.attempts.borrow_mut().push(from.to_path_buf());
            let name = from.file_name().map(|n| n.to_string_lossy().into_owned());
            if name.is_some_and(|n| self.refuse.iter().any(|refused| *refused == n)) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
            }
            fs::rename(from, to)
        }
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");

        let result = TreeWalker::default().walk(&missing, &mut |_: &RenameEvent| {});
        assert!(matches!(result, Err(WalkError::InvalidRoot { .. })));
    }

    #[test]
    fn test_file_root_is_fatal() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("Some File.txt");
        fs::write(&file, "x").expect("Failed to write test file");

        let result = TreeWalker::default().walk(&file, &mut |_: &RenameEvent| {});
        assert!(matches!(result, Err(WalkError::InvalidRoot { .. })));
        assert!(file.exists());
    }

    #[test]
    fn test_files_processed_before_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("B Dir")).unwrap();
        fs::write(root.join("A File.txt"), "x").unwrap();

        let (summary, events) = collect(&TreeWalker::default(), root);

        assert_eq!(summary.renamed, 2);
        assert_eq!(events[0].kind, EntryKind::File);
        assert_eq!(events[0].new_name, "a_file.txt");
        assert_eq!(events[1].kind, EntryKind::Directory);
        assert_eq!(events[1].new_name, "b-dir");
    }

    #[test]
    fn test_child_renamed_under_original_parent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Parent Dir").join("Child Dir")).unwrap();

        let (summary, events) = collect(&TreeWalker::default(), root);

        assert_eq!(summary.renamed, 2);
        assert_eq!(events[0].old_name, "Child Dir");
        assert_eq!(events[0].directory, root.join("Parent Dir"));
        assert_eq!(events[1].old_name, "Parent Dir");
        assert!(root.join("parent-dir").join("child-dir").is_dir());
    }

    #[test]
    fn test_unchanged_entries_are_reported_not_counted() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("clean_name.txt"), "x").unwrap();

        let (summary, events) = collect(&TreeWalker::default(), root);

        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(events[0].outcome, RenameOutcome::Unchanged);
    }

    #[test]
    fn test_conflict_leaves_second_entry_untouched() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("FILE.TXT"), "upper").unwrap();
        fs::write(root.join("File.txt"), "mixed").unwrap();

        let (summary, events) = collect(&TreeWalker::default(), root);

        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.conflicts.len(), 1);
        assert_eq!(summary.conflicts[0].path, root.join("File.txt"));
        assert_eq!(events[1].outcome, RenameOutcome::Conflict);
        assert_eq!(fs::read_to_string(root.join("file.txt")).unwrap(), "upper");
        assert_eq!(fs::read_to_string(root.join("File.txt")).unwrap(), "mixed");
    }

    #[test]
    fn test_empty_directory_name_is_not_renamed() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("###")).unwrap();

        let (summary, events) = collect(&TreeWalker::default(), root);

        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.failures.len(), 1);
        assert!(matches!(events[0].outcome, RenameOutcome::Failed { .. }));
        assert!(root.join("###").is_dir());
    }

    #[test]
    fn test_failure_does_not_stop_walk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("Other Dir")).unwrap();
        fs::write(root.join("Other Dir").join("Inner File.txt"), "x").unwrap();
        fs::write(root.join("A Locked.txt"), "x").unwrap();
        fs::write(root.join("B Open.txt"), "x").unwrap();

        let renamer = FlakyRenamer {
            refuse: vec!["A Locked.txt"],
            attempts: RefCell::new(Vec::new()),
        };
        let walker = TreeWalker::default().with_renamer(renamer);
        let (summary, _) = collect(&walker, root);

        assert_eq!(summary.renamed, 3);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].path, root.join("A Locked.txt"));
        assert!(root.join("A Locked.txt").exists());
        assert!(root.join("b_open.txt").exists());
        assert!(root.join("other-dir").join("inner_file.txt").exists());
        assert_eq!(walker.renamer.attempts.borrow().len(), 4);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("Some Dir")).unwrap();
        fs::write(root.join("Some Dir").join("Some File.txt"), "x").unwrap();

        let (summary, events) = collect(&TreeWalker::default().dry_run(true), root);

        assert_eq!(summary.renamed, 2);
        assert!(events.iter().all(|e| e.outcome == RenameOutcome::Planned));
        assert!(root.join("Some Dir").join("Some File.txt").exists());
    }

    #[test]
    fn test_dry_run_detects_collisions_between_planned_renames() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("My File.txt"), "x").unwrap();
        fs::write(root.join("My#File.txt"), "x").unwrap();

        let (summary, _) = collect(&TreeWalker::default().dry_run(true), root);

        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.conflicts.len(), 1);
    }

    #[test]
    fn test_dry_run_matches_real_run_when_file_vacates_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("my-notes"), "x").unwrap();
        fs::create_dir(root.join("My Notes")).unwrap();

        let (planned, _) = collect(&TreeWalker::default().dry_run(true), root);
        let (real, _) = collect(&TreeWalker::default(), root);

        assert_eq!(planned.renamed, 2);
        assert_eq!(real.renamed, 2);
        assert!(root.join("mynotes").is_file());
        assert!(root.join("my-notes").is_dir());
    }

    #[test]
    fn test_rename_recursively_returns_count() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("One File.txt"), "x").unwrap();
        fs::write(root.join("two.txt"), "x").unwrap();

        let count = rename_recursively(root, &mut |_: &RenameEvent| {}).unwrap();
        assert_eq!(count, 1);
    }

    /// Deletes `victim` as soon as an entry inside `trigger` is processed,
    /// so `victim` disappears between the parent's listing and its own.
    struct RemovesSibling {
        trigger: PathBuf,
        victim: PathBuf,
        unreadable: Vec<PathBuf>,
    }

    impl RenameObserver for RemovesSibling {
        fn event(&mut self, event: &RenameEvent) {
            if event.directory == self.trigger && self.victim.exists() {
                fs::remove_dir_all(&self.victim).unwrap();
            }
        }

        fn directory_unreadable(&mut self, path: &Path, _error: &io::Error) {
            self.unreadable.push(path.to_path_buf());
        }
    }

    #[test]
    fn test_unreadable_subdirectory_does_not_stop_walk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        for dir in ["A Dir", "B Dir", "C Dir"] {
            fs::create_dir(root.join(dir)).unwrap();
            fs::write(root.join(dir).join("Inner File.txt"), "x").unwrap();
        }
        fs::write(root.join("Top File.txt"), "x").unwrap();

        let mut observer = RemovesSibling {
            trigger: root.join("A Dir"),
            victim: root.join("B Dir"),
            unreadable: Vec::new(),
        };
        let summary = TreeWalker::default().walk(root, &mut observer).unwrap();

        assert_eq!(observer.unreadable, vec![root.join("B Dir")]);
        assert_eq!(summary.unreadable.len(), 1);
        assert_eq!(summary.unreadable[0].path, root.join("B Dir"));
        assert!(root.join("a-dir").join("inner_file.txt").exists());
        assert!(root.join("c-dir").join("inner_file.txt").exists());
        assert!(root.join("top_file.txt").exists());
    }

    #[test]
    fn test_unreadable_entry_skips_only_that_entry() {
        let walker = TreeWalker::default();
        let entries = vec![
            Ok(ListedEntry {
                name: OsString::from("Good File.txt"),
                kind: Ok(ListedKind::File),
            }),
            Err(io::Error::other("entry vanished")),
            Ok(ListedEntry {
                name: OsString::from("Broken"),
                kind: Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied")),
            }),
            Ok(ListedEntry {
                name: OsString::from("Sub Dir"),
                kind: Ok(ListedKind::Directory),
            }),
        ];

        let listing = walker.build_listing(Path::new("/data"), Path::new(""), entries);

        assert_eq!(listing.files, vec![OsString::from("Good File.txt")]);
        assert_eq!(listing.directories.len(), 1);
        assert_eq!(listing.directories[0].name, "Sub Dir");
        assert_eq!(listing.unreadable.len(), 2);
        assert_eq!(listing.unreadable[0].0, PathBuf::from("/data"));
        assert_eq!(listing.unreadable[1].0, PathBuf::from("/data/Broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_still_occupies_its_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        std::os::unix::fs::symlink(root.join("missing-target"), root.join("file.txt")).unwrap();
        fs::write(root.join("File.txt"), "x").unwrap();

        let (summary, events) = collect(&TreeWalker::default(), root);

        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.conflicts.len(), 1);
        assert_eq!(summary.conflicts[0].path, root.join("File.txt"));
        let conflict = events
            .iter()
            .find(|e| e.old_name == "File.txt")
            .expect("event for File.txt");
        assert_eq!(conflict.outcome, RenameOutcome::Conflict);
        assert!(root.join("File.txt").is_file());
        assert!(fs::symlink_metadata(root.join("file.txt")).unwrap().file_type().is_symlink());
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlink_renamed_but_not_entered() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target").join("inside.txt"), "x").unwrap();
        std::os::unix::fs::symlink(root.join("target"), root.join("Link Dir")).unwrap();

        let (_, events) = collect(&TreeWalker::default(), root);

        let link = events
            .iter()
            .find(|e| e.old_name == "Link Dir")
            .expect("link event");
        assert_eq!(link.kind, EntryKind::Directory);
        assert_eq!(link.outcome, RenameOutcome::Renamed);
        assert_eq!(
            events.iter().filter(|e| e.old_name == "inside.txt").count(),
            1,
            "linked directory must not be walked twice"
        );
    }
}
