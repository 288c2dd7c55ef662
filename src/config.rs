//! Naming and filtering configuration.
//!
//! Configuration is loaded from TOML and controls two things: the separators
//! and fallback used by the sanitizers, and which entries the walker leaves
//! alone entirely. Filtering supports:
//! - Exact name matching
//! - Glob pattern matching against the path relative to the walk root
//! - File extension matching
//! - Regex pattern matching against the entry name
//! - Include (whitelist) patterns that override exclude rules
//!
//! # Configuration File Format
//!
//! ```toml
//! [naming]
//! directory_separator = "-"
//! file_separator = "_"
//! file_fallback = "renamed_file"
//!
//! [filters]
//! include_hidden = true
//!
//! [filters.exclude]
//! filenames = [".git", "node_modules"]
//! patterns = ["*.lock"]
//! extensions = ["bak"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! An excluded directory is neither renamed nor descended into.

use crate::sanitize::NamingRules;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-project configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".namefixrc.toml";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Naming rules that would break the sanitizers' guarantees.
    InvalidNaming(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidNaming(msg) => write!(f, "Invalid naming rules: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(
                    f,
                    "Invalid glob pattern '{}': expected *.ext or dir/**",
                    pattern
                )
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Complete configuration as read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamefixConfig {
    /// Separators and fallback used by the sanitizers.
    #[serde(default)]
    pub naming: NamingRules,

    /// Entries to leave alone.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether entries starting with "." are processed. Defaults to true.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,

    /// Rules for excluding entries.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_include_hidden() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            include_hidden: default_include_hidden(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for excluding entries from renaming.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact names to exclude (e.g., ".git", "node_modules").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, without the dot. Case-insensitive.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that always process an entry, even if excluded otherwise.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl NamefixConfig {
    /// Load configuration with the standard lookup order.
    ///
    /// 1. `config_path`, if given (must exist)
    /// 2. `./.namefixrc.toml`
    /// 3. `$HOME/.config/namefix/config.toml`
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("namefix")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Check the naming rules.
    ///
    /// Separators must be ASCII punctuation other than `.` and `/`, so that
    /// they survive sanitization and never touch the extension split. The
    /// fallback must already be a sanitized, non-empty base name without a `.`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNaming` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let naming = &self.naming;
        for (label, separator) in [
            ("directory_separator", naming.directory_separator),
            ("file_separator", naming.file_separator),
        ] {
            if !separator.is_ascii_punctuation() || separator == '.' || separator == '/' {
                return Err(ConfigError::InvalidNaming(format!(
                    "{} must be an ASCII punctuation character other than '.' and '/', got {:?}",
                    label, separator
                )));
            }
        }

        let fallback = &naming.file_fallback;
        if fallback.is_empty() || fallback.contains('.') || naming.file_name(fallback) != *fallback
        {
            return Err(ConfigError::InvalidNaming(format!(
                "file_fallback {:?} is not a valid sanitized file name",
                fallback
            )));
        }

        Ok(())
    }

    /// Validate the naming rules and compile the filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the naming rules are invalid or any regex or glob
    /// pattern fails to compile.
    pub fn compile(self) -> Result<(NamingRules, CompiledFilters), ConfigError> {
        self.validate()?;
        let filters = CompiledFilters::new(self.filters)?;
        Ok((self.naming, filters))
    }
}

/// Compiled filter structures for matching entries during a walk.
///
/// Glob and regex patterns are parsed once up front rather than for every
/// entry.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: GlobSet,
    exclude_regexes: Vec<Regex>,
    include_patterns: GlobSet,
}

/// Compiled glob patterns. A pattern ending in `/**` also matches the
/// directory it names, so `vendor/**` covers `vendor` itself.
#[derive(Debug, Clone, Default)]
struct GlobSet {
    patterns: Vec<Pattern>,
    directory_forms: Vec<Pattern>,
}

impl GlobSet {
    fn compile(patterns: &[String]) -> Result<Self, ConfigError> {
        let mut set = Self::default();
        for pattern in patterns {
            let invalid = |_| ConfigError::InvalidGlobPattern(pattern.clone());
            set.patterns.push(Pattern::new(pattern).map_err(invalid)?);
            if let Some(directory) = pattern.strip_suffix("/**").filter(|d| !d.is_empty()) {
                set.directory_forms
                    .push(Pattern::new(directory).map_err(invalid)?);
            }
        }
        Ok(set)
    }

    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches_path(path))
            || (is_dir
                && self
                    .directory_forms
                    .iter()
                    .any(|pattern| pattern.matches_path(path)))
    }
}

impl Default for CompiledFilters {
    /// Filters that let every entry through.
    fn default() -> Self {
        Self {
            include_hidden: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: GlobSet::default(),
            exclude_regexes: Vec::new(),
            include_patterns: GlobSet::default(),
        }
    }
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    pub fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = GlobSet::compile(&rules.exclude.patterns)?;
        let include_patterns = GlobSet::compile(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check whether an entry should be processed by the walker.
    ///
    /// `relative_path` is the entry's path relative to the walk root and
    /// `is_dir` says whether it is (or links to) a directory. Checks run in
    /// this order, stopping at the first match:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden entry filter - if hidden and disabled, exclude
    /// 3. Exact name match - if matched, exclude
    /// 4. Extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, relative_path: &Path, is_dir: bool) -> bool {
        let name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.include_patterns.matches(relative_path, is_dir) {
            return true;
        }

        if !self.include_hidden && name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.exclude_patterns.matches(relative_path, is_dir) {
            return false;
        }

        if self.exclude_regexes.iter().any(|regex| regex.is_match(&name)) {
            return false;
        }

        true
    }
}
