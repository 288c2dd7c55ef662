//! Name sanitization rules for files and directories.
//!
//! Both sanitizers are pure: they lowercase the name, turn spaces (and `#` for
//! files) into a separator, drop every character outside `[a-z0-9]` plus the
//! separator, collapse separator runs, and trim separators from both ends.
//!
//! Directory names use `-` as the separator and may sanitize to the empty
//! string. File names use `_`, keep their extension (lowercased) apart from the
//! base, and fall back to [`DEFAULT_FILE_FALLBACK`] when the base would be
//! empty.
//!
//! ```
//! use namefix::sanitize::{sanitize_dir_name, sanitize_file_name};
//!
//! assert_eq!(sanitize_file_name("My Photo #1.JPG"), "my_photo_1.jpg");
//! assert_eq!(sanitize_dir_name("Déjà Vu"), "dj-vu");
//! ```

use serde::{Deserialize, Serialize};

/// Base name substituted when a file base sanitizes to nothing.
pub const DEFAULT_FILE_FALLBACK: &str = "renamed_file";

/// Separator used between words in directory names.
pub const DEFAULT_DIRECTORY_SEPARATOR: char = '-';

/// Separator used between words in file base names.
pub const DEFAULT_FILE_SEPARATOR: char = '_';

/// The configurable part of sanitization.
///
/// Loaded from the `[naming]` table of the configuration file. Every field
/// falls back to the built-in default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingRules {
    /// Replaces spaces in directory names.
    pub directory_separator: char,
    /// Replaces spaces and `#` in file base names.
    pub file_separator: char,
    /// Substitute for a file base that sanitizes to the empty string.
    pub file_fallback: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            directory_separator: DEFAULT_DIRECTORY_SEPARATOR,
            file_separator: DEFAULT_FILE_SEPARATOR,
            file_fallback: DEFAULT_FILE_FALLBACK.to_string(),
        }
    }
}

impl NamingRules {
    /// Sanitizes a directory name.
    ///
    /// The result may be empty when nothing in `name` survives; no fallback is
    /// applied. Callers decide what an empty directory name means.
    pub fn directory_name(&self, name: &str) -> String {
        normalize(name, self.directory_separator, &[' '])
    }

    /// Sanitizes a file name, keeping its extension.
    ///
    /// The extension starts at the last `.` (so `.JPG` is all extension and
    /// `archive.tar.gz` keeps only `.gz`). It is lowercased but otherwise left
    /// as is. The base goes through the same normalization as directory names
    /// with `#` also treated as a word break, and is replaced by
    /// `file_fallback` if it ends up empty.
    pub fn file_name(&self, name: &str) -> String {
        let (base, extension) = split_extension(name);
        let mut sanitized = normalize(base, self.file_separator, &['#', ' ']);
        if sanitized.is_empty() {
            sanitized.push_str(&self.file_fallback);
        }
        sanitized.push_str(&extension.to_lowercase());
        sanitized
    }
}

/// Sanitizes a directory name with the default rules.
pub fn sanitize_dir_name(name: &str) -> String {
    NamingRules::default().directory_name(name)
}

/// Sanitizes a file name with the default rules.
pub fn sanitize_file_name(name: &str) -> String {
    NamingRules::default().file_name(name)
}

/// Splits `name` at its last `.`; the extension keeps the dot.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) => name.split_at(index),
        None => (name, ""),
    }
}

/// Lowercases `raw`, maps every char in `breaks` to `separator`, keeps only
/// ASCII lowercase letters, digits and the separator, and never emits a
/// separator at either end or twice in a row.
fn normalize(raw: &str, separator: char, breaks: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());

    for c in raw.chars().flat_map(char::to_lowercase) {
        let c = if breaks.contains(&c) { separator } else { c };

        if c == separator {
            if !out.is_empty() && !out.ends_with(separator) {
                out.push(separator);
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        }
    }

    if out.ends_with(separator) {
        out.pop();
    }
    out
}
