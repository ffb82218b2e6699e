//! Extension-based classification of files into destination folders.
//!
//! This module maps file extensions to the destination folder names configured
//! by the user. Destinations are kept in the order they were declared, and that
//! order decides which folder wins when an extension appears more than once.
//!
//! # Examples
//!
//! ```
//! use tidywatch::file_category::DestinationMap;
//!
//! let map = DestinationMap::new()
//!     .with_destination("images", [".jpg", ".png"])
//!     .with_destination("docs", [".pdf"]);
//!
//! assert_eq!(map.classify(".PNG"), Some("images"));
//! assert_eq!(map.classify(".pdf"), Some("docs"));
//! assert_eq!(map.classify(".txt"), None);
//! ```

use std::collections::HashSet;
use std::path::Path;

/// A destination folder and the extensions routed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Folder name, either relative to the source folder or absolute.
    pub name: String,
    /// Lowercase extensions, each with its leading dot.
    pub extensions: HashSet<String>,
}

impl Destination {
    /// Creates a destination, normalising every extension.
    ///
    /// Blank extensions are dropped.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.into(),
            extensions: extensions
                .into_iter()
                .filter_map(|ext| normalize_extension(ext.as_ref()))
                .collect(),
        }
    }
}

/// Ordered mapping from destination folder names to extension sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationMap {
    entries: Vec<Destination>,
}

impl DestinationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a destination and returns the map, for builder-style construction.
    pub fn with_destination<I, S>(mut self, name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.push(Destination::new(name, extensions));
        self
    }

    /// Appends a destination at the lowest priority.
    pub fn push(&mut self, destination: Destination) {
        self.entries.push(destination);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first destination folder whose extension set contains
    /// `extension`, comparing case-insensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidywatch::file_category::DestinationMap;
    ///
    /// let map = DestinationMap::new()
    ///     .with_destination("first", [".txt"])
    ///     .with_destination("second", [".txt", ".md"]);
    ///
    /// assert_eq!(map.classify(".TXT"), Some("first"));
    /// assert_eq!(map.classify(".md"), Some("second"));
    /// assert_eq!(map.classify(""), None);
    /// ```
    pub fn classify(&self, extension: &str) -> Option<&str> {
        let extension = normalize_extension(extension)?;
        self.entries
            .iter()
            .find(|d| d.extensions.contains(&extension))
            .map(|d| d.name.as_str())
    }

    /// Classifies a path by its extension.
    pub fn classify_path(&self, path: &Path) -> Option<&str> {
        extension_of(path).and_then(|ext| self.classify(&ext))
    }
}

/// Returns the lowercase extension of `path`, including the leading dot.
///
/// The split happens at the last dot of the file name, so `archive.tar.gz`
/// yields `.gz`. Names without a dot, or with only a leading dot such as
/// `.bashrc`, have no extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tidywatch::file_category::extension_of;
///
/// assert_eq!(extension_of(Path::new("a/Photo.JPG")), Some(".jpg".to_string()));
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), Some(".gz".to_string()));
/// assert_eq!(extension_of(Path::new("Makefile")), None);
/// ```
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

/// Lowercases an extension and prefixes a dot when missing.
///
/// Returns `None` for blank input.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    if lower.starts_with('.') {
        Some(lower)
    } else {
        Some(format!(".{}", lower))
    }
}
