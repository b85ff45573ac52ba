/*!
 * Core types and data structures for local-gitingest
 */

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// Indentation used for one level of the directory tree
pub const INDENT: &str = "    ";

/// A single line of the directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Depth below the scan root
    pub depth: usize,
    /// Entry name (no path components)
    pub name: String,
    /// Whether the entry is a directory
    pub is_dir: bool,
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.depth {
            f.write_str(INDENT)?;
        }
        f.write_str(&self.name)?;
        if self.is_dir {
            f.write_str("/")?;
        }
        Ok(())
    }
}

/// Indented listing of every directory and file kept by a scan
///
/// Lines are recorded in the order the scanner visits them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryTree {
    lines: Vec<TreeLine>,
}

impl DirectoryTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a directory line
    pub fn push_dir(&mut self, depth: usize, name: impl Into<String>) {
        self.lines.push(TreeLine {
            depth,
            name: name.into(),
            is_dir: true,
        });
    }

    /// Record a file line
    pub fn push_file(&mut self, depth: usize, name: impl Into<String>) {
        self.lines.push(TreeLine {
            depth,
            name: name.into(),
            is_dir: false,
        });
    }

    pub fn lines(&self) -> &[TreeLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for DirectoryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Captured file contents keyed by root-relative path
///
/// Keys iterate in sorted order, which is the order files are serialized in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContentSet {
    files: BTreeMap<String, Vec<u8>>,
}

impl FileContentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, returning the previous content if the path was already present
    pub fn insert(&mut self, path: impl Into<String>, content: Vec<u8>) -> Option<Vec<u8>> {
        self.files.insert(path.into(), content)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Relative paths in serialization order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.files.iter(),
        }
    }

    /// Total number of captured bytes
    pub fn total_bytes(&self) -> u64 {
        self.files.values().map(|c| c.len() as u64).sum()
    }
}

/// Iterator over `(relative path, content)` pairs of a [`FileContentSet`]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Vec<u8>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(path, content)| (path.as_str(), content.as_slice()))
    }
}

impl<'a> IntoIterator for &'a FileContentSet {
    type Item = (&'a str, &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<Vec<u8>>> FromIterator<(K, V)> for FileContentSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Result of a single traversal
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Directory structure listing
    pub tree: DirectoryTree,
    /// Captured file contents
    pub files: FileContentSet,
}
