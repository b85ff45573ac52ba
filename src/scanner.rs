/*!
 * Directory and file scanning functionality
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::config::{Config, ErrorPolicy, ExclusionConfig};
use crate::error::{IngestError, Result};
use crate::report::FileReportInfo;
use crate::types::Snapshot;
use crate::utils::{count_lines, file_extension, is_hidden};

/// Scanner statistics
#[derive(Debug, Clone, Default)]
pub struct ScannerStatistics {
    /// Number of files captured
    pub files_processed: usize,
    /// Total number of captured bytes
    pub total_bytes: u64,
    /// Total number of lines
    pub total_lines: usize,
    /// Files left out because of their extension
    pub skipped_by_extension: usize,
    /// Files left out because they exceed the size ceiling
    pub skipped_by_size: usize,
    /// Entries skipped after a read error
    pub skipped_unreadable: usize,
    /// Directories pruned with their subtrees
    pub dirs_pruned: usize,
    /// Details for each captured file
    pub file_details: HashMap<String, FileReportInfo>,
}

/// Scanner for directory contents
pub struct Scanner {
    /// Scanner configuration
    config: Config,
    /// Progress bar
    progress: ProgressBar,
    /// Scanner statistics
    statistics: ScannerStatistics,
}

impl Scanner {
    /// Create a new scanner
    pub fn new(config: Config, progress: ProgressBar) -> Self {
        Self {
            config,
            progress,
            statistics: ScannerStatistics::default(),
        }
    }

    /// Get scanner statistics
    pub fn get_statistics(&self) -> &ScannerStatistics {
        &self.statistics
    }

    /// Scan the target directory and return the snapshot
    ///
    /// The walk is depth first with siblings in file-name order. Pruned
    /// directories are never descended into.
    pub fn scan(&mut self) -> Result<Snapshot> {
        self.statistics = ScannerStatistics::default();

        let root = fs::canonicalize(&self.config.target_dir)?;
        let output_path = self.resolve_output_path();
        let mut snapshot = Snapshot::default();

        let pruned_dirs = self.config.pruned_dirs.clone();
        let mut dirs_pruned = 0;

        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let prune = e.depth() > 0
                    && e.file_type().is_dir()
                    && is_pruned(&e.file_name().to_string_lossy(), &pruned_dirs);
                if prune {
                    debug!(path = %e.path().display(), "pruning directory");
                    dirs_pruned += 1;
                }
                !prune
            });

        for next in walker {
            let entry = match next {
                Ok(entry) => entry,
                // The root must always be readable
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    self.handle_error(e.into())?;
                    continue;
                }
            };

            if entry.depth() == 0 {
                snapshot.tree.push_dir(0, root_name(&root));
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let depth = entry.depth() - 1;

            if entry.file_type().is_dir() {
                snapshot.tree.push_dir(depth, name);
                continue;
            }

            // Links are not followed into directories
            if entry.path_is_symlink() && entry.path().is_dir() {
                debug!(path = %entry.path().display(), "skipping symlinked directory");
                continue;
            }

            if output_path.as_deref() == Some(entry.path()) {
                trace!(path = %entry.path().display(), "skipping output file");
                continue;
            }

            if let Some(content) = self.process_file(&entry, &name)? {
                let rel_path = relative_path(&root, entry.path())?;
                snapshot.tree.push_file(depth, name);
                self.record_file(&rel_path, &content);
                snapshot.files.insert(rel_path, content);
            }
        }
        self.statistics.dirs_pruned = dirs_pruned;

        debug!(
            files = snapshot.files.len(),
            lines = snapshot.tree.len(),
            "scan complete"
        );
        Ok(snapshot)
    }

    /// Apply the file exclusion rules and read the file
    ///
    /// Returns `None` when the file is excluded or skipped as unreadable.
    fn process_file(&mut self, entry: &DirEntry, name: &str) -> Result<Option<Vec<u8>>> {
        let extension = file_extension(name);
        if self.config.exclusions.excludes_extension(extension) {
            trace!(path = %entry.path().display(), extension, "excluded by extension");
            self.statistics.skipped_by_extension += 1;
            return Ok(None);
        }

        if self.config.exclusions.max_size.is_some() {
            // Size of the content that will be read, through any symlink
            let size = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata.len(),
                Err(source) => {
                    self.handle_error(IngestError::Read {
                        path: entry.path().to_path_buf(),
                        source,
                    })?;
                    return Ok(None);
                }
            };
            if self.config.exclusions.exceeds_size(size) {
                trace!(path = %entry.path().display(), size, "excluded by size");
                self.statistics.skipped_by_size += 1;
                return Ok(None);
            }
        }

        self.progress.set_message(format!("Current file: {}", name));

        match fs::read(entry.path()) {
            Ok(content) => Ok(Some(content)),
            Err(source) => {
                self.handle_error(IngestError::Read {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
                Ok(None)
            }
        }
    }

    fn record_file(&mut self, rel_path: &str, content: &[u8]) {
        self.progress.inc(1);

        let lines = count_lines(content);
        let stats = &mut self.statistics;
        stats.files_processed += 1;
        stats.total_bytes += content.len() as u64;
        stats.total_lines += lines;
        stats.file_details.insert(
            rel_path.to_string(),
            FileReportInfo {
                lines,
                bytes: content.len() as u64,
            },
        );
    }

    /// Either propagate a filesystem error or log and count it, per the error policy
    fn handle_error(&mut self, err: IngestError) -> Result<()> {
        match self.config.error_policy {
            ErrorPolicy::SkipUnreadable if err.is_filesystem() => {
                warn!("Skipping unreadable entry: {}", err);
                self.statistics.skipped_unreadable += 1;
                Ok(())
            }
            _ => Err(err),
        }
    }

    /// Check if a directory below the root should be skipped with its subtree
    pub fn should_prune(&self, dir_name: &str) -> bool {
        is_pruned(dir_name, &self.config.pruned_dirs)
    }

    /// Absolute path of the output file, if it can be resolved
    fn resolve_output_path(&self) -> Option<PathBuf> {
        let output = &self.config.output_file;
        let parent = match output.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let file_name = output.file_name()?;
        fs::canonicalize(parent).ok().map(|p| p.join(file_name))
    }
}

/// Scan `root` with the given exclusion rules and default directory pruning
pub fn build_snapshot(root: &Path, exclusions: &ExclusionConfig) -> Result<Snapshot> {
    let mut config = Config::new(root);
    config.exclusions = exclusions.clone();
    // Nothing is written, so no output file needs to be skipped
    config.output_file = PathBuf::new();

    Scanner::new(config, ProgressBar::hidden()).scan()
}

/// Hidden directories and the configured dependency/build directories are pruned
fn is_pruned(dir_name: &str, pruned_dirs: &[String]) -> bool {
    is_hidden(dir_name) || pruned_dirs.iter().any(|d| d == dir_name)
}

fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        crate::error!(
            Unexpected,
            "{} is not below {}",
            path.display(),
            root.display()
        )
    })?;
    Ok(rel.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tree_lines(snapshot: &Snapshot) -> Vec<String> {
        snapshot
            .tree
            .lines()
            .iter()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn test_repository_scenario() {
        let dir = tempdir().unwrap();
        write(dir.path(), "readme.md", "Hi");
        write(dir.path(), ".git/HEAD", "ref: refs/heads/main");
        write(dir.path(), "src/main.ext", "code");

        let snapshot = build_snapshot(dir.path(), &ExclusionConfig::new()).unwrap();

        let lines = tree_lines(&snapshot);
        assert_eq!(&lines[1..], &["readme.md", "src/", "    main.ext"]);
        assert!(lines[0].ends_with('/'));
        assert!(lines.iter().all(|l| !l.contains("HEAD")));

        let files: Vec<(&str, &[u8])> = snapshot.files.iter().collect();
        assert_eq!(
            files,
            vec![("readme.md", &b"Hi"[..]), ("src/main.ext", &b"code"[..])]
        );
    }

    #[test]
    fn test_extension_exclusion() {
        let dir = tempdir().unwrap();
        write(dir.path(), "readme.md", "Hi");
        write(dir.path(), "src/main.ext", "code");

        let exclusions = ExclusionConfig::new().with_extensions([".ext"]);
        let snapshot = build_snapshot(dir.path(), &exclusions).unwrap();

        assert_eq!(snapshot.files.paths().collect::<Vec<_>>(), vec!["readme.md"]);
        assert!(tree_lines(&snapshot).iter().all(|l| !l.contains("main.ext")));
        // The directory itself is still listed
        assert!(tree_lines(&snapshot).contains(&"src/".to_string()));
    }

    #[test]
    fn test_extensionless_exclusion() {
        let dir = tempdir().unwrap();
        write(dir.path(), "Makefile", "all:");
        write(dir.path(), ".hiddenfile", "secret");
        write(dir.path(), "main.go", "package main");

        let exclusions = ExclusionConfig::new().with_extensions([""]);
        let snapshot = build_snapshot(dir.path(), &exclusions).unwrap();

        assert!(!snapshot.files.contains("Makefile"));
        assert!(snapshot.files.contains(".hiddenfile"));
        assert!(snapshot.files.contains("main.go"));
    }

    #[test]
    fn test_size_ceiling() {
        let dir = tempdir().unwrap();
        write(dir.path(), "small.txt", "ab");
        write(dir.path(), "large.txt", "0123456789");
        write(dir.path(), "exact.txt", "abc");

        let exclusions = ExclusionConfig::new().with_max_size(Some(3));
        let snapshot = build_snapshot(dir.path(), &exclusions).unwrap();

        assert!(snapshot.files.contains("small.txt"));
        assert!(snapshot.files.contains("exact.txt"));
        assert!(!snapshot.files.contains("large.txt"));
        assert!(tree_lines(&snapshot).iter().all(|l| !l.contains("large.txt")));

        let unlimited = build_snapshot(dir.path(), &ExclusionConfig::new()).unwrap();
        assert!(unlimited.files.contains("large.txt"));
    }

    #[test]
    fn test_pruned_directories() {
        let dir = tempdir().unwrap();
        write(dir.path(), "node_modules/pkg/index.js", "module.exports = 1");
        write(dir.path(), "vendor/lib.go", "package lib");
        write(dir.path(), ".cache/data.txt", "cached");
        write(dir.path(), "src/.hidden/inner.rs", "fn inner() {}");
        write(dir.path(), "src/lib.rs", "pub fn lib() {}");

        let snapshot = build_snapshot(dir.path(), &ExclusionConfig::new()).unwrap();

        assert_eq!(snapshot.files.paths().collect::<Vec<_>>(), vec!["src/lib.rs"]);
        let lines = tree_lines(&snapshot);
        for pruned in ["node_modules", "vendor", ".cache", ".hidden", "index.js", "inner.rs"] {
            assert!(
                lines.iter().all(|l| !l.contains(pruned)),
                "{} should not be listed: {:?}",
                pruned,
                lines
            );
        }
    }

    #[test]
    fn test_hidden_root_is_not_pruned() {
        let dir = tempdir().unwrap();
        let root = dir.path().join(".workspace");
        write(&root, "a.txt", "a");

        let snapshot = build_snapshot(&root, &ExclusionConfig::new()).unwrap();
        assert_eq!(tree_lines(&snapshot), vec![".workspace/", "a.txt"]);
        assert!(snapshot.files.contains("a.txt"));
    }

    #[test]
    fn test_vendor_root_is_not_pruned() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("vendor");
        write(&root, "a.txt", "a");

        let snapshot = build_snapshot(&root, &ExclusionConfig::new()).unwrap();
        assert!(snapshot.files.contains("a.txt"));
    }

    #[test]
    fn test_nested_indentation() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a/b/c/deep.txt", "deep");

        let snapshot = build_snapshot(dir.path(), &ExclusionConfig::new()).unwrap();
        assert_eq!(
            &tree_lines(&snapshot)[1..],
            &["a/", "    b/", "        c/", "            deep.txt"]
        );
        assert!(snapshot.files.contains("a/b/c/deep.txt"));
    }

    #[test]
    fn test_custom_pruned_dir() {
        let dir = tempdir().unwrap();
        write(dir.path(), "target/debug/out.txt", "build");
        write(dir.path(), "src/lib.rs", "lib");

        let mut config = Config::new(dir.path());
        config.pruned_dirs.push("target".to_string());
        let mut scanner = Scanner::new(config, ProgressBar::hidden());
        let snapshot = scanner.scan().unwrap();

        assert_eq!(snapshot.files.paths().collect::<Vec<_>>(), vec!["src/lib.rs"]);
        assert_eq!(scanner.get_statistics().dirs_pruned, 1);
        assert!(scanner.should_prune("target"));
        assert!(scanner.should_prune(".idea"));
        assert!(!scanner.should_prune("src"));
    }

    #[test]
    fn test_output_file_is_skipped() {
        let dir = tempdir().unwrap();
        write(dir.path(), "output.txt", "previous run");
        write(dir.path(), "lib.rs", "lib");

        let mut config = Config::new(dir.path());
        config.output_file = dir.path().join("output.txt");
        let snapshot = Scanner::new(config, ProgressBar::hidden()).scan().unwrap();

        assert!(!snapshot.files.contains("output.txt"));
        assert!(snapshot.files.contains("lib.rs"));
    }

    #[test]
    fn test_statistics() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.txt", "one\ntwo\n");
        write(dir.path(), "b.jpg", "binary");
        write(dir.path(), "c.txt", "0123456789");
        write(dir.path(), ".git/config", "[core]");

        let mut config = Config::new(dir.path());
        config.exclusions = ExclusionConfig::new()
            .with_extensions([".jpg"])
            .with_max_size(Some(8));
        let mut scanner = Scanner::new(config, ProgressBar::hidden());
        scanner.scan().unwrap();

        let stats = scanner.get_statistics();
        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.total_bytes, 8);
        assert_eq!(stats.total_lines, 2);
        assert_eq!(stats.skipped_by_extension, 1);
        assert_eq!(stats.skipped_by_size, 1);
        assert_eq!(stats.dirs_pruned, 1);
        assert_eq!(stats.file_details["a.txt"].lines, 2);
    }

    #[test]
    fn test_missing_root_fails() {
        let dir = tempdir().unwrap();
        let result = build_snapshot(&dir.path().join("missing"), &ExclusionConfig::new());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_policy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        write(dir.path(), "ok.txt", "fine");
        write(dir.path(), "locked.txt", "secret");
        let locked = dir.path().join("locked.txt");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o200)).unwrap();

        // Privileged users can read the file regardless of its mode
        if fs::read(&locked).is_ok() {
            return;
        }

        let result = build_snapshot(dir.path(), &ExclusionConfig::new());
        assert!(matches!(result, Err(IngestError::Read { .. })));

        let mut config = Config::new(dir.path());
        config.error_policy = ErrorPolicy::SkipUnreadable;
        let mut scanner = Scanner::new(config, ProgressBar::hidden());
        let snapshot = scanner.scan().unwrap();

        assert!(snapshot.files.contains("ok.txt"));
        assert!(!snapshot.files.contains("locked.txt"));
        assert!(tree_lines(&snapshot).iter().all(|l| !l.contains("locked.txt")));
        assert_eq!(scanner.get_statistics().skipped_unreadable, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_policy() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        write(dir.path(), "ok.txt", "fine");
        write(dir.path(), "sub/inner.txt", "hidden by permissions");
        let sub = dir.path().join("sub");
        fs::set_permissions(&sub, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users can list the directory regardless of its mode
        if fs::read_dir(&sub).is_ok() {
            fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = build_snapshot(dir.path(), &ExclusionConfig::new());
        assert!(matches!(result, Err(IngestError::Walk(_))));

        let mut config = Config::new(dir.path());
        config.error_policy = ErrorPolicy::SkipUnreadable;
        let mut scanner = Scanner::new(config, ProgressBar::hidden());
        let snapshot = scanner.scan().unwrap();

        fs::set_permissions(&sub, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(&tree_lines(&snapshot)[1..], &["ok.txt", "sub/"]);
        assert!(snapshot.files.paths().all(|p| !p.starts_with("sub/")));
        assert!(snapshot.files.contains("ok.txt"));
        assert_eq!(scanner.get_statistics().skipped_unreadable, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_size_ceiling_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let large = elsewhere.path().join("data.bin");
        fs::write(&large, vec![b'x'; 64 * 1024]).unwrap();
        let nested = elsewhere.path().join("a/rather/long/path/to/a/small/file");
        write(&nested, "tiny.txt", "ab");

        symlink(&large, dir.path().join("d")).unwrap();
        symlink(nested.join("tiny.txt"), dir.path().join("t.txt")).unwrap();

        // The link to the large file is itself only a few bytes long
        let exclusions = ExclusionConfig::new().with_max_size(Some(51200));
        let snapshot = build_snapshot(dir.path(), &exclusions).unwrap();
        assert!(!snapshot.files.contains("d"));
        assert!(tree_lines(&snapshot).iter().all(|l| l != "d"));

        // The link to the small file is longer than the ceiling
        let exclusions = ExclusionConfig::new().with_max_size(Some(3));
        let snapshot = build_snapshot(dir.path(), &exclusions).unwrap();
        assert_eq!(snapshot.files.get("t.txt"), Some(&b"ab"[..]));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_skipped() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        write(elsewhere.path(), "outside.txt", "outside");
        write(dir.path(), "lib.rs", "lib");
        symlink(elsewhere.path(), dir.path().join("linked")).unwrap();

        let snapshot = build_snapshot(dir.path(), &ExclusionConfig::new()).unwrap();
        assert_eq!(snapshot.files.paths().collect::<Vec<_>>(), vec!["lib.rs"]);
        assert!(tree_lines(&snapshot).iter().all(|l| !l.contains("linked")));
    }
}
