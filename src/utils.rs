/*!
 * Utility functions for local-gitingest
 */

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Extension of a file name, including the leading dot
///
/// The extension starts at the last `.` of the name; names without a dot have
/// the empty extension. `.bashrc` has the extension `.bashrc` and `archive.`
/// has the extension `.`.
pub fn file_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx..],
        None => "",
    }
}

/// Whether a directory name marks a hidden directory
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Number of lines in a text buffer, counting a trailing partial line
pub fn count_lines(content: &[u8]) -> usize {
    let newlines = content.iter().filter(|&&b| b == b'\n').count();
    match content.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Directory names whose subtrees are never scanned
///
/// Hidden directories (`.git`, `.svn`, `.hg`, ...) are pruned by name prefix
/// and need no entry here.
pub const DEFAULT_PRUNED_DIRS: &[&str] = &[
    // JavaScript dependencies
    "node_modules",
    // Vendored code (Go, PHP, Ruby)
    "vendor",
];
