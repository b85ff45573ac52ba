/*!
 * Flat text writer implementation for local-gitingest
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};

use tracing::debug;

use crate::config::Config;
use crate::error::{IngestError, Result};
use crate::types::{DirectoryTree, FileContentSet, Snapshot};

/// Line framing each file header, 48 `=` characters
pub const SEPARATOR: &str = "================================================";

/// Write the tree and file blocks to `out`
///
/// Layout: the tree text, a blank line, then per file a separator, a
/// `File: <path>` header, a second separator, the raw content and `\n\n`.
/// Files are written in the order of the content set.
pub fn write_snapshot<W: Write>(
    out: &mut W,
    tree: &DirectoryTree,
    files: &FileContentSet,
) -> io::Result<()> {
    write!(out, "{}", tree)?;
    out.write_all(b"\n")?;

    for (path, content) in files {
        writeln!(out, "{}", SEPARATOR)?;
        writeln!(out, "File: {}", path)?;
        writeln!(out, "{}", SEPARATOR)?;
        out.write_all(content)?;
        out.write_all(b"\n\n")?;
    }

    Ok(())
}

/// Text writer for snapshots
pub struct TextWriter {
    /// Writer configuration
    config: Config,
}

impl TextWriter {
    /// Create a new text writer
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Write the snapshot to the configured output file
    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let path = &self.config.output_file;
        let output_error = |source| IngestError::Output {
            path: path.clone(),
            source,
        };

        let file = File::create(path).map_err(output_error)?;
        let mut writer = BufWriter::new(file);

        write_snapshot(&mut writer, &snapshot.tree, &snapshot.files).map_err(output_error)?;
        writer.flush().map_err(output_error)?;

        debug!(
            path = %path.display(),
            blocks = snapshot.files.len(),
            "wrote snapshot"
        );
        Ok(())
    }
}
