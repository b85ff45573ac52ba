/*!
 * local-gitingest - Convert a local Git repository into a single text file
 *
 * This library builds a flat text snapshot of a directory: an indented tree
 * of its structure followed by the contents of every included file, for use
 * as context for Large Language Models.
 */

pub mod config;
pub mod error;
pub mod git;
pub mod report;
pub mod scanner;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Args, Config, ErrorPolicy, ExclusionConfig};
pub use error::{IngestError, Result};
pub use git::is_repository_root;
pub use report::{FileReportInfo, ReportFormat, Reporter, ScanReport};
pub use scanner::{build_snapshot, Scanner, ScannerStatistics};
pub use types::{DirectoryTree, FileContentSet, Snapshot, TreeLine};
pub use utils::{file_extension, format_file_size};
pub use writer::{write_snapshot, TextWriter, SEPARATOR};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
