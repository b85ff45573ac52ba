/*!
 * Configuration handling for local-gitingest
 */

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::Parser;
use clap_complete::Shell;
use tracing::warn;

use crate::error::Result;
use crate::utils::DEFAULT_PRUNED_DIRS;

/// Default output file name
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Default size ceiling in bytes (50 KB)
pub const DEFAULT_MAX_SIZE: u64 = 50 * 1024;

/// Long options that may also be spelled with a single dash
const LONG_FLAGS: &[&str] = &[
    "exclude",
    "size-limit",
    "max-size",
    "keep-extensionless",
    "skip-dir",
    "skip-unreadable",
    "report",
    "verbose",
    "generate",
    "help",
    "version",
];

/// Command-line arguments for local-gitingest
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "local-gitingest",
    version = env!("CARGO_PKG_VERSION"),
    about = "Convert a local Git repository to a single text file",
    long_about = "Generates a text file containing the repository's directory structure and file contents, \
                  excluding specified file types and those exceeding a size limit. \
                  This is useful for providing context to large language models or creating project snapshots.",
    after_help = "This tool must be run from inside a Git working tree."
)]
pub struct Args {
    /// Directory to snapshot
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Comma-separated list of file extensions to exclude (e.g., .jpg,.png,.gif)
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Output file name
    #[clap(short = 'o', long = "output", default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    /// Enable file size limit
    #[clap(long)]
    pub size_limit: bool,

    /// Maximum file size in bytes, used with --size-limit
    #[clap(long, default_value_t = DEFAULT_MAX_SIZE)]
    pub max_size: u64,

    /// Capture files without an extension (excluded by default)
    #[clap(long)]
    pub keep_extensionless: bool,

    /// Additional directory names to skip, with their contents
    #[clap(long, value_delimiter = ',')]
    pub skip_dir: Vec<String>,

    /// Skip unreadable files and directories instead of aborting
    #[clap(long)]
    pub skip_unreadable: bool,

    /// Print a summary table after writing the output
    #[clap(long)]
    pub report: bool,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

impl Args {
    /// Parse arguments, accepting single-dash long flags such as `-exclude`
    pub fn try_parse_normalized<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize_args(args))
    }
}

/// Rewrite `-flag` and `-flag=value` into `--flag` forms for known long flags
///
/// Arguments after a bare `--` are left untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut after_terminator = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if after_terminator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                after_terminator = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or_default();
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("--{}", rest))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// How filesystem errors during a scan are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the scan on the first error
    #[default]
    FailFast,
    /// Log and skip entries that cannot be read
    SkipUnreadable,
}

/// File-level exclusion rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionConfig {
    /// Extensions to exclude, compared verbatim (`""` means no extension)
    pub extensions: HashSet<String>,
    /// Size ceiling in bytes; `None` disables the check
    pub max_size: Option<u64>,
}

impl ExclusionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the given extensions
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions.extend(extensions.into_iter().map(Into::into));
        self
    }

    /// Set the size ceiling
    pub fn with_max_size(mut self, max_size: Option<u64>) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn excludes_extension(&self, extension: &str) -> bool {
        self.extensions.contains(extension)
    }

    /// Whether a file of `size` bytes is over the ceiling
    pub fn exceeds_size(&self, size: u64) -> bool {
        self.max_size.is_some_and(|max| size > max)
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory to snapshot
    pub target_dir: PathBuf,

    /// Output text file path
    pub output_file: PathBuf,

    /// File exclusion rules
    pub exclusions: ExclusionConfig,

    /// Directory names pruned with their subtrees
    pub pruned_dirs: Vec<String>,

    /// Handling of unreadable entries
    pub error_policy: ErrorPolicy,

    /// Print a summary report
    pub report: bool,

    /// Enable debug logging
    pub verbose: bool,
}

impl Config {
    /// Configuration for `target_dir` with no exclusions and default pruning
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            exclusions: ExclusionConfig::new(),
            pruned_dirs: DEFAULT_PRUNED_DIRS.iter().map(|d| d.to_string()).collect(),
            error_policy: ErrorPolicy::FailFast,
            report: false,
            verbose: false,
        }
    }

    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let mut extensions: HashSet<String> = args
            .exclude
            .iter()
            .map(|ext| ext.trim().to_string())
            .collect();
        if !args.keep_extensionless {
            // Extensionless files are usually executables
            extensions.insert(String::new());
        }
        for ext in extensions.iter().filter(|e| !e.is_empty()) {
            if !ext.starts_with('.') {
                warn!(extension = %ext, "exclusion has no leading '.', it only matches names that end with it after a dot");
            }
        }

        let mut config = Self::new(args.directory_path);
        config.output_file = PathBuf::from(args.output_file);
        config.exclusions = ExclusionConfig {
            extensions,
            max_size: args.size_limit.then_some(args.max_size),
        };
        config.pruned_dirs.extend(
            args.skip_dir
                .into_iter()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        );
        config.error_policy = if args.skip_unreadable {
            ErrorPolicy::SkipUnreadable
        } else {
            ErrorPolicy::FailFast
        };
        config.report = args.report;
        config.verbose = args.verbose;
        config
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.target_dir.is_dir(),
            PathNotFound,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        // Check if output file directory exists
        if let Some(parent) = self.output_file.parent() {
            crate::ensure!(
                parent == Path::new("") || parent.is_dir(),
                Config,
                "Output directory not found: {}",
                parent.display()
            );
        }

        Ok(())
    }
}
