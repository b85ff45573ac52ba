/*!
 * Error types for Git operations
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during Git operations
#[derive(Error, Debug)]
pub enum GitError {
    /// No repository found at or above the path
    #[error("Failed to discover repository: {0}")]
    DiscoverError(git2::Error),

    /// Repository has no working tree to snapshot
    #[error("Repository has no working tree: {}", .0.display())]
    Bare(PathBuf),
}

/// Specialized Result type for Git operations
pub type GitResult<T> = Result<T, GitError>;
