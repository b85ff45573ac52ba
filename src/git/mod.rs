/*!
 * Git repository detection
 */

mod error;
mod repository;

// Re-export public items
pub use error::{GitError, GitResult};
pub use repository::Repository;

use std::path::Path;

use tracing::debug;

/// Name of the repository metadata entry in a working tree
pub const GIT_DIR_NAME: &str = ".git";

/// Check whether `path` lies in a Git working tree
///
/// A `.git` entry directly inside `path` is accepted without opening the
/// repository. Otherwise the repository is discovered from `path` upwards,
/// which covers running from a subdirectory.
pub fn is_repository_root(path: &Path) -> bool {
    if path.join(GIT_DIR_NAME).exists() {
        return true;
    }

    match Repository::discover(path) {
        Ok(repo) => {
            debug!(workdir = %repo.workdir().display(), "found enclosing repository");
            true
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no repository found");
            false
        }
    }
}
