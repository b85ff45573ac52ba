/*!
 * Git working tree lookup
 */

use std::path::{Path, PathBuf};

use git2::Repository as Git2Repository;

use super::error::{GitError, GitResult};

/// Git working tree that contains a given path
pub struct Repository {
    /// Top-level directory of the working tree
    workdir: PathBuf,
}

impl Repository {
    /// Find the repository containing `path`, searching parent directories
    pub fn discover(path: &Path) -> GitResult<Self> {
        let repo = Git2Repository::discover(path).map_err(GitError::DiscoverError)?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitError::Bare(repo.path().to_path_buf()))?;

        Ok(Self { workdir })
    }

    /// Top-level directory of the working tree
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}
