//! Disposable checkout of the repository being exported.

use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;
use tracing::debug;
use tracing::info;

use crate::Result;
use crate::git;
use crate::git::GitRunner;

/// Name prefix of the temporary directory holding a checkout.
pub const CHECKOUT_DIR_PREFIX: &str = "git-export-";

/// Temporary clone of a repository at a fixed commit, submodules included.
///
/// The clone lives in a fresh temporary directory that is removed when the
/// checkout is dropped, whether the export succeeded or not. Use
/// [`Checkout::close`] to observe removal errors.
#[derive(Debug)]
pub struct Checkout {
    dir: TempDir,
    source: PathBuf,
    commit: String,
}

impl Checkout {
    /// Clones the repository whose top-level directory is `source` at
    /// `revision`.
    ///
    /// Use [`git::toplevel`] to find `source` from any directory inside the
    /// work tree. The revision is resolved in the source repository first,
    /// so branch names, tags and abbreviated ids all work and a bad revision
    /// fails before anything is cloned.
    ///
    /// # Errors
    ///
    /// Returns `RevisionNotFound` if `revision` does not name a commit, and
    /// `GitFailed` if any clone, reset or submodule step exits non-zero. The
    /// temporary directory is removed on every error path.
    pub fn prepare<G: GitRunner + ?Sized>(git: &G, source: &Path, revision: &str) -> Result<Self> {
        let source = source.to_path_buf();
        let commit = git::resolve_commit(git, &source, revision)?;
        info!(source = %source.display(), %revision, %commit, "preparing checkout");

        let dir = tempfile::Builder::new()
            .prefix(CHECKOUT_DIR_PREFIX)
            .tempdir()?;
        debug!(path = %dir.path().display(), "cloning into temporary directory");

        git::clone_recursive(git, &source, dir.path())?;
        git::reset_hard(git, dir.path(), &commit)?;
        git::submodule_update_recursive(git, dir.path())?;

        Ok(Self {
            dir,
            source,
            commit,
        })
    }

    /// Root of the checked-out work tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Top-level directory of the repository that was cloned.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Full id of the checked-out commit.
    #[must_use]
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Removes the checkout, reporting any failure to do so.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!(path = %path.display(), "removed checkout");
        Ok(())
    }
}
