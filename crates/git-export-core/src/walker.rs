//! Submodule-aware enumeration of tracked files.
//!
//! [`RepoWalker`] lists every tracked file of a checked-out repository,
//! descends into its submodules and drops paths that are git metadata,
//! directories, or marked `export-ignore`.

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::Result;
use crate::attributes::ExclusionRules;
use crate::filters::is_vcs_internal;
use crate::git;
use crate::git::GitRunner;

/// Walks a repository and its submodules, yielding exportable file paths.
///
/// # Examples
///
/// ```no_run
/// use git_export_core::git::SystemGit;
/// use git_export_core::walker::RepoWalker;
/// use std::path::Path;
///
/// let git = SystemGit::new();
/// let files = RepoWalker::new(&git)
///     .with_attributes(true)
///     .list_files(Path::new("/tmp/checkout"))?;
/// for file in &files {
///     println!("{file}");
/// }
/// # Ok::<(), git_export_core::ExportError>(())
/// ```
#[derive(Debug)]
pub struct RepoWalker<'a, G: GitRunner + ?Sized> {
    git: &'a G,
    use_attributes: bool,
    force_submodules: bool,
    origin: Option<PathBuf>,
}

impl<'a, G: GitRunner + ?Sized> RepoWalker<'a, G> {
    /// Creates a walker that honors `export-ignore` and leaves submodules as
    /// they are checked out.
    #[must_use]
    pub fn new(git: &'a G) -> Self {
        Self {
            git,
            use_attributes: true,
            force_submodules: false,
            origin: None,
        }
    }

    /// Sets whether `export-ignore` rules are collected and applied.
    #[must_use]
    pub fn with_attributes(mut self, enabled: bool) -> Self {
        self.use_attributes = enabled;
        self
    }

    /// Sets whether each repository runs `git submodule init` and
    /// `git submodule update` before being listed.
    #[must_use]
    pub fn with_force_submodules(mut self, enabled: bool) -> Self {
        self.force_submodules = enabled;
        self
    }

    /// Sets the repository that untracked attribute rules are read from.
    ///
    /// A checkout cloned from `origin` carries neither its configuration nor
    /// its `info/attributes`. Submodules resolve to the matching path under
    /// `origin` when it is a checked-out repository, otherwise to the
    /// checkout itself. Without an origin the walked repository is used.
    #[must_use]
    pub fn with_origin<P: AsRef<Path>>(mut self, origin: P) -> Self {
        self.origin = Some(origin.as_ref().to_path_buf());
        self
    }

    /// Lists exportable files of the repository rooted at `root`.
    ///
    /// Paths are `/`-separated and relative to `root`. Parent files come in
    /// `git ls-files` order, followed by each submodule's files. A path is
    /// reported at most once.
    pub fn list_files(&self, root: &Path) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let origin = self.origin.as_deref().unwrap_or(root);
        let mut files = self.walk(root, origin)?;
        files.retain(|file| seen.insert(file.clone()));
        info!(count = files.len(), "enumerated exportable files");
        Ok(files)
    }

    fn walk(&self, repo: &Path, origin: &Path) -> Result<Vec<String>> {
        if self.force_submodules {
            debug!(repo = %repo.display(), "initializing submodules");
            git::submodule_init(self.git, repo)?;
            git::submodule_update(self.git, repo)?;
        }

        let mut tracked = git::ls_files(self.git, repo)?;
        let submodules = git::submodule_paths(self.git, repo)?;
        // Gitlinks are replaced by the submodule's own contents below
        tracked.retain(|file| !submodules.contains(file));

        let rules = if self.use_attributes {
            ExclusionRules::collect(self.git, repo, origin, &tracked)?
        } else {
            ExclusionRules::new()
        };

        let mut files = Vec::with_capacity(tracked.len());
        for file in tracked {
            if is_vcs_internal(&file) || is_directory(&repo.join(&file)) {
                continue;
            }
            if rules.is_excluded(&file) {
                debug!(path = %file, "excluded by export-ignore");
                continue;
            }
            files.push(file);
        }

        for submodule in &submodules {
            debug!(submodule = %submodule, "descending into submodule");
            let sub_repo = repo.join(submodule);
            let sub_origin = origin.join(submodule);
            let sub_origin = if sub_origin.join(".git").exists() {
                sub_origin
            } else {
                sub_repo.clone()
            };
            for file in self.walk(&sub_repo, &sub_origin)? {
                let path = format!("{submodule}/{file}");
                if is_vcs_internal(&path) || rules.is_excluded(&path) {
                    debug!(path = %path, "excluded by parent repository");
                    continue;
                }
                files.push(path);
            }
        }

        Ok(files)
    }
}

/// Real directories only; a symlink pointing at a directory is a leaf.
fn is_directory(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|meta| meta.is_dir())
}
