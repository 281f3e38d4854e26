//! Narrow interface to the `git` binary.
//!
//! Everything the exporter needs from version control goes through
//! [`GitRunner`]: run `git` with some arguments in some directory and hand
//! back standard output as text. [`SystemGit`] spawns the real binary; tests
//! substitute a scripted runner.
//!
//! The free functions in this module wrap the individual commands and parse
//! their output.

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::ExportError;
use crate::Result;

/// Config override that lets local-path submodules be cloned.
///
/// Recent git releases refuse the `file` transport for submodules unless
/// told otherwise, and exports are always run against a repository on disk.
const ALLOW_FILE_PROTOCOL: [&str; 2] = ["-c", "protocol.file.allow=always"];

/// Synchronous executor for `git` commands.
pub trait GitRunner {
    /// Runs `git <args>` with `dir` as the working directory.
    ///
    /// Returns captured standard output on a zero exit status.
    ///
    /// # Errors
    ///
    /// Returns `GitFailed` on a non-zero exit, `GitOutput` if standard output
    /// is not UTF-8, or `Io` if the process cannot be spawned.
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String>;
}

/// [`GitRunner`] backed by the `git` executable on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl SystemGit {
    /// Creates a runner that invokes `git` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Creates a runner that invokes the given executable.
    #[must_use]
    pub fn with_program<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRunner for SystemGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        debug!(dir = %dir.display(), "git {command}");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()?;

        if !output.status.success() {
            return Err(ExportError::GitFailed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ExportError::GitOutput {
            command,
            reason: "output is not valid UTF-8".to_string(),
        })
    }
}

/// Converts a path into a command-line argument.
pub(crate) fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        ExportError::invalid_config(format!("path is not valid UTF-8: {}", path.display()))
    })
}

/// Returns the top-level directory of the work tree containing `dir`.
pub fn toplevel<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<PathBuf> {
    let out = git.run(dir, &["rev-parse", "--show-toplevel"])?;
    let top = out.trim();
    if top.is_empty() {
        return Err(ExportError::GitOutput {
            command: "rev-parse --show-toplevel".to_string(),
            reason: "empty output".to_string(),
        });
    }
    Ok(PathBuf::from(top))
}

/// Resolves `revision` to a full commit id in the repository at `dir`.
///
/// Any failure to resolve is reported as `RevisionNotFound`.
pub fn resolve_commit<G: GitRunner + ?Sized>(git: &G, dir: &Path, revision: &str) -> Result<String> {
    let spec = format!("{revision}^{{commit}}");
    let not_found = || ExportError::RevisionNotFound {
        revision: revision.to_string(),
    };

    let out = git
        .run(dir, &["rev-parse", "--verify", "--quiet", &spec])
        .map_err(|_| not_found())?;
    let commit = out.trim();
    if commit.is_empty() || !commit.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(not_found());
    }
    Ok(commit.to_string())
}

/// Clones `source` into `dest`, recursing into submodules.
pub fn clone_recursive<G: GitRunner + ?Sized>(git: &G, source: &Path, dest: &Path) -> Result<()> {
    let mut args = ALLOW_FILE_PROTOCOL.to_vec();
    args.extend([
        "clone",
        "--quiet",
        "--recurse-submodules",
        path_arg(source)?,
        path_arg(dest)?,
    ]);
    git.run(source, &args)?;
    Ok(())
}

/// Hard-resets the work tree at `dir` to `commit`.
pub fn reset_hard<G: GitRunner + ?Sized>(git: &G, dir: &Path, commit: &str) -> Result<()> {
    git.run(dir, &["reset", "--quiet", "--hard", commit])?;
    Ok(())
}

/// Initializes and checks out all submodules recursively.
pub fn submodule_update_recursive<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<()> {
    let mut args = ALLOW_FILE_PROTOCOL.to_vec();
    args.extend(["submodule", "--quiet", "update", "--init", "--recursive"]);
    git.run(dir, &args)?;
    Ok(())
}

/// Runs `git submodule init` in `dir`.
pub fn submodule_init<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<()> {
    git.run(dir, &["submodule", "--quiet", "init"])?;
    Ok(())
}

/// Runs `git submodule update` in `dir`.
pub fn submodule_update<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<()> {
    let mut args = ALLOW_FILE_PROTOCOL.to_vec();
    args.extend(["submodule", "--quiet", "update"]);
    git.run(dir, &args)?;
    Ok(())
}

/// Lists tracked files of the repository at `dir`, relative to its root.
///
/// Submodules show up as single gitlink entries.
pub fn ls_files<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<Vec<String>> {
    let out = git.run(dir, &["ls-files", "-z", "--cached", "--full-name"])?;
    Ok(out
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect())
}

/// Lists the checked-out direct submodules of the repository at `dir`.
///
/// Paths are relative to the repository root.
pub fn submodule_paths<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<Vec<String>> {
    let out = git.run(dir, &["submodule", "--quiet", "foreach", "echo \"$sm_path\""])?;
    Ok(out
        .lines()
        .map(|line| line.trim().trim_end_matches('/'))
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Returns the global attributes file configured through
/// `core.attributesfile`, if any.
///
/// `git config --get` exits with status 1 when the key is unset, which is
/// not an error here.
pub fn global_attributes_file<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<Option<PathBuf>> {
    match git.run(dir, &["config", "--path", "--get", "core.attributesfile"]) {
        Ok(out) => {
            let value = out.trim();
            Ok((!value.is_empty()).then(|| dir.join(value)))
        }
        Err(ExportError::GitFailed { code: Some(1), .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Returns the path of the repository-local `info/attributes` file.
///
/// Uses `--git-path` so submodules whose `.git` is a file resolve to their
/// real git directory.
pub fn info_attributes_file<G: GitRunner + ?Sized>(git: &G, dir: &Path) -> Result<PathBuf> {
    let out = git.run(dir, &["rev-parse", "--git-path", "info/attributes"])?;
    let value = out.trim();
    if value.is_empty() {
        return Err(ExportError::GitOutput {
            command: "rev-parse --git-path info/attributes".to_string(),
            reason: "empty output".to_string(),
        });
    }
    Ok(dir.join(value))
}
