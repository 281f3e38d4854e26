//! `export-ignore` rules gathered from gitattributes files.
//!
//! Rules are keyed by the directory that declared them, expressed as path
//! components relative to the repository root. The root directory is the
//! empty key and also receives the global and repository-local attribute
//! files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::filters::fnmatch;
use crate::git;
use crate::git::GitRunner;

/// Per-directory attributes file name.
pub const ATTRIBUTES_FILE_NAME: &str = ".gitattributes";

/// Attribute that removes matching paths from exports.
pub const EXPORT_IGNORE: &str = "export-ignore";

/// Extracts the pattern from one gitattributes line if the line sets
/// `export-ignore`.
///
/// The first whitespace-separated token is the pattern; the marker must be
/// one of the later tokens. Blank lines and `#` comments yield nothing.
///
/// # Examples
///
/// ```
/// use git_export_core::attributes::export_ignore_pattern;
///
/// assert_eq!(export_ignore_pattern("build/* export-ignore"), Some("build/*"));
/// assert_eq!(export_ignore_pattern("*.sh text eol=lf"), None);
/// assert_eq!(export_ignore_pattern("export-ignore"), None);
/// ```
#[must_use]
pub fn export_ignore_pattern(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    let pattern = tokens.next()?;
    if pattern.starts_with('#') {
        return None;
    }
    tokens.any(|t| t == EXPORT_IGNORE).then_some(pattern)
}

/// Reads every `export-ignore` pattern from an attributes file.
///
/// A missing file, or a path that is not a regular file, yields no patterns.
pub fn read_patterns(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text
        .lines()
        .filter_map(export_ignore_pattern)
        .map(str::to_string)
        .collect())
}

/// Splits the directory part of a `/`-separated path into components.
fn dir_components(path: &str) -> Vec<String> {
    let mut components: Vec<String> = path
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .map(str::to_string)
        .collect();
    components.pop();
    components
}

/// `export-ignore` patterns of one repository, keyed by declaring directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    rules: HashMap<Vec<String>, Vec<String>>,
}

impl ExclusionRules {
    /// Creates an empty rule set that excludes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects the rules that apply to the work tree at `repo`.
    ///
    /// `tracked` is the work tree's tracked-file listing, relative to its
    /// root. `origin` is the repository whose configuration and git
    /// directory hold the untracked rules: the repository a checkout was
    /// cloned from, or `repo` itself. Sources, in order of precedence within
    /// the root entry: the global `core.attributesfile`, the root
    /// `.gitattributes`, then `info/attributes`.
    pub fn collect<G: GitRunner + ?Sized>(
        git: &G,
        repo: &Path,
        origin: &Path,
        tracked: &[String],
    ) -> Result<Self> {
        let mut rules = Self::new();

        if let Some(global) = git::global_attributes_file(git, origin)? {
            debug!(path = %global.display(), "reading global attributes");
            rules.extend_dir(Vec::new(), read_patterns(&global)?);
        }

        for file in tracked
            .iter()
            .filter(|f| f.rsplit('/').next() == Some(ATTRIBUTES_FILE_NAME))
        {
            let patterns = read_patterns(&repo.join(file))?;
            debug!(file = %file, count = patterns.len(), "reading attributes");
            rules.extend_dir(dir_components(file), patterns);
        }

        let local = git::info_attributes_file(git, origin)?;
        debug!(path = %local.display(), "reading repository attributes");
        rules.extend_dir(Vec::new(), read_patterns(&local)?);

        Ok(rules)
    }

    /// Appends patterns declared by the directory with the given components.
    pub fn extend_dir(&mut self, dir: Vec<String>, patterns: Vec<String>) {
        if patterns.is_empty() {
            return;
        }
        self.rules.entry(dir).or_default().extend(patterns);
    }

    /// Patterns declared by one directory, if any.
    #[must_use]
    pub fn patterns_for(&self, dir: &[&str]) -> Option<&[String]> {
        let key: Vec<String> = dir.iter().map(|c| (*c).to_string()).collect();
        self.rules.get(&key).map(Vec::as_slice)
    }

    /// Returns `true` if no directory declares any pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks whether a repository-relative path is export-ignored.
    ///
    /// Walks from the file's own directory up to the root. At each level the
    /// file's base name and its full repository-relative path are tested
    /// against that level's patterns; the first match excludes.
    ///
    /// # Examples
    ///
    /// ```
    /// use git_export_core::attributes::ExclusionRules;
    ///
    /// let mut rules = ExclusionRules::new();
    /// rules.extend_dir(vec![], vec!["build/*".to_string()]);
    /// rules.extend_dir(vec!["docs".to_string()], vec!["*.draft".to_string()]);
    ///
    /// assert!(rules.is_excluded("build/out/app"));
    /// assert!(rules.is_excluded("docs/guide/intro.draft"));
    /// assert!(!rules.is_excluded("intro.draft"));
    /// assert!(!rules.is_excluded("src/main.rs"));
    /// ```
    #[must_use]
    pub fn is_excluded(&self, path: &str) -> bool {
        if self.rules.is_empty() {
            return false;
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        let mut level = dir_components(path);
        loop {
            if let Some(patterns) = self.rules.get(&level)
                && patterns
                    .iter()
                    .any(|p| fnmatch(file_name, p) || fnmatch(path, p))
            {
                return true;
            }
            if level.pop().is_none() {
                return false;
            }
        }
    }
}
