//! Path filtering logic for repository export.
//!
//! This module provides the shell-glob matcher used by `export-ignore` rules
//! and the test that keeps git's own metadata out of archives.

/// Name of git's metadata directory (or gitfile inside submodules).
pub const GIT_DIR_NAME: &str = ".git";

/// Checks if a `/`-separated relative path points into git metadata.
///
/// Any component equal to `.git` marks the path as internal. Files that
/// merely start with `.git`, such as `.gitattributes`, are ordinary content.
///
/// # Examples
///
/// ```
/// use git_export_core::filters;
///
/// assert!(filters::is_vcs_internal(".git"));
/// assert!(filters::is_vcs_internal("sub/.git"));
/// assert!(filters::is_vcs_internal(".git/config"));
/// assert!(!filters::is_vcs_internal(".gitattributes"));
/// assert!(!filters::is_vcs_internal("docs/git/intro.md"));
/// ```
#[must_use]
pub fn is_vcs_internal(path: &str) -> bool {
    path.split('/').any(|component| component == GIT_DIR_NAME)
}

/// Matches a string against a shell-style glob pattern.
///
/// Supports:
/// - `*` matches any run of characters, including `/`
/// - `?` matches exactly one character
/// - `[abc]`, `[a-z]` character sets and ranges, `[!abc]` negated sets
/// - an unterminated `[` matches itself literally
///
/// Matching is case-sensitive.
///
/// # Examples
///
/// ```
/// use git_export_core::filters::fnmatch;
///
/// assert!(fnmatch("notes.txt", "*.txt"));
/// assert!(fnmatch("build/out/app.o", "build/*"));
/// assert!(fnmatch("v1.log", "v?.log"));
/// assert!(fnmatch("b.rs", "[a-c].rs"));
/// assert!(!fnmatch("d.rs", "[a-c].rs"));
/// assert!(fnmatch("d.rs", "[!a-c].rs"));
/// ```
#[must_use]
pub fn fnmatch(name: &str, pattern: &str) -> bool {
    let name: Vec<char> = name.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();

    let mut ni = 0;
    let mut pi = 0;
    // Position after the most recent `*` and the name index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < name.len() {
        if pi < pattern.len() {
            if pattern[pi] == '*' {
                pi += 1;
                backtrack = Some((pi, ni));
                continue;
            }
            if let Some(next) = match_one(&pattern, pi, name[ni]) {
                pi = next;
                ni += 1;
                continue;
            }
        }

        match backtrack {
            Some((star_pi, star_ni)) => {
                pi = star_pi;
                ni = star_ni + 1;
                backtrack = Some((star_pi, star_ni + 1));
            }
            None => return false,
        }
    }

    pattern[pi..].iter().all(|&c| c == '*')
}

/// Matches a single pattern element at `pi` against `c`.
///
/// Returns the index of the next pattern element on success.
fn match_one(pattern: &[char], pi: usize, c: char) -> Option<usize> {
    match pattern[pi] {
        '?' => Some(pi + 1),
        '[' => match parse_class(pattern, pi) {
            Some((matched, next)) => matched(c).then_some(next),
            None => (c == '[').then_some(pi + 1),
        },
        literal => (literal == c).then_some(pi + 1),
    }
}

/// Parses the bracket expression starting at `start`.
///
/// Returns a predicate for the set and the index just past the closing `]`,
/// or `None` when the bracket is never closed.
fn parse_class(pattern: &[char], start: usize) -> Option<(impl Fn(char) -> bool, usize)> {
    let mut i = start + 1;
    let negated = pattern.get(i) == Some(&'!');
    if negated {
        i += 1;
    }

    let mut ranges: Vec<(char, char)> = Vec::new();
    // A `]` right after the opening bracket is a literal member
    if pattern.get(i) == Some(&']') {
        ranges.push((']', ']'));
        i += 1;
    }

    loop {
        let &c = pattern.get(i)?;
        if c == ']' {
            break;
        }
        match (pattern.get(i + 1), pattern.get(i + 2)) {
            (Some('-'), Some(&hi)) if hi != ']' => {
                ranges.push((c, hi));
                i += 3;
            }
            _ => {
                ranges.push((c, c));
                i += 1;
            }
        }
    }

    let predicate = move |ch: char| {
        let hit = ranges.iter().any(|&(lo, hi)| lo <= ch && ch <= hi);
        hit != negated
    };
    Some((predicate, i + 1))
}
