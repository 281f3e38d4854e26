//! Test doubles for code that talks to git.
//!
//! # Panics
//!
//! Helpers here may panic; they are only compiled for tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::ExportError;
use crate::Result;
use crate::git::GitRunner;

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Exit { code: i32, stderr: String },
}

#[derive(Debug, Clone)]
struct Rule {
    dir: Option<PathBuf>,
    command: String,
    prefix: bool,
    reply: Reply,
}

impl Rule {
    fn matches(&self, command: &str) -> bool {
        if self.prefix {
            command.starts_with(&self.command)
        } else {
            self.command == command
        }
    }
}

/// [`GitRunner`] that answers from a script instead of spawning git.
///
/// Commands are matched on their space-joined arguments. Rules bound to a
/// directory win over rules that match any directory. Unscripted commands
/// fail with exit code 127 so missing expectations surface as errors.
#[derive(Debug, Default)]
pub struct ScriptedGit {
    rules: Vec<Rule>,
    calls: RefCell<Vec<(PathBuf, String)>>,
}

impl ScriptedGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies with `stdout` to `command` in any directory.
    pub fn on(mut self, command: &str, stdout: &str) -> Self {
        self.rules.push(Rule {
            dir: None,
            command: command.to_string(),
            prefix: false,
            reply: Reply::Stdout(stdout.to_string()),
        });
        self
    }

    /// Replies with `stdout` to `command` run in `dir`.
    pub fn on_in(mut self, dir: &Path, command: &str, stdout: &str) -> Self {
        self.rules.push(Rule {
            dir: Some(dir.to_path_buf()),
            command: command.to_string(),
            prefix: false,
            reply: Reply::Stdout(stdout.to_string()),
        });
        self
    }

    /// Replies with `stdout` to any command starting with `prefix`.
    pub fn on_prefix(mut self, prefix: &str, stdout: &str) -> Self {
        self.rules.push(Rule {
            dir: None,
            command: prefix.to_string(),
            prefix: true,
            reply: Reply::Stdout(stdout.to_string()),
        });
        self
    }

    /// Fails any command starting with `prefix`.
    pub fn fail_prefix(mut self, prefix: &str, code: i32, stderr: &str) -> Self {
        self.rules.push(Rule {
            dir: None,
            command: prefix.to_string(),
            prefix: true,
            reply: Reply::Exit {
                code,
                stderr: stderr.to_string(),
            },
        });
        self
    }

    /// Fails `command` in any directory with the given exit code.
    pub fn fail(mut self, command: &str, code: i32, stderr: &str) -> Self {
        self.rules.push(Rule {
            dir: None,
            command: command.to_string(),
            prefix: false,
            reply: Reply::Exit {
                code,
                stderr: stderr.to_string(),
            },
        });
        self
    }

    /// Scripts the commands the walker issues for one repository with no
    /// attribute configuration.
    pub fn repo(self, dir: &Path, files: &[&str], submodules: &[&str]) -> Self {
        let mut listing = files.join("\0");
        listing.push('\0');
        let mut subs = submodules.join("\n");
        subs.push('\n');
        let mut scripted = self
            .on_in(dir, "ls-files -z --cached --full-name", &listing)
            .on_in(dir, "submodule --quiet foreach echo \"$sm_path\"", &subs)
            .on_in(
                dir,
                "rev-parse --git-path info/attributes",
                ".git/info/attributes\n",
            );
        scripted.rules.push(Rule {
            dir: Some(dir.to_path_buf()),
            command: "config --path --get core.attributesfile".to_string(),
            prefix: false,
            reply: Reply::Exit {
                code: 1,
                stderr: String::new(),
            },
        });
        scripted
    }

    /// Every command run so far, with its working directory.
    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.borrow().clone()
    }

    /// Number of times `command` was run, in any directory.
    pub fn count(&self, command: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|(_, c)| c == command)
            .count()
    }
}

impl GitRunner for ScriptedGit {
    fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        let command = args.join(" ");
        self.calls
            .borrow_mut()
            .push((dir.to_path_buf(), command.clone()));

        let rule = self
            .rules
            .iter()
            .find(|r| r.matches(&command) && r.dir.as_deref() == Some(dir))
            .or_else(|| {
                self.rules
                    .iter()
                    .find(|r| r.matches(&command) && r.dir.is_none())
            });

        match rule.map(|r| &r.reply) {
            Some(Reply::Stdout(out)) => Ok(out.clone()),
            Some(Reply::Exit { code, stderr }) => Err(ExportError::GitFailed {
                command,
                code: Some(*code),
                stderr: stderr.clone(),
            }),
            None => Err(ExportError::GitFailed {
                command,
                code: Some(127),
                stderr: format!("unscripted command in {}", dir.display()),
            }),
        }
    }
}

/// Writes `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
