// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! System package management through Ansible.
//!
//! Packages are installed by an Ansible playbook. Each role of the playbook
//! installs and configures one package, and can be tagged so that only a
//! subset of roles get run.
//!
//! # Playbook Layout
//!
//! Dotcfg only cares about the `roles` listing of each play. A role entry is
//! either a bare role name, or a mapping with a `role` key and an optional
//! `tags` key. Anything else is skipped.
//!
//! ```yaml
//! - hosts: localhost
//!   roles:
//!     - common
//!     - role: nvim
//!       tags: [nvim, editor]
//! ```
//!
//! # Installation
//!
//! Installation is a straight pass through to `ansible-playbook`. Dotcfg
//! makes no attempt to interpret what Ansible does, it only reports whether
//! Ansible could be run, and whether it succeeded.

use serde_yaml::Value;
use std::{
    ffi::{OsStr, OsString},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{debug, info, instrument};

/// Name of Ansible binary used for installation.
pub const ANSIBLE_PLAYBOOK: &str = "ansible-playbook";

/// Role of playbook along with its tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageRole {
    /// Name of role.
    pub name: String,

    /// Tags that select role.
    pub tags: Vec<String>,
}

/// Layer of indirection for running external programs.
pub trait PlaybookRunner {
    /// Run program with arguments inside of working directory.
    ///
    /// Returns exit code of program. Programs killed by a signal have no
    /// exit code.
    fn run(
        &self,
        program: &OsStr,
        args: &[OsString],
        current_dir: &Path,
    ) -> std::io::Result<Option<i32>>;
}

/// Run programs as child processes of current process.
///
/// Blocks current process until child exits. Child inherits standard input,
/// output, and error so Ansible can prompt for passwords.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnsibleRunner;

impl PlaybookRunner for AnsibleRunner {
    fn run(
        &self,
        program: &OsStr,
        args: &[OsString],
        current_dir: &Path,
    ) -> std::io::Result<Option<i32>> {
        let status = Command::new(program)
            .args(args)
            .current_dir(current_dir)
            .spawn()?
            .wait()?;

        Ok(status.code())
    }
}

/// Package management over Ansible playbook.
#[derive(Debug, Clone)]
pub struct Packages<R = AnsibleRunner>
where
    R: PlaybookRunner,
{
    playbook: PathBuf,
    ansible_dir: PathBuf,
    runner: R,
}

impl Packages<AnsibleRunner> {
    /// Construct new package manager that runs the real Ansible.
    ///
    /// Without an explicit Ansible directory, the grandparent directory of
    /// the playbook is used, i.e., `ansible/playbooks/bootstrap.yml` runs
    /// inside of `ansible/`.
    pub fn new(playbook: impl Into<PathBuf>, ansible_dir: Option<PathBuf>) -> Self {
        Self::with_runner(playbook, ansible_dir, AnsibleRunner)
    }
}

impl<R> Packages<R>
where
    R: PlaybookRunner,
{
    /// Construct new package manager with custom program runner.
    pub fn with_runner(playbook: impl Into<PathBuf>, ansible_dir: Option<PathBuf>, runner: R) -> Self {
        let playbook = playbook.into();
        let ansible_dir = ansible_dir.unwrap_or_else(|| {
            playbook
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_default()
        });

        Self {
            playbook,
            ansible_dir,
            runner,
        }
    }

    /// Path to playbook.
    pub fn playbook(&self) -> &Path {
        self.playbook.as_path()
    }

    /// Working directory of Ansible.
    pub fn ansible_dir(&self) -> &Path {
        self.ansible_dir.as_path()
    }

    /// List roles of playbook in document order.
    ///
    /// # Errors
    ///
    /// - Return [`Error::PlaybookNotFound`] if playbook does not exist.
    /// - Return [`Error::ReadPlaybook`] if playbook cannot be read.
    /// - Return [`Error::Parse`] if playbook is not valid YAML.
    #[instrument(skip(self), level = "debug")]
    pub fn list_roles(&self) -> Result<Vec<PackageRole>> {
        if !self.playbook.exists() {
            return Err(Error::PlaybookNotFound {
                playbook: self.playbook.clone(),
            });
        }

        let content = read_to_string(&self.playbook).map_err(|err| Error::ReadPlaybook {
            source: err,
            playbook: self.playbook.clone(),
        })?;
        let roles = parse_roles(&content)?;
        debug!("found {} roles in {:?}", roles.len(), self.playbook.display());

        Ok(roles)
    }

    /// Install packages by running playbook.
    ///
    /// Tags are joined by commas into a single `--tags` argument. Extra
    /// arguments are passed along to Ansible untouched after everything else.
    ///
    /// # Errors
    ///
    /// - Return [`Error::AnsibleNotFound`] if Ansible is not installed.
    /// - Return [`Error::AnsibleFailed`] if Ansible exits unsuccessfully.
    /// - Return [`Error::Spawn`] if Ansible cannot be run for any other reason.
    #[instrument(skip(self, tags, extra_args), level = "debug")]
    pub fn install(
        &self,
        tags: impl IntoIterator<Item = impl Into<String>>,
        extra_args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Result<()> {
        let args = self.expand_bin_args(tags, extra_args);
        info!(
            "run {ANSIBLE_PLAYBOOK} {} in {:?}",
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" "),
            self.ansible_dir.display()
        );

        let code = self
            .runner
            .run(OsStr::new(ANSIBLE_PLAYBOOK), &args, &self.ansible_dir)
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => Error::AnsibleNotFound,
                _ => Error::Spawn(err),
            })?;

        match code {
            Some(0) => Ok(()),
            code => Err(Error::AnsibleFailed { code }),
        }
    }

    fn expand_bin_args(
        &self,
        tags: impl IntoIterator<Item = impl Into<String>>,
        extra_args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Vec<OsString> {
        let mut bin_args: Vec<OsString> = vec![self.playbook.clone().into_os_string()];

        let tags = tags.into_iter().map(Into::into).collect::<Vec<String>>();
        if !tags.is_empty() {
            bin_args.push("--tags".into());
            bin_args.push(tags.join(",").into());
        }

        bin_args.extend(extra_args.into_iter().map(Into::into));
        bin_args
    }
}

/// Parse roles out of playbook content.
///
/// # Errors
///
/// - Return [`Error::Parse`] if content is not valid YAML.
pub fn parse_roles(content: &str) -> Result<Vec<PackageRole>> {
    let document: Value = serde_yaml::from_str(content)?;
    let Some(plays) = document.as_sequence() else {
        return Ok(Vec::new());
    };

    let mut roles = Vec::new();
    for play in plays {
        let Some(entries) = play.get("roles").and_then(Value::as_sequence) else {
            continue;
        };

        for entry in entries {
            match entry {
                Value::String(name) => roles.push(PackageRole {
                    name: name.clone(),
                    tags: Vec::new(),
                }),
                Value::Mapping(_) => roles.push(PackageRole {
                    name: entry
                        .get("role")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string(),
                    tags: entry.get("tags").map(parse_tags).unwrap_or_default(),
                }),
                _ => continue,
            }
        }
    }

    Ok(roles)
}

fn parse_tags(tags: &Value) -> Vec<String> {
    match tags {
        Value::String(tag) => vec![tag.clone()],
        Value::Sequence(tags) => tags
            .iter()
            .filter_map(|tag| match tag {
                Value::String(tag) => Some(tag.clone()),
                Value::Number(tag) => Some(tag.to_string()),
                Value::Bool(tag) => Some(tag.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code, killed by signal".into(),
    }
}

/// Package management error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Playbook does not exist.
    #[error("playbook not found at {:?}", playbook.display())]
    PlaybookNotFound { playbook: PathBuf },

    /// Playbook cannot be read.
    #[error("failed to read playbook at {:?}", playbook.display())]
    ReadPlaybook {
        #[source]
        source: std::io::Error,
        playbook: PathBuf,
    },

    /// Playbook is not valid YAML.
    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),

    /// Ansible is not installed.
    #[error("ansible-playbook command not found, please install Ansible")]
    AnsibleNotFound,

    /// Ansible ran, but did not succeed.
    #[error("ansible-playbook failed with {}", describe_exit(code))]
    AnsibleFailed { code: Option<i32> },

    /// Ansible cannot be run.
    #[error("failed to run ansible-playbook")]
    Spawn(#[source] std::io::Error),
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
