// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine default locations of the files dotcfg manages, i.e., the
//! settings file, the wallpaper archive, the icon template data directory,
//! and the package playbook.

use std::path::{Path, PathBuf};

/// Name of directory dotcfg keeps its files in under XDG base directories.
pub const APP_DIR: &str = "dotcfg";

/// Playbook location relative to the current working directory.
pub const DEFAULT_PLAYBOOK: &str = "packages/ansible/playbooks/bootstrap.yml";

/// Determine default absolute path to settings file.
///
/// Uses `$XDG_CONFIG_HOME/dotcfg/config.toml`. Does not check if the path
/// returned actually exists.
///
/// # Errors
///
/// - Return [`Error::NoWayHome`] if configuration directory cannot be
///   determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_settings_file() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join(APP_DIR).join("config.toml"))
        .ok_or(Error::NoWayHome)
}

/// Determine default absolute path to wallpaper archive.
///
/// Uses `$XDG_DATA_HOME/dotcfg/wallpapers/wallpapers.tar.gz`. The archive
/// itself is created lazily, so the path may not exist yet.
///
/// # Errors
///
/// - Return [`Error::NoWayHome`] if data directory cannot be determined.
pub fn default_wallpaper_archive() -> Result<PathBuf> {
    data_dir().map(|path| path.join("wallpapers").join("wallpapers.tar.gz"))
}

/// Determine default absolute path to icon template data directory.
///
/// # Errors
///
/// - Return [`Error::NoWayHome`] if data directory cannot be determined.
pub fn default_icon_templates_dir() -> Result<PathBuf> {
    data_dir().map(|path| path.join("icon-templates"))
}

/// Determine default absolute path to package playbook.
///
/// # Errors
///
/// - Return [`Error::Absolute`] if current working directory is unusable.
pub fn default_playbook() -> Result<PathBuf> {
    absolute(DEFAULT_PLAYBOOK)
}

/// Make path absolute relative to current working directory.
///
/// Does not touch the file system beyond asking for the current working
/// directory, so symlinks are left alone.
///
/// # Errors
///
/// - Return [`Error::Absolute`] if current working directory is unusable.
pub fn absolute(path: impl AsRef<Path>) -> Result<PathBuf> {
    std::path::absolute(path.as_ref()).map_err(|err| Error::Absolute {
        source: err,
        path: path.as_ref().to_path_buf(),
    })
}

fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|path| path.join(APP_DIR))
        .ok_or(Error::NoWayHome)
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No way to determine user's home directory.
    ///
    /// # See Also
    ///
    /// - [`dirs::home_dir`](https://docs.rs/dirs/latest/dirs/fn.home_dir.html)
    #[error("cannot determine absolute path to user's home directory")]
    NoWayHome,

    /// Relative path cannot be made absolute.
    #[error("cannot make {:?} absolute", path.display())]
    Absolute {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_playbook_is_relative_to_working_directory() -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        assert_eq!(default_playbook()?, cwd.join(DEFAULT_PLAYBOOK));
        Ok(())
    }

    #[test]
    fn absolute_keeps_absolute_paths() -> anyhow::Result<()> {
        let path = std::env::temp_dir().join("wallpapers.tar.gz");
        assert_eq!(absolute(&path)?, path);
        Ok(())
    }
}
