// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the settings file that dotcfg uses to locate the
//! files it manages. Every field is optional. Missing fields fall back to the
//! defaults provided by [`crate::path`], and a missing settings file is
//! treated the same as an empty one.

use crate::path;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Settings file layout.
///
/// # General Layout
///
/// The settings file is split into one table per service: `wallpapers`,
/// `icon_templates`, and `packages`. Each path field undergoes shell
/// expansion, so `~` and environment variables can be used freely.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Wallpaper archive settings.
    #[serde(default)]
    pub wallpapers: WallpaperSettings,

    /// Icon template settings.
    #[serde(default)]
    pub icon_templates: IconTemplateSettings,

    /// Package installation settings.
    #[serde(default)]
    pub packages: PackageSettings,
}

impl Settings {
    /// Load settings file at target path.
    ///
    /// Returns default settings if nothing exists at target path.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if settings file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if settings file is malformed.
    /// - Return [`ConfigError::ShellExpansion`] if path expansion fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no settings file at {:?}, using defaults", path.display());
            return Ok(Self::default());
        }

        debug!("load settings file {:?}", path.display());
        read_to_string(path)
            .map_err(|err| ConfigError::Read {
                source: err,
                path: path.to_path_buf(),
            })?
            .parse()
    }

    /// Path to wallpaper archive.
    ///
    /// # Errors
    ///
    /// - Return [`path::Error`] if default path cannot be determined.
    pub fn wallpaper_archive(&self) -> path::Result<PathBuf> {
        match &self.wallpapers.archive {
            Some(archive) => path::absolute(archive),
            None => path::default_wallpaper_archive(),
        }
    }

    /// Path to icon template data directory.
    ///
    /// # Errors
    ///
    /// - Return [`path::Error`] if default path cannot be determined.
    pub fn icon_templates_dir(&self) -> path::Result<PathBuf> {
        match &self.icon_templates.data_dir {
            Some(data_dir) => path::absolute(data_dir),
            None => path::default_icon_templates_dir(),
        }
    }

    /// Path to package playbook.
    ///
    /// # Errors
    ///
    /// - Return [`path::Error`] if default path cannot be determined.
    pub fn playbook(&self) -> path::Result<PathBuf> {
        match &self.packages.playbook {
            Some(playbook) => path::absolute(playbook),
            None => path::default_playbook(),
        }
    }

    /// Path to Ansible directory if one was given.
    ///
    /// # Errors
    ///
    /// - Return [`path::Error`] if path cannot be made absolute.
    pub fn ansible_dir(&self) -> path::Result<Option<PathBuf>> {
        self.packages
            .ansible_dir
            .as_ref()
            .map(path::absolute)
            .transpose()
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        settings.wallpapers.archive = expand(settings.wallpapers.archive)?;
        settings.icon_templates.data_dir = expand(settings.icon_templates.data_dir)?;
        settings.packages.playbook = expand(settings.packages.playbook)?;
        settings.packages.ansible_dir = expand(settings.packages.ansible_dir)?;

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Wallpaper archive settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct WallpaperSettings {
    /// Path to tar.gz archive holding wallpapers.
    pub archive: Option<PathBuf>,
}

/// Icon template settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct IconTemplateSettings {
    /// Directory holding one subdirectory per icon category.
    pub data_dir: Option<PathBuf>,
}

/// Package installation settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct PackageSettings {
    /// Ansible playbook listing package roles.
    pub playbook: Option<PathBuf>,

    /// Working directory for Ansible. Defaults to the playbook's grandparent.
    pub ansible_dir: Option<PathBuf>,
}

fn expand(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    path.map(|path| {
        shellexpand::full(path.to_string_lossy().as_ref())
            .map(|expanded| PathBuf::from(expanded.into_owned()))
            .map_err(ConfigError::ShellExpansion)
    })
    .transpose()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read settings file.
    #[error("failed to read settings file at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
