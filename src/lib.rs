// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Personal configuration management utilities.
//!
//! Dotcfg bundles the small chores that come with keeping dotfiles around:
//!
//! 1. Keeping wallpapers in a tar.gz archive, see [`assets::wallpaper`].
//! 2. Copying icon templates out of a data directory, see [`assets::icon`].
//! 3. Installing system packages through Ansible, see [`packages`].
//!
//! Everything is reachable from a [`Dotfiles`] built out of [`Settings`].

pub mod assets;
pub mod config;
pub mod packages;
pub mod path;

pub use crate::config::Settings;

use crate::{
    assets::{icon::IconTemplates, wallpaper::WallpaperArchive, Assets},
    packages::Packages,
};

/// Entry point to every service dotcfg provides.
#[derive(Debug, Clone)]
pub struct Dotfiles {
    assets: Assets,
    packages: Packages,
}

impl Dotfiles {
    /// Construct new entry point out of settings.
    ///
    /// Resolves every path the services need up front. Nothing is read or
    /// written until a service is actually used.
    ///
    /// # Errors
    ///
    /// - Return [`path::Error`] if a default path cannot be determined.
    pub fn new(settings: &Settings) -> path::Result<Self> {
        let assets = Assets::new(
            WallpaperArchive::new(settings.wallpaper_archive()?),
            IconTemplates::new(settings.icon_templates_dir()?),
        );
        let packages = Packages::new(settings.playbook()?, settings.ansible_dir()?);

        Ok(Self { assets, packages })
    }

    /// Asset management.
    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    /// Package management.
    pub fn packages(&self) -> &Packages {
        &self.packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IconTemplateSettings, PackageSettings, WallpaperSettings};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn dotfiles_resolves_settings() -> anyhow::Result<()> {
        let settings = Settings {
            wallpapers: WallpaperSettings {
                archive: Some("/home/blah/wallpapers.tar.gz".into()),
            },
            icon_templates: IconTemplateSettings {
                data_dir: Some("/home/blah/icons".into()),
            },
            packages: PackageSettings {
                playbook: Some("/home/blah/ansible/playbooks/bootstrap.yml".into()),
                ansible_dir: None,
            },
        };

        let dotfiles = Dotfiles::new(&settings)?;
        assert_eq!(
            dotfiles.assets().wallpapers().path(),
            Path::new("/home/blah/wallpapers.tar.gz")
        );
        assert_eq!(
            dotfiles.assets().icon_templates().data_dir(),
            Path::new("/home/blah/icons")
        );
        assert_eq!(
            dotfiles.packages().playbook(),
            Path::new("/home/blah/ansible/playbooks/bootstrap.yml")
        );
        assert_eq!(
            dotfiles.packages().ansible_dir(),
            Path::new("/home/blah/ansible")
        );

        Ok(())
    }
}
