// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Asset management.
//!
//! Assets are plain files that dotfiles need, but that do not belong in any
//! configuration file themselves. Dotcfg knows about two kinds of assets:
//!
//! 1. __Wallpapers__ kept in a single tar.gz archive, see [`wallpaper`].
//! 2. __Icon templates__ kept in a categorized data directory, see [`icon`].

pub mod icon;
pub mod wallpaper;

use crate::assets::{icon::IconTemplates, wallpaper::WallpaperArchive};

use std::{
    fs::{self, File, FileTimes},
    path::Path,
};

/// Access to all asset kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assets {
    wallpapers: WallpaperArchive,
    icon_templates: IconTemplates,
}

impl Assets {
    /// Construct new asset access.
    pub fn new(wallpapers: WallpaperArchive, icon_templates: IconTemplates) -> Self {
        Self {
            wallpapers,
            icon_templates,
        }
    }

    /// Wallpaper archive.
    pub fn wallpapers(&self) -> &WallpaperArchive {
        &self.wallpapers
    }

    /// Icon template data directory.
    pub fn icon_templates(&self) -> &IconTemplates {
        &self.icon_templates
    }
}

/// Copy file along with its permissions, and access and modification times.
pub(crate) fn copy_with_metadata(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::copy(from, to)?;
    let metadata = fs::metadata(from)?;
    let mut times = FileTimes::new().set_modified(metadata.modified()?);
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }

    // INVARIANT: Read-only copies still get their timestamps.
    let file = File::options()
        .write(true)
        .open(to)
        .or_else(|_| File::open(to))?;
    file.set_times(times)
}
