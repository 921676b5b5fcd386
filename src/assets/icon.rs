// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Icon template management.
//!
//! Icon templates live in a data directory that holds one subdirectory per
//! __category__. Each category directory contains the icon files themselves.
//! Hidden entries at either level are ignored.
//!
//! ```text
//! icon-templates/
//! ├── apps/
//! │   ├── terminal.svg
//! │   └── browser.svg
//! └── places/
//!     └── home.svg
//! ```

use crate::assets::copy_with_metadata;

use std::{
    fs::{create_dir_all, read_dir},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Details about a single icon template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconInfo {
    /// File name of icon.
    pub name: String,

    /// Category directory icon was found in.
    pub category: String,

    /// Full path to icon file.
    pub path: PathBuf,

    /// Alternate renditions of icon. Currently always empty.
    pub variants: Vec<String>,
}

/// Selection of icons to copy.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum IconSelection {
    /// Every icon of every category.
    #[default]
    All,

    /// Every icon of one category.
    Category(String),

    /// Specific icons by name, searched across all categories.
    Icons(Vec<String>),
}

/// Icon template data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconTemplates {
    data_dir: PathBuf,
}

impl IconTemplates {
    /// Construct new icon template handle over target data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path to data directory.
    pub fn data_dir(&self) -> &Path {
        self.data_dir.as_path()
    }

    /// List sorted names of all categories.
    ///
    /// # Errors
    ///
    /// - Return [`Error::DataDirNotFound`] if data directory is missing.
    /// - Return [`Error::ReadDir`] if data directory cannot be read.
    pub fn categories(&self) -> Result<Vec<String>> {
        self.ensure_data_dir()?;
        visible_entries(&self.data_dir, |path| path.is_dir())
    }

    /// List sorted icon names of one category, or of all categories.
    ///
    /// # Errors
    ///
    /// - Return [`Error::DataDirNotFound`] if data directory is missing.
    /// - Return [`Error::CategoryNotFound`] if category is missing.
    /// - Return [`Error::ReadDir`] if a directory cannot be read.
    pub fn list(&self, category: Option<&str>) -> Result<Vec<String>> {
        self.ensure_data_dir()?;

        let mut icons = match category {
            Some(category) => self.icons_in(category)?,
            None => {
                let mut icons = Vec::new();
                for category in self.categories()? {
                    icons.extend(self.icons_in(&category)?);
                }
                icons
            }
        };
        icons.sort();

        Ok(icons)
    }

    /// Show details about an icon.
    ///
    /// Categories are searched in sorted order, and the first match wins.
    ///
    /// # Errors
    ///
    /// - Return [`Error::DataDirNotFound`] if data directory is missing.
    /// - Return [`Error::IconNotFound`] if no category holds the icon.
    #[instrument(skip(self), level = "debug")]
    pub fn show(&self, name: &str) -> Result<IconInfo> {
        for category in self.categories()? {
            let path = self.data_dir.join(&category).join(name);
            if path.exists() {
                debug!("found icon {name:?} in {category:?}");
                return Ok(IconInfo {
                    name: name.to_string(),
                    category,
                    path,
                    variants: Vec::new(),
                });
            }
        }

        Err(Error::IconNotFound {
            name: name.to_string(),
        })
    }

    /// Copy selected icons into target directory.
    ///
    /// Target directory is created if missing. Existing files with the same
    /// name are replaced. Returns sorted names of copied icons.
    ///
    /// # Errors
    ///
    /// - Return [`Error::DataDirNotFound`] if data directory is missing.
    /// - Return [`Error::CategoryNotFound`] if selected category is missing.
    /// - Return [`Error::IconNotFound`] if a selected icon is missing.
    /// - Return [`Error::Copy`] if an icon cannot be copied.
    #[instrument(skip(self, target), level = "debug")]
    pub fn copy(&self, target: impl AsRef<Path>, selection: IconSelection) -> Result<Vec<String>> {
        self.ensure_data_dir()?;

        let target = target.as_ref();
        create_dir_all(target).map_err(|err| Error::Copy {
            source: err,
            path: target.to_path_buf(),
        })?;

        let sources = match selection {
            IconSelection::Icons(names) => names
                .iter()
                .map(|name| self.show(name).map(|info| (info.name, info.path)))
                .collect::<Result<Vec<_>>>()?,
            IconSelection::Category(category) => self.sources_in(&category)?,
            IconSelection::All => {
                let mut sources = Vec::new();
                for category in self.categories()? {
                    sources.extend(self.sources_in(&category)?);
                }
                sources
            }
        };

        let mut copied = Vec::new();
        for (name, source) in sources {
            let dest = target.join(&name);
            copy_with_metadata(&source, &dest).map_err(|err| Error::Copy {
                source: err,
                path: dest.clone(),
            })?;
            copied.push(name);
        }
        copied.sort();

        info!("copied {} icons to {:?}", copied.len(), target.display());
        Ok(copied)
    }

    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            return Err(Error::DataDirNotFound {
                data_dir: self.data_dir.clone(),
            });
        }

        Ok(())
    }

    fn category_dir(&self, category: &str) -> Result<PathBuf> {
        let path = self.data_dir.join(category);
        if !path.is_dir() {
            return Err(Error::CategoryNotFound {
                category: category.to_string(),
            });
        }

        Ok(path)
    }

    fn icons_in(&self, category: &str) -> Result<Vec<String>> {
        let path = self.category_dir(category)?;
        visible_entries(&path, |path| path.is_file())
    }

    fn sources_in(&self, category: &str) -> Result<Vec<(String, PathBuf)>> {
        let path = self.category_dir(category)?;
        Ok(self
            .icons_in(category)?
            .into_iter()
            .map(|name| {
                let source = path.join(&name);
                (name, source)
            })
            .collect())
    }
}

fn visible_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<String>> {
    let read_error = |err| Error::ReadDir {
        source: err,
        path: dir.to_path_buf(),
    };

    let mut names = Vec::new();
    for entry in read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with('.') && keep(&entry.path()) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names)
}

/// Icon template error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Data directory does not exist.
    #[error("icon template data directory not found at {:?}", data_dir.display())]
    DataDirNotFound { data_dir: PathBuf },

    /// Category does not exist.
    #[error("category not found: {category}")]
    CategoryNotFound { category: String },

    /// Icon does not exist in any category.
    #[error("icon not found: {name}")]
    IconNotFound { name: String },

    /// Directory cannot be read.
    #[error("failed to read directory at {:?}", path.display())]
    ReadDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Icon cannot be copied.
    #[error("failed to copy icon to {:?}", path.display())]
    Copy {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
