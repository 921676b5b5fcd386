// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Wallpaper archive management.
//!
//! Wallpapers are kept in a single gzip compressed tar archive that acts as a
//! flat collection of named files. The name of an entry is simply the base
//! name of the file that was added to the archive.
//!
//! # Visibility
//!
//! Only regular files whose name does not start with a `.` are considered to
//! be wallpapers. Directories and hidden files are allowed to exist inside of
//! the archive, but they are never listed. Hidden files and links are also
//! dropped whenever the archive gets rebuilt. Links whose target is absolute,
//! or climbs out with `..`, are refused outright.
//!
//! # Rebuilding
//!
//! Adding a wallpaper never appends to the archive. Instead, the entire
//! archive is unpacked into a temporary staging directory, the new wallpaper
//! is copied over, and a brand new archive is packed from the staging
//! directory. The new archive is written to a temporary file next to the old
//! one, and then renamed over it. Thus, a failure half way through leaves the
//! old archive untouched.

use crate::assets::copy_with_metadata;

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::{
    fs::{self, create_dir_all, File},
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tar::Archive;
use tempfile::{Builder as TempBuilder, NamedTempFile};
use tracing::{debug, info, instrument};

/// Image extensions that pass validation.
pub const VALID_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

/// Name of directory wallpapers get extracted into.
pub const EXTRACT_DIR: &str = "wallpapers";

/// Check if filename has a recognized image extension.
///
/// The extension is whatever follows the last `.` in the filename, compared
/// without regard to case. A filename without any `.` has no extension, and
/// is never valid.
pub fn is_valid_image(filename: impl AsRef<str>) -> bool {
    filename
        .as_ref()
        .rsplit_once('.')
        .map(|(_, extension)| {
            let extension = extension.to_ascii_lowercase();
            VALID_EXTENSIONS.contains(&extension.as_str())
        })
        .unwrap_or(false)
}

/// Options for adding wallpapers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// Replace existing wallpaper with the same name.
    pub overwrite: bool,

    /// Reject files without a recognized image extension.
    pub validate_extension: bool,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            validate_extension: true,
        }
    }
}

/// Wallpaper archive backed by a tar.gz file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallpaperArchive {
    archive_path: PathBuf,
}

impl WallpaperArchive {
    /// Construct new wallpaper archive handle.
    ///
    /// Nothing is touched on the file system until the archive is used.
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
        }
    }

    /// Path to the archive file.
    pub fn path(&self) -> &Path {
        self.archive_path.as_path()
    }

    /// Check if archive file exists.
    pub fn exists(&self) -> bool {
        self.archive_path.exists()
    }

    /// List names of all wallpapers in archive.
    ///
    /// Order of names is whatever order the archive stores them in.
    ///
    /// # Errors
    ///
    /// - Return [`Error::ArchiveNotFound`] if archive does not exist.
    /// - Return [`Error::ReadArchive`] if archive cannot be read.
    #[instrument(skip(self), level = "debug")]
    pub fn list(&self) -> Result<Vec<String>> {
        let mut archive = self.open()?;
        let mut names = Vec::new();
        for entry in archive.entries().map_err(|err| self.read_error(err))? {
            let entry = entry.map_err(|err| self.read_error(err))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let name = entry
                .path()
                .map_err(|err| self.read_error(err))?
                .to_string_lossy()
                .into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }

        debug!("found {} wallpapers in {:?}", names.len(), self.archive_path.display());
        Ok(names)
    }

    /// Add wallpaper to archive.
    ///
    /// The wallpaper is stored under its base name, so two different source
    /// paths with the same base name refer to the same entry. The archive and
    /// its parent directories are created if missing. Returns name of the
    /// new entry.
    ///
    /// # Errors
    ///
    /// - Return [`Error::SourceNotFound`] if wallpaper file does not exist.
    /// - Return [`Error::NotAFile`] if wallpaper path is not a regular file.
    /// - Return [`Error::InvalidImage`] if validation is requested, and the
    ///   wallpaper lacks a recognized image extension.
    /// - Return [`Error::DuplicateEntry`] if wallpaper already exists, and
    ///   overwriting was not requested.
    /// - Return [`Error::UnsafeEntry`] if current archive holds an entry that
    ///   would escape the staging directory.
    /// - Return [`Error::Stage`] if staging directory cannot be prepared.
    /// - Return [`Error::WriteArchive`] if new archive cannot be written.
    #[instrument(skip(self, source), level = "debug")]
    pub fn add(&self, source: impl AsRef<Path>, options: AddOptions) -> Result<String> {
        let source = resolve_source(source.as_ref())?;
        let filename = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::NotAFile {
                path: source.clone(),
            })?;

        if options.validate_extension && !is_valid_image(&filename) {
            return Err(Error::InvalidImage { filename });
        }

        if self.exists() && !options.overwrite && self.list()?.contains(&filename) {
            return Err(Error::DuplicateEntry { filename });
        }

        info!("add {filename:?} to {:?}", self.archive_path.display());

        // INVARIANT: Staging directory is removed on every exit path when dropped.
        let staging = TempBuilder::new()
            .prefix("dotcfg-wallpapers-")
            .tempdir()
            .map_err(|err| Error::Stage {
                source: err,
                path: std::env::temp_dir(),
            })?;

        if self.exists() {
            self.unpack_into(staging.path())?;
        }

        let staged = staging.path().join(&filename);
        copy_with_metadata(&source, &staged).map_err(|err| Error::Stage {
            source: err,
            path: staged.clone(),
        })?;

        self.rebuild_from(staging.path())?;

        Ok(filename)
    }

    /// Extract all wallpapers into `wallpapers` subdirectory of target
    /// directory.
    ///
    /// Missing directories are created. Files from a previous extraction into
    /// the same directory are overwritten.
    ///
    /// # Errors
    ///
    /// - Return [`Error::ArchiveNotFound`] if archive does not exist.
    /// - Return [`Error::Extract`] if target directory cannot be written to.
    /// - Return [`Error::UnsafeEntry`] if archive holds an entry that would
    ///   escape the target directory.
    #[instrument(skip(self, output_dir), level = "debug")]
    pub fn extract(&self, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.ensure_exists()?;

        let target = output_dir.as_ref().join(EXTRACT_DIR);
        create_dir_all(&target).map_err(|err| Error::Extract {
            source: err,
            path: target.clone(),
        })?;

        info!("extract {:?} to {:?}", self.archive_path.display(), target.display());
        self.unpack_into(&target)?;

        Ok(target)
    }

    fn ensure_exists(&self) -> Result<()> {
        if !self.exists() {
            return Err(Error::ArchiveNotFound {
                archive_path: self.archive_path.clone(),
            });
        }

        Ok(())
    }

    fn open(&self) -> Result<Archive<GzDecoder<File>>> {
        self.ensure_exists()?;
        let file = File::open(&self.archive_path).map_err(|err| self.read_error(err))?;
        let mut archive = Archive::new(GzDecoder::new(file));
        archive.set_overwrite(true);
        archive.set_preserve_mtime(true);

        Ok(archive)
    }

    fn unpack_into(&self, target: &Path) -> Result<()> {
        let mut archive = self.open()?;
        for entry in archive.entries().map_err(|err| self.read_error(err))? {
            let mut entry = entry.map_err(|err| self.read_error(err))?;
            let entry_path = entry
                .path()
                .map_err(|err| self.read_error(err))?
                .into_owned();

            // INVARIANT: Never write outside of target directory.
            if !is_contained(&entry_path) {
                return Err(Error::UnsafeEntry {
                    entry: entry_path,
                    target: target.to_path_buf(),
                });
            }

            // INVARIANT: Links never point outside of target directory.
            let kind = entry.header().entry_type();
            if kind.is_symlink() || kind.is_hard_link() {
                let link = entry.link_name().map_err(|err| self.read_error(err))?;
                if !link.is_some_and(|link| is_contained(&link)) {
                    return Err(Error::UnsafeEntry {
                        entry: entry_path,
                        target: target.to_path_buf(),
                    });
                }
            }

            debug!("unpack {:?}", entry_path.display());
            let unpacked = entry.unpack_in(target).map_err(|err| Error::Extract {
                source: err,
                path: target.join(&entry_path),
            })?;
            if !unpacked {
                return Err(Error::UnsafeEntry {
                    entry: entry_path,
                    target: target.to_path_buf(),
                });
            }
        }

        Ok(())
    }

    fn rebuild_from(&self, staging: &Path) -> Result<()> {
        let parent = match self.archive_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        create_dir_all(&parent).map_err(|err| self.write_error(err))?;

        let mut wallpapers = Vec::new();
        for entry in fs::read_dir(staging).map_err(|err| Error::Stage {
            source: err,
            path: staging.to_path_buf(),
        })? {
            let entry = entry.map_err(|err| Error::Stage {
                source: err,
                path: staging.to_path_buf(),
            })?;
            let is_file = entry
                .file_type()
                .map_err(|err| Error::Stage {
                    source: err,
                    path: entry.path(),
                })?
                .is_file();

            // INVARIANT: Only regular files survive a rebuild, links are never followed.
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_file && !name.starts_with('.') {
                wallpapers.push((name, entry.path()));
            }
        }
        wallpapers.sort();

        let mut packed = TempBuilder::new()
            .prefix(".wallpapers-")
            .suffix(".tar.gz.tmp")
            .tempfile_in(&parent)
            .map_err(|err| self.write_error(err))?;
        self.pack(&mut packed, &wallpapers)
            .map_err(|err| self.write_error(err))?;

        packed
            .persist(&self.archive_path)
            .map_err(|err| self.write_error(err.error))?;
        debug!("rebuilt {:?} with {} entries", self.archive_path.display(), wallpapers.len());

        Ok(())
    }

    fn pack(&self, packed: &mut NamedTempFile, wallpapers: &[(String, PathBuf)]) -> std::io::Result<()> {
        let encoder = GzEncoder::new(packed.as_file_mut(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);
        for (name, path) in wallpapers {
            builder.append_path_with_name(path, name)?;
        }
        builder.into_inner()?.finish()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            packed
                .as_file()
                .set_permissions(fs::Permissions::from_mode(0o644))?;
        }

        packed.as_file().sync_all()
    }

    fn read_error(&self, err: std::io::Error) -> Error {
        Error::ReadArchive {
            source: err,
            archive_path: self.archive_path.clone(),
        }
    }

    fn write_error(&self, err: std::io::Error) -> Error {
        Error::WriteArchive {
            source: err,
            archive_path: self.archive_path.clone(),
        }
    }
}

fn resolve_source(path: &Path) -> Result<PathBuf> {
    let resolved = match path.canonicalize() {
        Ok(resolved) => resolved,
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Err(Error::SourceNotFound {
                path: path.to_path_buf(),
            })
        }
        Err(err) => {
            return Err(Error::Stage {
                source: err,
                path: path.to_path_buf(),
            })
        }
    };

    if !resolved.is_file() {
        return Err(Error::NotAFile { path: resolved });
    }

    Ok(resolved)
}

fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Wallpaper archive error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Archive file does not exist.
    #[error("wallpaper archive not found at {:?}", archive_path.display())]
    ArchiveNotFound { archive_path: PathBuf },

    /// Wallpaper file to add does not exist.
    #[error("wallpaper file not found at {:?}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Wallpaper path to add is not a regular file.
    #[error("wallpaper at {:?} is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    /// Wallpaper lacks a recognized image extension.
    #[error("file does not have a valid image extension: {filename}")]
    InvalidImage { filename: String },

    /// Wallpaper with the same name is already in the archive.
    #[error("wallpaper {filename:?} already exists in archive, use --force to overwrite")]
    DuplicateEntry { filename: String },

    /// Archive entry would be written outside of target directory.
    #[error("refusing to unpack {:?} outside of {:?}", entry.display(), target.display())]
    UnsafeEntry { entry: PathBuf, target: PathBuf },

    /// Archive cannot be read.
    #[error("failed to read wallpaper archive at {:?}", archive_path.display())]
    ReadArchive {
        #[source]
        source: std::io::Error,
        archive_path: PathBuf,
    },

    /// Archive cannot be written.
    #[error("failed to write wallpaper archive at {:?}", archive_path.display())]
    WriteArchive {
        #[source]
        source: std::io::Error,
        archive_path: PathBuf,
    },

    /// Staging directory for archive rebuild cannot be prepared.
    #[error("failed to stage wallpapers at {:?}", path.display())]
    Stage {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Wallpapers cannot be extracted.
    #[error("failed to extract wallpapers to {:?}", path.display())]
    Extract {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
