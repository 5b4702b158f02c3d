//! Manifest persistence
//!
//! Writes go to a temporary sibling first and are moved onto the final path
//! with a single rename, so a reader sees either the old manifest or the new
//! one and never a partial file.
//!
//! There is no cross-process locking. Two dnvm processes working on the same
//! home each read, modify and write the whole manifest, so the last writer
//! wins and the interleaving of concurrent invocations is undefined. A
//! self-update interrupted between its two renames leaves the previous
//! executable as `dnvm[.exe].bak` in the home, which can be renamed back by
//! hand.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{schema, Manifest};
use crate::error::{Error, Result};

/// File name of the manifest inside the managed home
pub const MANIFEST_FILE_NAME: &str = "dnvmManifest.json";

/// Owns the manifest file's read / write lifecycle
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Store for the manifest at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the manifest inside the managed home `home`
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join(MANIFEST_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and upgrade the manifest.
    ///
    /// A missing file is [`Error::ManifestNotFound`]; anything else that
    /// prevents reading it is [`Error::CorruptManifest`] or
    /// [`Error::InvalidSchema`].
    pub fn read(&self) -> Result<Manifest> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::ManifestNotFound {
                    path: self.path.clone(),
                })
            }
            Err(e) => {
                return Err(Error::corrupt_manifest(
                    &self.path,
                    format!("failed to read file: {}", e),
                ))
            }
        };

        debug!("Read manifest from {}", self.path.display());
        schema::parse_any(&text, &self.path)
    }

    /// Read the manifest, treating a missing file as a fresh home
    pub fn read_or_empty(&self) -> Result<Manifest> {
        match self.read() {
            Err(e) if e.is_not_found() => {
                debug!("No manifest at {}, starting empty", self.path.display());
                Ok(Manifest::empty())
            }
            other => other,
        }
    }

    /// Atomically replace the manifest with `manifest`
    pub fn write(&self, manifest: &Manifest) -> Result<()> {
        self.stage(manifest)?.commit()?;
        info!("Manifest written to {}", self.path.display());
        Ok(())
    }

    /// Serialize `manifest` into a temporary sibling of the manifest file.
    ///
    /// Nothing is visible at the final path until [`StagedManifest::commit`].
    /// Dropping the staged manifest removes the temporary file.
    pub fn stage(&self, manifest: &Manifest) -> Result<StagedManifest> {
        let json = schema::to_json(manifest)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = tempfile::Builder::new()
            .prefix(".dnvmManifest.")
            .suffix(".tmp")
            .tempfile_in(&dir)?;
        temp.write_all(json.as_bytes())?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;

        Ok(StagedManifest {
            temp,
            target: self.path.clone(),
        })
    }
}

/// A fully written manifest waiting to be moved into place
#[derive(Debug)]
pub struct StagedManifest {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedManifest {
    /// Path of the temporary file
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the temporary file onto the manifest path
    pub fn commit(self) -> Result<()> {
        self.temp
            .persist(&self.target)
            .map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}
