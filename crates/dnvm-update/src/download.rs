//! Archive download and extraction
//!
//! SDKs and dnvm builds are published as `.tar.gz` (Unix) or `.zip`
//! (Windows). Archives are streamed into a temporary directory with an
//! optional progress bar, then unpacked into the destination.

use dnvm_core::config::RuntimeConfig;
use flate2::read::GzDecoder;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{Result, UpdateError};
use crate::releases::http_client;

/// Archive formats the fetcher can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Detect the format from a URL or file name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.split(['?', '#']).next().unwrap_or(name);
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

/// Downloads archives and unpacks them
pub struct ArchiveFetcher {
    client: reqwest::Client,
    temp_dir: TempDir,
    show_progress: bool,
}

impl ArchiveFetcher {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            temp_dir: TempDir::new()?,
            show_progress: true,
        })
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Download `url` into the temporary directory
    pub async fn download(&self, url: &str) -> Result<PathBuf> {
        let file_name = url
            .split(['?', '#'])
            .next()
            .and_then(|u| u.rsplit('/').next())
            .filter(|n| !n.is_empty())
            .unwrap_or("download");
        let file_path = self.temp_dir.path().join(file_name);

        info!("Downloading {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::network(url, e))?;

        if !response.status().is_success() {
            return Err(UpdateError::network(
                url,
                format!("download failed with status: {}", response.status()),
            ));
        }

        let progress = if self.show_progress {
            let pb = match response.content_length() {
                Some(len) => ProgressBar::new(len),
                None => ProgressBar::new_spinner(),
            };
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(format!("Downloading {}", file_name));
            Some(pb)
        } else {
            None
        };

        let mut file = File::create(&file_path)?;
        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| UpdateError::network(url, e))?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;

            if let Some(pb) = &progress {
                pb.set_position(downloaded);
            }
        }
        file.sync_all()?;

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Downloaded {}", file_name));
        }

        debug!("Downloaded {} bytes to {:?}", downloaded, file_path);
        Ok(file_path)
    }

    /// Download `url` and unpack it into `dest`
    pub async fn fetch_and_extract(&self, url: &str, dest: &Path) -> Result<()> {
        let kind = ArchiveKind::from_name(url).ok_or_else(|| {
            UpdateError::install_failed(format!("Unsupported archive format: {}", url))
        })?;
        let archive = self.download(url).await?;
        extract(&archive, kind, dest)?;
        if let Err(e) = fs::remove_file(&archive) {
            debug!("Could not remove downloaded archive {:?}: {}", archive, e);
        }
        Ok(())
    }
}

/// Unpack `archive` into `dest`, creating it if needed
pub fn extract(archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<()> {
    debug!("Extracting {:?} into {:?}", archive, dest);
    fs::create_dir_all(dest)?;

    let file = File::open(archive)?;
    match kind {
        ArchiveKind::TarGz => {
            let mut archive = tar::Archive::new(GzDecoder::new(file));
            archive.set_preserve_permissions(true);
            archive.set_overwrite(true);
            archive.unpack(dest).map_err(|e| {
                UpdateError::install_failed(format!("Failed to extract tarball: {}", e))
            })?;
        }
        ArchiveKind::Zip => {
            let mut archive = zip::ZipArchive::new(file).map_err(|e| {
                UpdateError::install_failed(format!("Failed to open zip archive: {}", e))
            })?;
            archive.extract(dest).map_err(|e| {
                UpdateError::install_failed(format!("Failed to extract zip archive: {}", e))
            })?;
        }
    }

    info!("Extracted archive into {:?}", dest);
    Ok(())
}
