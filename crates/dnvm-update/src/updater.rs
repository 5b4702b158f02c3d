//! Replacing the installed dnvm executable
//!
//! The swap never writes into the live file. It takes two renames:
//!
//! 1. installed binary -> `dnvm.bak`
//! 2. staged binary -> installed path
//!
//! then refreshes the modification time and deletes the backup. If the second
//! rename fails the backup is moved back. A backup that cannot be deleted is
//! left behind as a manual recovery path.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

use crate::error::{Result, UpdateError};

/// Filesystem operations used by the swap
pub trait FileOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Set the modification time to now
    fn touch(&self, path: &Path) -> io::Result<()>;
}

/// [`FileOps`] backed by `std::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileOps;

impl FileOps for StdFileOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if is_cross_device(&e) && from.is_file() && !to.exists() => {
                debug!("{:?} and {:?} are on different devices, copying", from, to);
                fs::copy(from, to)?;
                if let Err(e) = fs::remove_file(from) {
                    // A move must not leave two copies behind
                    let _ = fs::remove_file(to);
                    return Err(e);
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn touch(&self, path: &Path) -> io::Result<()> {
        File::options()
            .write(true)
            .open(path)?
            .set_modified(SystemTime::now())
    }
}

fn is_cross_device(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}

/// Outcome of a successful swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReport {
    /// The installed path now holding the new binary
    pub target: PathBuf,

    /// Whether the backup was deleted
    pub backup_removed: bool,
}

/// Swap a staged binary over the installed one
pub struct BinarySwap<F: FileOps = StdFileOps> {
    target: PathBuf,
    staged: PathBuf,
    backup: PathBuf,
    ops: F,
}

impl BinarySwap<StdFileOps> {
    pub fn new(target: impl Into<PathBuf>, staged: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self::with_ops(target, staged, backup, StdFileOps)
    }
}

impl<F: FileOps> BinarySwap<F> {
    pub fn with_ops(
        target: impl Into<PathBuf>,
        staged: impl Into<PathBuf>,
        backup: impl Into<PathBuf>,
        ops: F,
    ) -> Self {
        Self {
            target: target.into(),
            staged: staged.into(),
            backup: backup.into(),
            ops,
        }
    }

    /// Perform the swap
    pub fn swap(&self) -> Result<SwapReport> {
        info!(
            "Swapping {:?} with downloaded file at {:?}",
            self.target, self.staged
        );

        self.ops.rename(&self.target, &self.backup).map_err(|e| {
            error!("Failed to move {:?} to {:?}: {}", self.target, self.backup, e);
            UpdateError::self_install_failed(format!(
                "Couldn't move {} aside: {}",
                self.target.display(),
                e
            ))
        })?;

        if let Err(e) = self.ops.rename(&self.staged, &self.target) {
            error!("Failed to move {:?} to {:?}: {}", self.staged, self.target, e);
            let restored = match self.ops.rename(&self.backup, &self.target) {
                Ok(()) => {
                    warn!("Rolled back to the previous binary");
                    "the previous binary was restored".to_string()
                }
                Err(rollback) => {
                    error!("Rollback failed: {}", rollback);
                    format!(
                        "the previous binary is left at {}",
                        self.backup.display()
                    )
                }
            };
            return Err(UpdateError::self_install_failed(format!(
                "Couldn't replace existing binary: {}; {}",
                e, restored
            )));
        }

        if let Err(e) = self.ops.touch(&self.target) {
            warn!("Could not update modification time of {:?}: {}", self.target, e);
        }

        let backup_removed = match self.ops.remove(&self.backup) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not delete backup {:?}: {}", self.backup, e);
                false
            }
        };

        info!("Binary replaced successfully");
        Ok(SwapReport {
            target: self.target.clone(),
            backup_removed,
        })
    }
}

/// Verify a binary by running `--version`
pub fn verify_binary(binary_path: &Path) -> Result<String> {
    debug!("Verifying binary at: {:?}", binary_path);

    if !binary_path.is_file() {
        return Err(UpdateError::self_install_failed(format!(
            "Binary does not exist: {}",
            binary_path.display()
        )));
    }

    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .map_err(|e| {
            UpdateError::self_install_failed(format!("Failed to execute binary for verification: {}", e))
        })?;

    if !output.status.success() {
        return Err(UpdateError::self_install_failed(format!(
            "Binary verification failed: exit code {}",
            output.status.code().unwrap_or(-1)
        )));
    }

    let version_output = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("Binary verification output: {}", version_output);

    if !version_output.to_lowercase().contains("dnvm") {
        return Err(UpdateError::self_install_failed(format!(
            "Binary verification failed: unexpected output: {}",
            version_output
        )));
    }

    info!("Binary verified successfully");
    Ok(version_output)
}

/// Mark a file executable (no-op on Windows)
pub fn make_executable(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rename_moves_file() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a");
        let to = temp.path().join("b");
        fs::write(&from, "x").unwrap();

        StdFileOps.rename(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(&to).unwrap(), "x");
    }

    #[test]
    fn test_rename_failure_does_not_copy() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("a");
        let to = temp.path().join("missing").join("b");
        fs::write(&from, "x").unwrap();

        let err = StdFileOps.rename(&from, &to).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(from.is_file());
        assert!(!to.exists());
    }

    #[test]
    fn test_only_cross_device_errors_fall_back() {
        assert!(is_cross_device(&io::Error::from(io::ErrorKind::CrossesDevices)));
        assert!(!is_cross_device(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!is_cross_device(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
