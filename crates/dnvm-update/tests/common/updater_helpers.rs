//! Helpers for updater and self-install testing

use dnvm_core::env::{EnvironmentSync, InstallPaths, SyncReport};
use dnvm_core::{DnvmHome, RuntimeConfig};
use dnvm_update::{FileOps, SdkInstaller, StdFileOps};
use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a fake binary file with the given content
pub fn create_fake_binary(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(path)?;
    file.write_all(content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// A managed home inside a temporary directory
pub struct TestHome {
    pub temp: TempDir,
    pub home: DnvmHome,
}

impl TestHome {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let home = DnvmHome::new(temp.path().join("dnvm"));
        fs::create_dir_all(home.root()).expect("Failed to create home");
        Self { temp, home }
    }

    /// An installer pointed at `feed_url` without progress bars
    pub fn installer(&self, feed_url: &str) -> SdkInstaller {
        SdkInstaller::new(self.home.clone(), &RuntimeConfig::default())
            .expect("Failed to create installer")
            .with_feed_url(feed_url)
            .with_progress(false)
    }

    /// Path for a staged binary outside the home
    pub fn staged_path(&self) -> PathBuf {
        self.temp.path().join("staged").join(format!("dnvm{}", dnvm_core::EXE_SUFFIX))
    }
}

/// Which swap step should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// Moving the installed binary to the backup
    Backup,
    /// Moving the staged binary into place
    Replace,
    /// Deleting the backup
    RemoveBackup,
    /// Refreshing the modification time
    Touch,
}

/// [`FileOps`] that fails one step and delegates the rest to `std::fs`
#[derive(Debug)]
pub struct FailingOps {
    pub fail_at: FailAt,
    pub staged: PathBuf,
    pub calls: RefCell<Vec<String>>,
}

impl FailingOps {
    pub fn new(fail_at: FailAt, staged: &Path) -> Self {
        Self {
            fail_at,
            staged: staged.to_path_buf(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn injected() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "injected failure")
    }
}

impl FileOps for &FailingOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.calls.borrow_mut().push(format!("rename {}", from.display()));
        let is_staged = from == self.staged;
        match self.fail_at {
            FailAt::Replace if is_staged => Err(FailingOps::injected()),
            FailAt::Backup if !is_staged => Err(FailingOps::injected()),
            _ => StdFileOps.rename(from, to),
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.calls.borrow_mut().push(format!("remove {}", path.display()));
        if self.fail_at == FailAt::RemoveBackup {
            return Err(FailingOps::injected());
        }
        StdFileOps.remove(path)
    }

    fn touch(&self, path: &Path) -> io::Result<()> {
        self.calls.borrow_mut().push(format!("touch {}", path.display()));
        if self.fail_at == FailAt::Touch {
            return Err(FailingOps::injected());
        }
        StdFileOps.touch(path)
    }
}

/// Environment backend that records calls instead of touching the machine
#[derive(Debug, Default)]
pub struct RecordingSync {
    pub applied: Vec<PathBuf>,
    pub refreshed: Vec<PathBuf>,
}

impl EnvironmentSync for RecordingSync {
    fn get(&self, _name: &str) -> dnvm_core::Result<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _name: &str, _value: &str) -> dnvm_core::Result<()> {
        Ok(())
    }

    fn apply(&mut self, paths: &InstallPaths) -> dnvm_core::Result<SyncReport> {
        self.applied.push(paths.sdk_dir.clone());
        Ok(SyncReport::default())
    }

    fn refresh(&mut self, paths: &InstallPaths) -> dnvm_core::Result<SyncReport> {
        self.refreshed.push(paths.sdk_dir.clone());
        Ok(SyncReport::default())
    }

    fn needs_restart_notice(&self) -> bool {
        false
    }
}
