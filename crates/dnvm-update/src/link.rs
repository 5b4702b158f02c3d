//! The `current` link
//!
//! `<home>/current` is a directory link to the current SDK directory. On Unix
//! `<home>/dotnet` additionally links to that directory's `dotnet` executable
//! so that putting the home on `PATH` is enough.

use dnvm_core::{DnvmHome, SdkDirName};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, UpdateError};

/// Point the `current` link (and on Unix the `dotnet` link) at `dir`
pub fn retarget_current(home: &DnvmHome, dir: &SdkDirName) -> Result<()> {
    let target = home.sdk_dir(dir);
    let link = home.current_link();
    info!("Retargeting {} to {}", link.display(), target.display());

    replace_dir_link(&target, &link).map_err(|e| {
        UpdateError::install_failed(format!(
            "Could not link {} to {}: {}",
            link.display(),
            target.display(),
            e
        ))
    })?;

    #[cfg(unix)]
    {
        let exe = target.join("dotnet");
        let dotnet_link = home.dotnet_link();
        remove_link(&dotnet_link)
            .and_then(|_| std::os::unix::fs::symlink(&exe, &dotnet_link))
            .map_err(|e| {
                UpdateError::install_failed(format!(
                    "Could not link {} to {}: {}",
                    dotnet_link.display(),
                    exe.display(),
                    e
                ))
            })?;
    }

    Ok(())
}

fn replace_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    remove_link(link)?;

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;

    #[cfg(windows)]
    std::os::windows::fs::symlink_dir(target, link)?;

    Ok(())
}

/// Remove `path` if it is a link or a file. Real directories are left alone
/// and reported as an error.
fn remove_link(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    debug!("Removing existing link {}", path.display());
    if meta.file_type().is_symlink() {
        // Directory symlinks on Windows are removed like directories
        #[cfg(windows)]
        {
            if fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false) {
                return fs::remove_dir(path);
            }
        }
        fs::remove_file(path)
    } else if meta.is_dir() {
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} is a directory, not a link", path.display()),
        ))
    } else {
        fs::remove_file(path)
    }
}
