//! Shared utility functions for dnvm crates

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Get the user's home directory
///
/// Prefers the HOME environment variable over dirs::home_dir() so that
/// shell profiles are resolved the same way the user's shell resolves them.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("HOME").filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    dirs::home_dir().ok_or(Error::HomeNotFound)
}

/// Replace a leading `user_home` in `path` with `$HOME`.
///
/// Paths outside the home directory are returned unchanged.
pub fn portable_home_path(path: &Path, user_home: &Path) -> String {
    match path.strip_prefix(user_home) {
        Ok(rest) if rest.as_os_str().is_empty() => "$HOME".to_string(),
        Ok(rest) => format!("$HOME/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}
