//! Shell start-up file backend

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::vars::UserVarStore;
use super::{EnvironmentSync, InstallPaths, SyncReport};
use crate::error::Result;
use crate::utils::portable_home_path;

/// Profile files that get a sourcing line, relative to the user's home.
/// Only files that already exist are touched.
pub const PROFILE_FILES: [&str; 3] = [".profile", ".bashrc", ".zshrc"];

const ENV_SCRIPT_TEMPLATE: &str = include_str!("../../../../embedded/env.sh");

/// Fill in the environment script template
pub fn render_env_script(paths: &InstallPaths) -> String {
    ENV_SCRIPT_TEMPLATE
        .replace("{install_loc}", &paths.home.to_string_lossy())
        .replace("{sdk_install_loc}", &paths.sdk_dir.to_string_lossy())
}

/// The line that sources `script` (already made portable)
pub fn source_line(script: &str) -> String {
    format!(". \"{}\"", script)
}

fn source_block(script: &str) -> String {
    format!("if [ -f \"{0}\" ]; then\n    {1}\nfi\n", script, source_line(script))
}

/// Backend that writes `<home>/env` and sources it from shell profiles
#[derive(Debug)]
pub struct ShellProfileSync<S: UserVarStore> {
    env_script: PathBuf,
    user_home: PathBuf,
    vars: S,
}

impl<S: UserVarStore> ShellProfileSync<S> {
    pub fn new(env_script: PathBuf, user_home: &Path, vars: S) -> Self {
        Self {
            env_script,
            user_home: user_home.to_path_buf(),
            vars,
        }
    }

    /// Write the environment script for `paths`
    pub fn write_env_script(&self, paths: &InstallPaths) -> Result<()> {
        if let Some(parent) = self.env_script.parent() {
            fs::create_dir_all(parent)?;
        }
        info!("Writing env script to {}", self.env_script.display());
        fs::write(&self.env_script, render_env_script(paths))?;
        Ok(())
    }

    /// Append a sourcing block to every existing profile file that lacks one
    pub fn add_to_profiles(&self, report: &mut SyncReport) {
        let script = portable_home_path(&self.env_script, &self.user_home);
        let absolute = self.env_script.to_string_lossy();
        let targets = [script.as_str(), absolute.as_ref()];

        for name in PROFILE_FILES {
            let profile = self.user_home.join(name);
            if !profile.is_file() {
                continue;
            }

            match append_if_missing(&profile, &targets, &source_block(&script)) {
                Ok(true) => {
                    info!("Added dnvm to {}", profile.display());
                    report.changes.push(format!("Updated {}", profile.display()));
                }
                Ok(false) => debug!("{} already sources {}", profile.display(), script),
                Err(e) => {
                    warn!("Could not update {}: {}", profile.display(), e);
                    report.skipped.push(profile);
                }
            }
        }
    }
}

/// Whether `line` runs `.` or `source` on one of `targets`
fn sources_any(line: &str, targets: &[&str]) -> bool {
    let line = line.trim_start();
    let command = line.strip_prefix("source").or_else(|| line.strip_prefix('.'));
    match command {
        Some(rest) if rest.starts_with(char::is_whitespace) => {
            let rest = rest.split('#').next().unwrap_or_default();
            targets.iter().any(|t| rest.contains(t))
        }
        _ => false,
    }
}

/// Append `block` unless some line of the file already sources one of
/// `targets`
fn append_if_missing(profile: &Path, targets: &[&str], block: &str) -> std::io::Result<bool> {
    let content = fs::read_to_string(profile)?;
    if content.lines().any(|l| sources_any(l, targets)) {
        return Ok(false);
    }

    let mut file = OpenOptions::new().append(true).open(profile)?;
    if !content.is_empty() && !content.ends_with('\n') {
        writeln!(file)?;
    }
    write!(file, "{}", block)?;
    Ok(true)
}

impl<S: UserVarStore> EnvironmentSync for ShellProfileSync<S> {
    fn get(&self, name: &str) -> Result<Option<String>> {
        self.vars.get(name)
    }

    fn set(&mut self, name: &str, value: &str) -> Result<()> {
        self.vars.set(name, value)
    }

    fn apply(&mut self, paths: &InstallPaths) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        self.write_env_script(paths)?;
        report
            .changes
            .push(format!("Wrote {}", self.env_script.display()));
        self.add_to_profiles(&mut report);
        Ok(report)
    }

    fn refresh(&mut self, paths: &InstallPaths) -> Result<SyncReport> {
        let mut report = SyncReport::default();
        self.write_env_script(paths)?;
        report
            .changes
            .push(format!("Wrote {}", self.env_script.display()));
        Ok(report)
    }

    fn needs_restart_notice(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryVarStore;
    use crate::home::DnvmHome;
    use crate::sdk_dir::SdkDirName;
    use tempfile::TempDir;

    struct Fixture {
        _user_home: TempDir,
        user: PathBuf,
        home: DnvmHome,
    }

    fn fixture() -> Fixture {
        let user_home = TempDir::new().unwrap();
        let user = user_home.path().to_path_buf();
        let home = DnvmHome::new(user.join(".local/share/dnvm"));
        Fixture {
            _user_home: user_home,
            user,
            home,
        }
    }

    fn sync(f: &Fixture) -> ShellProfileSync<MemoryVarStore> {
        ShellProfileSync::new(f.home.env_script_path(), &f.user, MemoryVarStore::default())
    }

    #[test]
    fn test_env_script_substitutes_paths() {
        let paths = InstallPaths::new(&DnvmHome::new("/opt/dnvm"), &SdkDirName::default_dir());
        let script = render_env_script(&paths);

        assert!(script.contains("export PATH=\"/opt/dnvm:$PATH\""));
        assert!(script.contains(&format!(
            "export DOTNET_ROOT=\"{}\"",
            paths.sdk_dir.display()
        )));
        assert!(!script.contains("{install_loc}"));
        assert!(!script.contains("{sdk_install_loc}"));
    }

    #[test]
    fn test_apply_sources_env_from_existing_profiles() {
        let f = fixture();
        fs::write(f.user.join(".bashrc"), "alias ll='ls -l'").unwrap();
        fs::write(f.user.join(".profile"), "").unwrap();

        let mut sync = sync(&f);
        let report = sync
            .apply(&InstallPaths::new(&f.home, &SdkDirName::default_dir()))
            .unwrap();

        assert!(f.home.env_script_path().is_file());
        assert!(!f.user.join(".zshrc").exists());

        let bashrc = fs::read_to_string(f.user.join(".bashrc")).unwrap();
        assert!(bashrc.starts_with("alias ll='ls -l'\n"));
        assert!(bashrc.contains(". \"$HOME/.local/share/dnvm/env\""));
        assert!(bashrc.contains("if [ -f \"$HOME/.local/share/dnvm/env\" ]; then"));

        assert_eq!(report.changes.len(), 3);
        assert!(report.skipped.is_empty());
        assert!(!sync.needs_restart_notice());
    }

    #[test]
    fn test_apply_is_idempotent() {
        let f = fixture();
        fs::write(f.user.join(".zshrc"), "").unwrap();
        let paths = InstallPaths::new(&f.home, &SdkDirName::default_dir());

        let mut sync = sync(&f);
        sync.apply(&paths).unwrap();
        let once = fs::read_to_string(f.user.join(".zshrc")).unwrap();
        sync.apply(&paths).unwrap();
        let twice = fs::read_to_string(f.user.join(".zshrc")).unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.matches(". \"$HOME/.local/share/dnvm/env\"").count(), 1);
    }

    #[test]
    fn test_existing_source_lines_are_recognised() {
        let f = fixture();
        let absolute = f.home.env_script_path().display().to_string();
        fs::write(f.user.join(".bashrc"), "source \"$HOME/.local/share/dnvm/env\"\n").unwrap();
        fs::write(
            f.user.join(".zshrc"),
            ". \"$HOME/.local/share/dnvm/env\" # dnvm\n",
        )
        .unwrap();
        fs::write(f.user.join(".profile"), format!("  . {}\n", absolute)).unwrap();

        let mut sync = sync(&f);
        let report = sync
            .apply(&InstallPaths::new(&f.home, &SdkDirName::default_dir()))
            .unwrap();

        assert_eq!(report.changes.len(), 1, "{:?}", report.changes);
        for name in PROFILE_FILES {
            let content = fs::read_to_string(f.user.join(name)).unwrap();
            assert!(!content.contains("if [ -f"), "{} was modified", name);
        }
    }

    #[test]
    fn test_commented_or_unrelated_lines_do_not_count() {
        let targets = ["$HOME/.local/share/dnvm/env"];
        assert!(sources_any("source $HOME/.local/share/dnvm/env", &targets));
        assert!(!sources_any("# . \"$HOME/.local/share/dnvm/env\"", &targets));
        assert!(!sources_any("echo $HOME/.local/share/dnvm/env", &targets));
        assert!(!sources_any(". \"$HOME/.cargo/env\" # $HOME/.local/share/dnvm/env", &targets));
        assert!(!sources_any(".dnvm", &targets));
    }

    #[test]
    fn test_refresh_rewrites_script_without_touching_profiles() {
        let f = fixture();
        fs::write(f.user.join(".bashrc"), "").unwrap();
        let preview = SdkDirName::new("preview").unwrap();

        let mut sync = sync(&f);
        sync.refresh(&InstallPaths::new(&f.home, &preview)).unwrap();

        let script = fs::read_to_string(f.home.env_script_path()).unwrap();
        assert!(script.contains(&f.home.sdk_dir(&preview).display().to_string()));
        assert_eq!(fs::read_to_string(f.user.join(".bashrc")).unwrap(), "");
    }

    #[test]
    fn test_home_outside_user_home_uses_absolute_path() {
        let f = fixture();
        let elsewhere = TempDir::new().unwrap();
        let home = DnvmHome::new(elsewhere.path());
        fs::write(f.user.join(".profile"), "").unwrap();

        let mut sync = ShellProfileSync::new(home.env_script_path(), &f.user, MemoryVarStore::default());
        sync.apply(&InstallPaths::new(&home, &SdkDirName::default_dir()))
            .unwrap();

        let profile = fs::read_to_string(f.user.join(".profile")).unwrap();
        assert!(profile.contains(&source_line(&home.env_script_path().display().to_string())));
    }

    #[cfg(unix)]
    #[test]
    fn test_unwritable_profile_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let f = fixture();
        let bashrc = f.user.join(".bashrc");
        fs::write(&bashrc, "").unwrap();
        fs::set_permissions(&bashrc, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores file permissions
        if fs::read_to_string(&bashrc).is_ok() {
            return;
        }

        let mut sync = sync(&f);
        let report = sync
            .apply(&InstallPaths::new(&f.home, &SdkDirName::default_dir()))
            .unwrap();
        assert_eq!(report.skipped, vec![bashrc]);
    }
}
