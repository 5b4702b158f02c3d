//! Builders for isolated test homes

use dnvm_core::{DnvmHome, ManifestStore};
use semver::Version;
use std::fs;
use tempfile::TempDir;

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

    pub fn store(&self) -> ManifestStore {
        self.home.manifest_store()
    }

    /// Write raw manifest text
    pub fn with_manifest_text(self, text: &str) -> Self {
        fs::write(self.home.manifest_path(), text).expect("Failed to write manifest");
        self
    }
}

/// Parse a version literal
pub fn v(s: &str) -> Version {
    Version::parse(s).expect("valid version literal")
}
