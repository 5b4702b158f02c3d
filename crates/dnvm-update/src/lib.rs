//! SDK installation and self-update for dnvm
//!
//! Provides:
//! - Channel resolution against the SDK feed's release index
//! - Archive download with progress tracking and extraction
//! - SDK install, update and selection with manifest bookkeeping
//! - The `current` directory link
//! - Self-install into the managed home
//! - Two-rename binary replacement with rollback

pub mod download;
pub mod error;
pub mod install;
pub mod link;
pub mod releases;
pub mod self_install;
pub mod updater;

pub use download::{ArchiveFetcher, ArchiveKind};
pub use error::{Result, UpdateError};
pub use install::{AvailableUpdate, InstallOutcome, SdkInstaller};
pub use link::retarget_current;
pub use releases::{ReleaseManager, ResolvedRelease, ToolRelease, ToolReleaseFeed};
pub use self_install::{
    ensure_self_contained, InstallState, SelfInstallOptions, SelfInstallReport, SelfInstaller,
    SelfUpdateLauncher, StagedBinary,
};
pub use updater::{BinarySwap, FileOps, StdFileOps, SwapReport};

/// Current dnvm version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
