//! Common test infrastructure for dnvm-update tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! # Modules
//!
//! - `constants`: SDK versions and binary contents
//! - `mock_server`: a wiremock SDK feed serving a release index and archives
//! - `updater_helpers`: fake binaries and failing filesystem operations

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod mock_server;
pub mod updater_helpers;

pub use constants::*;
pub use mock_server::*;
pub use updater_helpers::*;
