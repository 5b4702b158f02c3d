//! Common test infrastructure for dnvm-core tests
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
//! - `fixtures`: manifest fixture loading helpers
//! - `builders`: isolated managed homes and manifest shorthands

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod fixtures;

pub use builders::*;
pub use fixtures::*;
