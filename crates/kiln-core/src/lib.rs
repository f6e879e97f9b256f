#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core values shared by every kiln crate.
//!
//! - `mode` - the build mode and the environment snapshot it is derived from
//! - `hash` - content hashes and filename templates for content-addressed output
//!
//! Nothing here touches the filesystem or the process environment directly.

pub mod hash;
pub mod mode;

#[cfg(test)]
mod hash_tests;
#[cfg(test)]
mod mode_tests;

pub use hash::{ContentHash, FilenameTemplate, TemplateError};
pub use mode::{BuildMode, Environment, ParseModeError, derive_mode};
