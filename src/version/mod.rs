//! Application version parsing and ordering
//!
//! - [`semver`]: `AppVersion`, lenient parsing and string comparison

pub mod semver;

pub use semver::{AppVersion, CompareResult, compare_versions, parse_lenient};
