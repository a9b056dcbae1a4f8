//! Release feed layer
//!
//! Providers fetch raw [`ReleaseEntry`] lists from wherever an application
//! publishes them; the normalizer reduces those to the one [`FeedResult`] a
//! check cycle reasons about.
//!
//! # Modules
//!
//! - [`provider`]: `FeedProvider` and `VersionProvider` traits
//! - [`providers`]: JSON-over-HTTP, file and in-memory providers
//! - [`normalizer`]: best-item / critical-item selection
//! - [`types`]: `ReleaseEntry`, `FeedResult`, `FeedRequest`, `HostInfo`

pub mod normalizer;
pub mod provider;
pub mod providers;
pub mod types;

pub use types::{FeedRequest, FeedResult, HostInfo, ReleaseEntry};
