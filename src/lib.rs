//! Decides when a running application should prompt its user to upgrade.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Feed     │────▶│  Decision   │◀────│ Alert state │
//! │ (normalize) │     │  (engine)   │     │   (store)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        ▲                   │                   ▲
//!        │                   ▼                   │
//! ┌─────────────┐     ┌─────────────┐            │
//! │  Providers  │     │   Session   │────────────┘
//! │ (json,file) │     │ (presenter) │   record shown / ignored
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`version`]: version parsing and ordering
//! - [`feed`]: release feed providers and normalization
//! - [`store`]: persisted alert state
//! - [`decision`]: the upgrade decision
//! - [`session`]: one check → prompt → record cycle
//! - [`config`]: configuration and data paths
//! - [`logging`]: tracing subscriber setup for the binary

pub mod clock;
pub mod config;
pub mod decision;
pub mod error;
pub mod feed;
pub mod logging;
pub mod session;
pub mod store;
pub mod version;
