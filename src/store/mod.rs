//! Alert state persistence
//!
//! - [`kv`]: `KeyValueStore` trait and the in-memory backend
//! - [`sqlite`]: SQLite backend
//! - [`alert_state`]: `AlertState` and the store that owns it

pub mod alert_state;
pub mod kv;
pub mod sqlite;

pub use alert_state::{AlertState, AlertStateStore};
pub use kv::{KeyValueStore, MemoryStore};
pub use sqlite::SqliteStore;
