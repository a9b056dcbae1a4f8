//! Upgrade decision layer
//!
//! - [`engine`]: `evaluate` and the `DecisionEngine` wrapper
//! - [`observer`]: `DecisionObserver` hook

pub mod engine;
pub mod observer;

pub use engine::{Decision, DecisionContext, DecisionEngine, DecisionReason, evaluate};
pub use observer::{DecisionObserver, DecisionReport};
