//! Shared utilities for integration tests

#![allow(dead_code)]

mod fakes;
mod fixtures;

pub use fakes::{GatedFeedProvider, GatedPresenter, ScriptedPresenter};
pub use fixtures::{FeedFixture, build_session, start_time};
