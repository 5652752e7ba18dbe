//! Session module
//!
//! Holds the persisted credentials (`access`, `refresh`, optional `user`)
//! behind an injectable storage abstraction.
//!
//! # Overview
//!
//! - `TokenStore` - async key-value storage trait
//! - `MemoryStore` / `FileStore` - in-memory and JSON-file backends
//! - `Navigator` - hook receiving the entry route on teardown
//! - `RecordingNavigator` - test double that records teardown redirects
//! - `SessionContext` - the explicit session object handed to the client

mod context;
mod navigator;
mod store;

pub use context::SessionContext;
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
pub use store::{FileStore, MemoryStore, TokenStore};
