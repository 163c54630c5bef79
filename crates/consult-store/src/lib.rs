//! # consult-store
//!
//! Canonical state of the consultation chat: an in-memory entity store with
//! copy-on-write collections, the reducers that edit it, the derived-state
//! projections computed from it, and an optional SQLite adapter that saves
//! and restores whole snapshots.

pub mod database;
pub mod folders;
pub mod groups;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod projections;
pub mod snapshot;
pub mod store;
pub mod threads;

mod error;

#[cfg(test)]
mod test_support;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
pub use store::{Activity, ChatState, EntityStore};
