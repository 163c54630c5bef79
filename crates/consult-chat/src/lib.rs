//! # consult-chat
//!
//! Optimistic-update workflows of the consultation chat: sending messages
//! with provisional records and rollback, attachment uploads, meeting
//! issuance, external folders, and group/thread management.  Everything
//! runs against a [`consult_store::EntityStore`] and a [`remote::Remote`]
//! standing in for the network.

pub mod commands;
pub mod config;
pub mod events;
pub mod folder_source;
pub mod ordering;
pub mod remote;
pub mod runtime;
pub mod seed;
pub mod service;

#[cfg(test)]
mod test_support;

pub use commands::files::{FailedUpload, UploadBatch, UploadFile};
pub use config::{ChatConfig, Latencies};
pub use events::ChatEvent;
pub use service::{ChatService, ChatServiceBuilder};
