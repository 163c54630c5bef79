//! Chat workflows exposed on [`ChatService`](crate::ChatService).
//!
//! Each sub-module groups related operations by domain as an
//! `impl ChatService` block.  Validation always runs before the first store
//! transition, so a rejected call leaves the state untouched.

pub mod files;
pub mod folders;
pub mod groups;
pub mod meetings;
pub mod messaging;
pub mod threads;

use consult_shared::{ChatError, GroupId, ThreadId};
use consult_store::ChatState;

pub(crate) fn ensure_group(state: &ChatState, id: &GroupId) -> Result<(), ChatError> {
    match state.group(id) {
        Some(_) => Ok(()),
        None => Err(ChatError::NotFound(format!("group {id}"))),
    }
}

/// A thread reply must target a thread of the same group.
pub(crate) fn ensure_thread(
    state: &ChatState,
    group_id: &GroupId,
    id: Option<&ThreadId>,
) -> Result<(), ChatError> {
    let Some(id) = id else {
        return Ok(());
    };
    match state.thread(id) {
        None => Err(ChatError::NotFound(format!("thread {id}"))),
        Some(thread) if thread.group_id != *group_id => Err(ChatError::Validation(format!(
            "thread {id} belongs to group {}",
            thread.group_id
        ))),
        Some(_) => Ok(()),
    }
}

pub(crate) fn non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str, ChatError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ChatError::Validation(format!("{what} must not be empty")))
    } else {
        Ok(trimmed)
    }
}
