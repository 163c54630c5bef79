//! Reducers for [`Thread`] records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use consult_shared::ThreadId;

use crate::models::Thread;
use crate::store::ChatState;

impl ChatState {
    pub fn thread(&self, id: &ThreadId) -> Option<&Thread> {
        self.threads.iter().find(|t| &t.id == id)
    }

    pub fn push_thread(&mut self, thread: Thread) {
        Arc::make_mut(&mut self.threads).push(thread);
    }

    /// Count one more message in the thread and move its activity time.
    pub fn record_thread_message(&mut self, id: &ThreadId, at: DateTime<Utc>) -> bool {
        let Some(idx) = self.threads.iter().position(|t| &t.id == id) else {
            return false;
        };
        let thread = &mut Arc::make_mut(&mut self.threads)[idx];
        thread.message_count += 1;
        thread.last_message_at = at;
        true
    }

    /// Undo one [`record_thread_message`](Self::record_thread_message) after
    /// the message it counted was removed.  The activity time falls back to
    /// the newest message still in the thread, or the creation time.
    pub fn rewind_thread(&mut self, id: &ThreadId) -> bool {
        let Some(idx) = self.threads.iter().position(|t| &t.id == id) else {
            return false;
        };
        let latest = self
            .messages
            .iter()
            .filter(|m| m.thread_id.as_ref() == Some(id))
            .map(|m| m.timestamp)
            .max();
        let thread = &mut Arc::make_mut(&mut self.threads)[idx];
        thread.message_count = thread.message_count.saturating_sub(1);
        thread.last_message_at = latest.unwrap_or(thread.created_at);
        true
    }
}
