use tracing::info;

use consult_shared::{ChatError, GroupId, MessageId, ThreadId};
use consult_store::Thread;

use super::ensure_group;
use crate::events::ChatEvent;
use crate::service::ChatService;

impl ChatService {
    /// Open a reply thread under `parent`.  The parent id is not checked: it
    /// may still be a provisional id.
    pub fn create_thread(
        &self,
        parent: &MessageId,
        group_id: &GroupId,
        title: Option<&str>,
    ) -> Result<Thread, ChatError> {
        ensure_group(&self.inner.store.snapshot(), group_id)?;

        let now = self.inner.clock.now();
        let thread = Thread {
            id: ThreadId::from(self.inner.ids.permanent_id()),
            parent_message_id: parent.clone(),
            group_id: group_id.clone(),
            title: title
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            created_at: now,
            last_message_at: now,
            message_count: 0,
        };

        self.inner.store.apply(|s| s.push_thread(thread.clone()));
        info!(thread_id = %thread.id, group_id = %group_id, "Thread created");
        self.emit(ChatEvent::ThreadCreated {
            group_id: group_id.clone(),
            thread_id: thread.id.clone(),
        });
        Ok(thread)
    }
}
