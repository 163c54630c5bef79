use std::sync::Arc;

use chrono::{DateTime, Utc};

use consult_shared::{GroupId, MessageId};

use crate::models::Message;
use crate::store::ChatState;

impl ChatState {
    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn group_messages<'a>(&'a self, group: &'a GroupId) -> impl Iterator<Item = &'a Message> {
        self.messages.iter().filter(move |m| &m.group_id == group)
    }

    pub fn push_message(&mut self, message: Message) {
        Arc::make_mut(&mut self.messages).push(message);
    }

    /// Swap the message stored under `id` for `replacement`, keeping its
    /// position.  Returns `false` when `id` is no longer present.
    pub fn replace_message(&mut self, id: &MessageId, replacement: Message) -> bool {
        let Some(idx) = self.messages.iter().position(|m| &m.id == id) else {
            return false;
        };
        Arc::make_mut(&mut self.messages)[idx] = replacement;
        true
    }

    pub fn remove_message(&mut self, id: &MessageId) -> Option<Message> {
        let idx = self.messages.iter().position(|m| &m.id == id)?;
        Some(Arc::make_mut(&mut self.messages).remove(idx))
    }

    pub fn edit_message(&mut self, id: &MessageId, content: String, at: DateTime<Utc>) -> bool {
        let Some(idx) = self.messages.iter().position(|m| &m.id == id) else {
            return false;
        };
        let message = &mut Arc::make_mut(&mut self.messages)[idx];
        message.content = content;
        message.edited = true;
        message.edited_at = Some(at);
        true
    }
}
