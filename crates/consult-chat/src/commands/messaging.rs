//! The optimistic send pipeline plus message edit and delete.
//!
//! A send moves through `Drafted -> Pending -> Confirmed | Failed`:
//!
//! * **Pending**: one transition appends the provisional message (with a
//!   `temp-` id and `optimistic = true`), moves the group's last-message
//!   time to now and, for a thread reply, bumps the thread counter.
//! * **Confirmed**: after the remote accepts and every earlier send of the
//!   same group has settled, the provisional is replaced in place by a copy
//!   with a permanent id.  The copy is taken from the store at that moment,
//!   so an edit made while pending is kept.
//! * **Failed**: the provisional is removed and the group and thread
//!   activity is recomputed from the messages that remain.

use tracing::{debug, info, warn};

use consult_shared::{require_user, ChatError, GroupId, MessageId, ThreadId, UserContext};
use consult_store::projections;
use consult_store::Message;

use super::{ensure_group, ensure_thread, non_blank};
use crate::events::ChatEvent;
use crate::remote::RemoteCall;
use crate::service::ChatService;

impl ChatService {
    /// Send `content` to the group, optionally as a thread reply, and return
    /// the permanent id once the remote has confirmed it.
    ///
    /// The provisional message is visible to readers from the first poll of
    /// the returned future until the outcome is known.
    pub async fn send_message(
        &self,
        user: Option<&UserContext>,
        group_id: &GroupId,
        content: &str,
        thread_id: Option<&ThreadId>,
    ) -> Result<MessageId, ChatError> {
        let user = require_user(user)?;
        non_blank(content, "message content")?;
        {
            let state = self.inner.store.snapshot();
            ensure_group(&state, group_id)?;
            ensure_thread(&state, group_id, thread_id)?;
        }

        let temp_id = self.inner.ids.temp_message_id();
        let now = self.inner.clock.now();
        let provisional = Message {
            id: temp_id.clone(),
            content: content.to_string(),
            author_id: user.id.clone(),
            author_name: user.name.clone(),
            author_picture: user.picture.clone(),
            timestamp: now,
            group_id: group_id.clone(),
            thread_id: thread_id.cloned(),
            attachments: Vec::new(),
            meeting_url: None,
            optimistic: true,
            edited: false,
            edited_at: None,
        };

        let mut turn = self.inner.confirmations.enqueue(group_id);
        self.inner.store.apply(|s| {
            s.push_message(provisional);
            s.touch_group(group_id, now);
            if let Some(thread) = thread_id {
                s.record_thread_message(thread, now);
            }
        });
        debug!(temp_id = %temp_id, group_id = %group_id, "Message pending");
        self.emit(ChatEvent::MessagePending {
            group_id: group_id.clone(),
            temp_id: temp_id.clone(),
        });

        let outcome = self
            .inner
            .remote
            .call(RemoteCall::SendMessage {
                group_id: group_id.clone(),
            })
            .await;
        turn.wait().await;

        match outcome {
            Ok(()) => {
                let message_id = MessageId::from(self.inner.ids.permanent_id());
                let replaced = self.inner.store.apply(|s| {
                    let Some(mut confirmed) = s.message(&temp_id).cloned() else {
                        return false;
                    };
                    confirmed.id = message_id.clone();
                    confirmed.optimistic = false;
                    s.replace_message(&temp_id, confirmed)
                });

                if replaced {
                    info!(msg_id = %message_id, temp_id = %temp_id, group_id = %group_id, "Message confirmed");
                    self.emit(ChatEvent::MessageConfirmed {
                        group_id: group_id.clone(),
                        temp_id,
                        message_id: message_id.clone(),
                    });
                } else {
                    debug!(temp_id = %temp_id, "Provisional message deleted before confirmation");
                }
                Ok(message_id)
            }
            Err(e) => {
                self.inner.store.apply(|s| {
                    s.remove_message(&temp_id);
                    let latest = projections::last_message_at(s, group_id);
                    s.set_last_message_at(group_id, latest);
                    if let Some(thread) = thread_id {
                        s.rewind_thread(thread);
                    }
                });
                warn!(temp_id = %temp_id, group_id = %group_id, error = %e, "Message send failed, rolled back");
                self.emit(ChatEvent::MessageRolledBack {
                    group_id: group_id.clone(),
                    temp_id,
                    reason: e.to_string(),
                });
                Err(ChatError::send_failed(e))
            }
        }
    }

    /// Replace the content of a message.  Returns `false` for an unknown id.
    pub fn edit_message(&self, message_id: &MessageId, content: &str) -> bool {
        let now = self.inner.clock.now();
        let edited = self
            .inner
            .store
            .apply(|s| s.edit_message(message_id, content.to_string(), now));
        if edited {
            debug!(msg_id = %message_id, "Message edited");
            self.emit(ChatEvent::MessageEdited {
                message_id: message_id.clone(),
            });
        }
        edited
    }

    /// Remove a message and recompute its group's last-message time.
    /// Returns `false` for an unknown id.
    pub fn delete_message(&self, message_id: &MessageId) -> bool {
        let removed = self.inner.store.apply(|s| {
            let removed = s.remove_message(message_id)?;
            let latest = projections::last_message_at(s, &removed.group_id);
            s.set_last_message_at(&removed.group_id, latest);
            Some(removed)
        });
        match removed {
            Some(_) => {
                debug!(msg_id = %message_id, "Message deleted");
                self.emit(ChatEvent::MessageDeleted {
                    message_id: message_id.clone(),
                });
                true
            }
            None => false,
        }
    }
}
