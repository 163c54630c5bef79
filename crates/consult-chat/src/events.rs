use serde::Serialize;

use consult_shared::{AttachmentId, FolderId, GroupId, MessageId, ThreadId, UserId};

/// Change notifications published on the service's broadcast channel.
///
/// The store's `watch` receiver tells a view *that* something changed; these
/// events say *what* changed, for callers that log or react to workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ChatEvent {
    GroupCreated {
        group_id: GroupId,
    },
    MemberJoined {
        group_id: GroupId,
        user_id: UserId,
    },
    MemberLeft {
        group_id: GroupId,
        user_id: UserId,
    },
    MessagePending {
        group_id: GroupId,
        temp_id: MessageId,
    },
    MessageConfirmed {
        group_id: GroupId,
        temp_id: MessageId,
        message_id: MessageId,
    },
    MessageRolledBack {
        group_id: GroupId,
        temp_id: MessageId,
        reason: String,
    },
    MessageEdited {
        message_id: MessageId,
    },
    MessageDeleted {
        message_id: MessageId,
    },
    ThreadCreated {
        group_id: GroupId,
        thread_id: ThreadId,
    },
    AttachmentUploaded {
        group_id: GroupId,
        attachment_id: AttachmentId,
        message_id: MessageId,
    },
    MeetingCreated {
        group_id: GroupId,
        meeting_id: String,
        message_id: MessageId,
    },
    FolderConnected {
        folder_id: FolderId,
    },
    FolderSynced {
        folder_id: FolderId,
    },
}
