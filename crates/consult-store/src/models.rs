//! Domain model structs held by the entity store.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to a presentation layer or written to the snapshot database.
//! Cross-entity references are plain identifiers, never embedded records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use consult_shared::{
    AttachmentId, FolderId, FolderItemId, GroupId, MessageId, ProviderType, ThreadId, UserId,
};

// ---------------------------------------------------------------------------
// Group
// ---------------------------------------------------------------------------

/// Role of a member inside a group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    Member,
}

/// A user's membership in a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub user_name: String,
    pub user_picture: Option<String>,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
    /// Messages after this instant count as unread for the member.
    pub last_read_at: DateTime<Utc>,
}

/// A consultation group (conversation room).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub description: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    /// Ordered by join time; user ids are unique.
    pub members: Vec<Member>,
    pub is_private: bool,
    /// Advanced as soon as a send is submitted, rolled back on failure.
    pub last_message_at: Option<DateTime<Utc>>,
    /// Seeded unread hint.  The authoritative figure is
    /// [`crate::projections::unread_count`].
    pub unread_count: Option<u32>,
}

impl Group {
    pub fn member(&self, user_id: &UserId) -> Option<&Member> {
        self.members.iter().find(|m| &m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.member(user_id).is_some()
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Metadata for an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file_name: String,
    pub file_size: u64,
    pub mime_type: String,
    /// Content reference (`blob:<blake3 hex>`).
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
    pub author_picture: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub group_id: GroupId,
    pub thread_id: Option<ThreadId>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub meeting_url: Option<String>,
    /// `true` while the message awaits remote confirmation.
    #[serde(default)]
    pub optimistic: bool,
    #[serde(default)]
    pub edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Thread
// ---------------------------------------------------------------------------

/// A reply thread hanging off a parent message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thread {
    pub id: ThreadId,
    pub parent_message_id: MessageId,
    pub group_id: GroupId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub message_count: u32,
}

// ---------------------------------------------------------------------------
// External folders
// ---------------------------------------------------------------------------

/// A folder on an external storage provider linked into the portal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalFolder {
    pub id: FolderId,
    pub name: String,
    pub path: String,
    pub provider: ProviderType,
    pub connected_by: UserId,
    pub connected_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FolderItemKind {
    File,
    Folder,
}

/// One entry of a folder listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderItem {
    pub id: FolderItemId,
    pub name: String,
    pub kind: FolderItemKind,
    pub size: Option<u64>,
    pub mime_type: Option<String>,
    pub modified_at: DateTime<Utc>,
    pub parent_folder_id: Option<FolderItemId>,
    pub download_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Meetings
// ---------------------------------------------------------------------------

/// A scheduled video meeting.  Never stored as a collection; it is returned
/// to the caller and realized as a message in the target group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MeetingRecord {
    pub id: String,
    pub meeting_id: String,
    pub password: String,
    pub join_url: String,
    pub start_url: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub topic: String,
    pub duration_minutes: u32,
    pub scheduled_for: Option<DateTime<Utc>>,
}
