//! Record builders shared by the store's unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use consult_shared::ProviderType;

use crate::models::{ExternalFolder, Group, Member, MemberRole, Message, Thread};

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn member(user: &str, role: MemberRole) -> Member {
    Member {
        user_id: user.into(),
        user_name: format!("{user} name"),
        user_picture: None,
        role,
        joined_at: at(0),
        last_read_at: at(0),
    }
}

pub fn group(id: &str, owner: &str) -> Group {
    Group {
        id: id.into(),
        name: format!("{id} name"),
        description: None,
        created_by: owner.into(),
        created_at: at(0),
        members: vec![member(owner, MemberRole::Admin)],
        is_private: false,
        last_message_at: None,
        unread_count: None,
    }
}

pub fn message(id: &str, group: &str, content: &str, minute: i64) -> Message {
    Message {
        id: id.into(),
        content: content.to_string(),
        author_id: "owner".into(),
        author_name: "owner name".to_string(),
        author_picture: None,
        timestamp: at(minute),
        group_id: group.into(),
        thread_id: None,
        attachments: Vec::new(),
        meeting_url: None,
        optimistic: false,
        edited: false,
        edited_at: None,
    }
}

pub fn thread(id: &str, group: &str, minute: i64) -> Thread {
    Thread {
        id: id.into(),
        parent_message_id: "m-parent".into(),
        group_id: group.into(),
        title: None,
        created_at: at(minute),
        last_message_at: at(minute),
        message_count: 0,
    }
}

pub fn folder(id: &str) -> ExternalFolder {
    ExternalFolder {
        id: id.into(),
        name: format!("{id} name"),
        path: format!("/shared/{id}"),
        provider: ProviderType::Drive,
        connected_by: "owner".into(),
        connected_at: at(0),
        last_sync_at: Some(at(0)),
    }
}
