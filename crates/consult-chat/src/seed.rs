//! Demo data for a fresh session.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use consult_shared::{GroupId, UserContext};
use consult_store::{ChatState, Group, Member, MemberRole, Message};

fn member(
    user_id: &str,
    name: &str,
    picture: Option<String>,
    role: MemberRole,
    joined_at: DateTime<Utc>,
    last_read_at: DateTime<Utc>,
) -> Member {
    Member {
        user_id: user_id.into(),
        user_name: name.to_string(),
        user_picture: picture,
        role,
        joined_at,
        last_read_at,
    }
}

fn message(id: &str, group: &str, content: &str, author: (&str, &str, Option<String>), at: DateTime<Utc>) -> Message {
    Message {
        id: id.into(),
        content: content.to_string(),
        author_id: author.0.into(),
        author_name: author.1.to_string(),
        author_picture: author.2,
        timestamp: at,
        group_id: group.into(),
        thread_id: None,
        attachments: Vec::new(),
        meeting_url: None,
        optimistic: false,
        edited: false,
        edited_at: None,
    }
}

/// Two consultation groups and a short conversation, with the first group
/// selected.  All times are relative to `now`.
pub fn demo_state(user: &UserContext, now: DateTime<Utc>) -> ChatState {
    let days = Duration::days;
    let hours = Duration::hours;
    let minutes = Duration::minutes;
    let me = user.id.as_str();

    let general = Group {
        id: "group-1".into(),
        name: "General consultation".into(),
        description: Some("General questions and consultations go here".into()),
        created_by: user.id.clone(),
        created_at: now - days(7),
        members: vec![
            member(me, &user.name, user.picture.clone(), MemberRole::Admin, now - days(7), now),
            member(
                "advisor-1",
                "Advisor Tanaka",
                None,
                MemberRole::Member,
                now - days(6),
                now - minutes(10),
            ),
        ],
        is_private: false,
        last_message_at: Some(now - minutes(30)),
        unread_count: Some(2),
    };

    let finance = Group {
        id: "group-2".into(),
        name: "Finance consultation".into(),
        description: Some("Specialist advice on finance and accounting".into()),
        created_by: "advisor-2".into(),
        created_at: now - days(5),
        members: vec![
            member(
                me,
                &user.name,
                user.picture.clone(),
                MemberRole::Member,
                now - days(5),
                now - hours(2),
            ),
            member("advisor-2", "CFO Sato", None, MemberRole::Admin, now - days(5), now),
        ],
        is_private: true,
        last_message_at: Some(now - hours(2)),
        unread_count: Some(0),
    };

    let messages = vec![
        message(
            "msg-1",
            "group-1",
            "Hello! I'd like advice on our new business plan. What material should I prepare?",
            (me, user.name.as_str(), user.picture.clone()),
            now - hours(1),
        ),
        message(
            "msg-2",
            "group-1",
            "Hello! For a business plan, please prepare:\n\n\
             1. Market analysis\n\
             2. Competitor analysis\n\
             3. Financial forecast (3 years)\n\
             4. Risk analysis\n\n\
             Let's go through the details on a video call.",
            ("advisor-1", "Advisor Tanaka", None),
            now - minutes(30),
        ),
        message(
            "msg-3",
            "group-2",
            "A question about the financial forecast: how should I estimate the revenue growth rate?",
            (me, user.name.as_str(), user.picture.clone()),
            now - hours(2),
        ),
    ];

    ChatState {
        groups: Arc::new(vec![general, finance]),
        messages: Arc::new(messages),
        current_group: Some(GroupId::from("group-1")),
        ..ChatState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::start;
    use consult_store::projections;

    #[test]
    fn test_demo_state_shape() {
        let user = UserContext::new("u-1", "Aiko");
        let state = demo_state(&user, start());

        assert_eq!(state.groups.len(), 2);
        assert_eq!(state.messages.len(), 3);
        assert!(state.threads.is_empty());
        assert_eq!(state.current_group().map(|g| g.id.as_str()), Some("group-1"));

        for group in state.groups.iter() {
            assert!(group.is_member(&user.id));
            assert_eq!(
                group.last_message_at,
                projections::last_message_at(&state, &group.id)
            );
        }
    }

    #[test]
    fn test_demo_overview() {
        let user = UserContext::new("u-1", "Aiko");
        let state = demo_state(&user, start());
        let rows = projections::group_overview(&state, &user.id);
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["group-1", "group-2"]);
        // group-1 was read up to `now`.
        assert_eq!(rows[0].unread, 0);

        let outsider = projections::group_overview(&state, &"u-9".into());
        assert_eq!(outsider.len(), 1);
    }
}
