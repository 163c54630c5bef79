//! Derived state computed on demand from a [`ChatState`] snapshot.
//!
//! Nothing here is cached: every function scans the canonical collections,
//! so the answers are always consistent with the snapshot they are given.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;

use consult_shared::constants::{THREAD_PREVIEW_CHARS, UNREAD_BADGE_CAP};
use consult_shared::{GroupId, ThreadId, UserId};

use crate::models::{Message, Thread};
use crate::store::ChatState;

/// Sidebar row for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub id: GroupId,
    pub name: String,
    pub is_private: bool,
    pub member_count: usize,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread: usize,
    pub unread_badge: String,
    pub pending: usize,
}

/// Message count and activity time of a thread, recomputed from messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadStats {
    pub message_count: usize,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Newest timestamp among the group's messages.
pub fn last_message_at(state: &ChatState, group: &GroupId) -> Option<DateTime<Utc>> {
    state.group_messages(group).map(|m| m.timestamp).max()
}

/// Messages from other people that `user` has not read yet.  A user who is
/// not a member has read nothing.
pub fn unread_count(state: &ChatState, group: &GroupId, user: &UserId) -> usize {
    let last_read = state
        .group(group)
        .and_then(|g| g.member(user))
        .map(|m| m.last_read_at);

    state
        .group_messages(group)
        .filter(|m| &m.author_id != user)
        .filter(|m| last_read.map_or(true, |seen| m.timestamp > seen))
        .count()
}

pub fn unread_badge(count: usize) -> String {
    match count {
        0 => String::new(),
        n if n > UNREAD_BADGE_CAP => format!("{UNREAD_BADGE_CAP}+"),
        n => n.to_string(),
    }
}

/// Provisional messages of the group still waiting for confirmation.
pub fn pending_count(state: &ChatState, group: &GroupId) -> usize {
    state.group_messages(group).filter(|m| m.optimistic).count()
}

pub fn messages_in_group(state: &ChatState, group: &GroupId) -> Vec<Message> {
    state.group_messages(group).cloned().collect()
}

pub fn threads_in_group(state: &ChatState, group: &GroupId) -> Vec<Thread> {
    state
        .threads
        .iter()
        .filter(|t| &t.group_id == group)
        .cloned()
        .collect()
}

pub fn thread_stats(state: &ChatState, thread: &ThreadId) -> ThreadStats {
    let mut stats = ThreadStats {
        message_count: 0,
        last_message_at: None,
    };
    for m in state
        .messages
        .iter()
        .filter(|m| m.thread_id.as_ref() == Some(thread))
    {
        stats.message_count += 1;
        stats.last_message_at = stats.last_message_at.max(Some(m.timestamp));
    }
    stats
}

/// Content of the newest message in the thread, cut to a short preview.
pub fn thread_preview(state: &ChatState, thread: &ThreadId) -> String {
    let Some(last) = state
        .messages
        .iter()
        .rev()
        .find(|m| m.thread_id.as_ref() == Some(thread))
    else {
        return String::new();
    };

    let mut chars = last.content.chars();
    let preview: String = chars.by_ref().take(THREAD_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

/// Groups visible to `user` (public ones and those they belong to), most
/// recently active first.  Groups that never saw a message go last, in
/// insertion order.
pub fn group_overview(state: &ChatState, user: &UserId) -> Vec<GroupSummary> {
    let mut rows: Vec<GroupSummary> = state
        .groups
        .iter()
        .filter(|g| !g.is_private || g.is_member(user))
        .map(|g| {
            let unread = unread_count(state, &g.id, user);
            GroupSummary {
                id: g.id.clone(),
                name: g.name.clone(),
                is_private: g.is_private,
                member_count: g.members.len(),
                last_message_at: g.last_message_at,
                unread,
                unread_badge: unread_badge(unread),
                pending: pending_count(state, &g.id),
            }
        })
        .collect();

    // Stable sort: ties keep insertion order.
    rows.sort_by_key(|row| (row.last_message_at.is_none(), Reverse(row.last_message_at)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberRole;
    use crate::test_support::{at, group, member, message, thread};

    fn state_with_two_groups() -> ChatState {
        let mut state = ChatState::default();

        let mut g1 = group("g-1", "me");
        g1.members.push(member("advisor", MemberRole::Member));
        g1.last_message_at = Some(at(30));
        state.push_group(g1);

        let mut g2 = group("g-2", "advisor");
        g2.is_private = true;
        g2.last_message_at = Some(at(50));
        state.push_group(g2);

        let mut g3 = group("g-3", "me");
        g3.is_private = true;
        state.push_group(g3);

        for (id, g, minute, author) in [
            ("m-1", "g-1", 10, "me"),
            ("m-2", "g-1", 20, "advisor"),
            ("m-3", "g-1", 30, "advisor"),
            ("m-4", "g-2", 50, "advisor"),
        ] {
            let mut m = message(id, g, "text", minute);
            m.author_id = author.into();
            state.push_message(m);
        }
        state
    }

    #[test]
    fn test_last_message_at() {
        let state = state_with_two_groups();
        assert_eq!(last_message_at(&state, &"g-1".into()), Some(at(30)));
        assert_eq!(last_message_at(&state, &"g-3".into()), None);
    }

    #[test]
    fn test_unread_count_respects_last_read() {
        let mut state = state_with_two_groups();
        let me: UserId = "me".into();
        assert_eq!(unread_count(&state, &"g-1".into(), &me), 2);

        state.mark_member_read(&"g-1".into(), &me, at(25));
        assert_eq!(unread_count(&state, &"g-1".into(), &me), 1);

        // Not a member of g-2: everything from others is unread.
        assert_eq!(unread_count(&state, &"g-2".into(), &me), 1);
    }

    #[test]
    fn test_unread_badge() {
        assert_eq!(unread_badge(0), "");
        assert_eq!(unread_badge(3), "3");
        assert_eq!(unread_badge(9), "9");
        assert_eq!(unread_badge(12), "9+");
    }

    #[test]
    fn test_overview_orders_and_hides_private_groups() {
        let state = state_with_two_groups();
        let rows = group_overview(&state, &"me".into());
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        // g-2 is private and "me" is not a member; g-3 has no activity.
        assert_eq!(ids, ["g-1", "g-3"]);
        assert_eq!(rows[0].unread, 2);
        assert_eq!(rows[0].member_count, 2);

        let rows = group_overview(&state, &"advisor".into());
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["g-2", "g-1"]);
    }

    #[test]
    fn test_thread_stats_and_preview() {
        let mut state = ChatState::default();
        state.push_thread(thread("t-1", "g-1", 0));

        let long = "x".repeat(60);
        for (id, minute, content) in [("m-1", 1, "short"), ("m-2", 2, long.as_str())] {
            let mut m = message(id, "g-1", content, minute);
            m.thread_id = Some("t-1".into());
            state.push_message(m);
        }

        let stats = thread_stats(&state, &"t-1".into());
        assert_eq!(stats.message_count, 2);
        assert_eq!(stats.last_message_at, Some(at(2)));

        let preview = thread_preview(&state, &"t-1".into());
        assert_eq!(preview, format!("{}...", "x".repeat(50)));
        assert_eq!(thread_preview(&state, &"t-9".into()), "");
        assert_eq!(threads_in_group(&state, &"g-1".into()).len(), 1);
    }

    #[test]
    fn test_pending_count() {
        let mut state = state_with_two_groups();
        let mut m = message("temp-1", "g-1", "in flight", 40);
        m.optimistic = true;
        state.push_message(m);
        assert_eq!(pending_count(&state, &"g-1".into()), 1);
        assert_eq!(messages_in_group(&state, &"g-1".into()).len(), 4);
    }
}
