//! Reducers for [`Group`] records.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use consult_shared::{GroupId, UserId};

use crate::models::{Group, Member};
use crate::store::ChatState;

impl ChatState {
    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    pub fn push_group(&mut self, group: Group) {
        Arc::make_mut(&mut self.groups).push(group);
    }

    /// Run `f` against the group with `id`.  Returns `false` (and copies
    /// nothing) when no such group exists.
    pub fn update_group(&mut self, id: &GroupId, f: impl FnOnce(&mut Group)) -> bool {
        let Some(idx) = self.groups.iter().position(|g| &g.id == id) else {
            return false;
        };
        f(&mut Arc::make_mut(&mut self.groups)[idx]);
        true
    }

    /// Add `member` unless a member with the same user id is present.
    pub fn add_member(&mut self, id: &GroupId, member: Member) -> bool {
        let already = self
            .group(id)
            .map_or(true, |g| g.is_member(&member.user_id));
        if already {
            return false;
        }
        self.update_group(id, |g| g.members.push(member))
    }

    pub fn remove_member(&mut self, id: &GroupId, user_id: &UserId) -> bool {
        let present = self.group(id).is_some_and(|g| g.is_member(user_id));
        if !present {
            return false;
        }
        self.update_group(id, |g| g.members.retain(|m| &m.user_id != user_id))
    }

    pub fn touch_group(&mut self, id: &GroupId, at: DateTime<Utc>) -> bool {
        self.update_group(id, |g| g.last_message_at = Some(at))
    }

    pub fn set_last_message_at(&mut self, id: &GroupId, at: Option<DateTime<Utc>>) -> bool {
        self.update_group(id, |g| g.last_message_at = at)
    }

    pub fn mark_member_read(&mut self, id: &GroupId, user_id: &UserId, at: DateTime<Utc>) -> bool {
        let present = self.group(id).is_some_and(|g| g.is_member(user_id));
        if !present {
            return false;
        }
        self.update_group(id, |g| {
            if let Some(m) = g.members.iter_mut().find(|m| &m.user_id == user_id) {
                m.last_read_at = at;
            }
            g.unread_count = Some(0);
        })
    }
}
