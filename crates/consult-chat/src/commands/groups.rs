//! Group membership, read markers and view selection.

use tracing::info;

use consult_shared::{require_user, ChatError, GroupId, ThreadId, UserContext};
use consult_store::{Group, Member, MemberRole};

use super::{ensure_group, non_blank};
use crate::events::ChatEvent;
use crate::service::ChatService;

fn member_from(user: &UserContext, role: MemberRole, at: chrono::DateTime<chrono::Utc>) -> Member {
    Member {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_picture: user.picture.clone(),
        role,
        joined_at: at,
        last_read_at: at,
    }
}

impl ChatService {
    /// Create a group with the caller as its only member and admin.
    pub fn create_group(
        &self,
        user: Option<&UserContext>,
        name: &str,
        description: Option<&str>,
        is_private: bool,
    ) -> Result<Group, ChatError> {
        let user = require_user(user)?;
        let name = non_blank(name, "group name")?;

        let now = self.inner.clock.now();
        let group = Group {
            id: GroupId::from(self.inner.ids.permanent_id()),
            name: name.to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            created_by: user.id.clone(),
            created_at: now,
            members: vec![member_from(user, MemberRole::Admin, now)],
            is_private,
            last_message_at: None,
            unread_count: Some(0),
        };

        self.inner.store.apply(|s| s.push_group(group.clone()));
        info!(group_id = %group.id, name = %group.name, is_private, "Group created");
        self.emit(ChatEvent::GroupCreated {
            group_id: group.id.clone(),
        });
        Ok(group)
    }

    /// Add the caller as a member.  Joining twice changes nothing.
    pub fn join_group(&self, user: Option<&UserContext>, group_id: &GroupId) -> Result<(), ChatError> {
        let user = require_user(user)?;
        ensure_group(&self.inner.store.snapshot(), group_id)?;

        let now = self.inner.clock.now();
        let member = member_from(user, MemberRole::Member, now);
        let added = self.inner.store.apply(|s| s.add_member(group_id, member));
        if added {
            info!(group_id = %group_id, user_id = %user.id, "Member joined");
            self.emit(ChatEvent::MemberJoined {
                group_id: group_id.clone(),
                user_id: user.id.clone(),
            });
        }
        Ok(())
    }

    /// Remove the caller from the group and drop the group and thread
    /// selection if it pointed there.
    pub fn leave_group(&self, user: Option<&UserContext>, group_id: &GroupId) -> Result<(), ChatError> {
        let user = require_user(user)?;
        ensure_group(&self.inner.store.snapshot(), group_id)?;

        let removed = self.inner.store.apply(|s| {
            let removed = s.remove_member(group_id, &user.id);
            if s.current_group.as_ref() == Some(group_id) {
                s.current_group = None;
            }
            if s.current_thread().is_some_and(|t| t.group_id == *group_id) {
                s.current_thread = None;
            }
            removed
        });
        if removed {
            info!(group_id = %group_id, user_id = %user.id, "Member left");
            self.emit(ChatEvent::MemberLeft {
                group_id: group_id.clone(),
                user_id: user.id.clone(),
            });
        }
        Ok(())
    }

    /// Everything in the group up to now counts as read by the caller.
    pub fn mark_read(&self, user: Option<&UserContext>, group_id: &GroupId) -> Result<(), ChatError> {
        let user = require_user(user)?;
        ensure_group(&self.inner.store.snapshot(), group_id)?;

        let now = self.inner.clock.now();
        self.inner
            .store
            .apply(|s| s.mark_member_read(group_id, &user.id, now));
        Ok(())
    }

    pub fn select_group(&self, group_id: Option<&GroupId>) -> Result<(), ChatError> {
        if let Some(id) = group_id {
            ensure_group(&self.inner.store.snapshot(), id)?;
        }
        self.inner
            .store
            .apply(|s| s.current_group = group_id.cloned());
        Ok(())
    }

    pub fn select_thread(&self, thread_id: Option<&ThreadId>) -> Result<(), ChatError> {
        if let Some(id) = thread_id {
            if self.inner.store.snapshot().thread(id).is_none() {
                return Err(ChatError::NotFound(format!("thread {id}")));
            }
        }
        self.inner
            .store
            .apply(|s| s.current_thread = thread_id.cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::harness;
    use consult_shared::UserId;

    #[test]
    fn test_create_group_makes_creator_admin() {
        let h = harness();
        let group = h
            .service
            .create_group(Some(&h.user), "  Security  ", Some(" audits "), true)
            .unwrap();

        assert_eq!(group.name, "Security");
        assert_eq!(group.description.as_deref(), Some("audits"));
        assert_eq!(group.members.len(), 1);
        assert_eq!(group.members[0].role, MemberRole::Admin);
        assert_eq!(group.members[0].user_id, h.user.id);
        assert_eq!(h.service.groups().last(), Some(&group));
    }

    #[test]
    fn test_create_group_validation_precedes_mutation() {
        let h = harness();
        let before = h.service.snapshot();

        assert_eq!(
            h.service.create_group(None, "Ops", None, false),
            Err(ChatError::Unauthenticated)
        );
        assert!(matches!(
            h.service.create_group(Some(&h.user), "   ", None, false),
            Err(ChatError::Validation(_))
        ));
        assert_eq!(h.service.snapshot(), before);
    }

    #[test]
    fn test_join_is_idempotent_and_leave_clears_selection() {
        let h = harness();
        let g1: GroupId = "g-1".into();
        let guest = UserContext::new("u-2", "Ren");

        h.service.join_group(Some(&guest), &g1).unwrap();
        h.service.join_group(Some(&guest), &g1).unwrap();
        let group = h.service.groups().into_iter().find(|g| g.id == g1).unwrap();
        assert_eq!(group.members.len(), 2);
        assert_eq!(group.members[1].role, MemberRole::Member);

        h.service.select_group(Some(&g1)).unwrap();
        h.service.leave_group(Some(&h.user), &g1).unwrap();
        assert!(h.service.current_group().is_none());
        let group = h.service.groups().into_iter().find(|g| g.id == g1).unwrap();
        assert!(!group.is_member(&h.user.id));
    }

    #[test]
    fn test_unknown_group_is_not_found() {
        let h = harness();
        let missing: GroupId = "missing".into();
        assert!(matches!(
            h.service.join_group(Some(&h.user), &missing),
            Err(ChatError::NotFound(_))
        ));
        assert!(matches!(
            h.service.select_group(Some(&missing)),
            Err(ChatError::NotFound(_))
        ));
        assert!(matches!(
            h.service.select_thread(Some(&"t-9".into())),
            Err(ChatError::NotFound(_))
        ));
    }

    #[test]
    fn test_leave_clears_thread_of_that_group() {
        let h = harness();
        let g1: GroupId = "g-1".into();
        let parent = "m-parent".into();
        let thread = h.service.create_thread(&parent, &g1, None).unwrap();
        h.service.select_group(Some(&g1)).unwrap();
        h.service.select_thread(Some(&thread.id)).unwrap();

        h.service.leave_group(Some(&h.user), &"g-2".into()).unwrap();
        assert_eq!(h.service.current_thread().map(|t| t.id), Some(thread.id));

        h.service.leave_group(Some(&h.user), &g1).unwrap();
        assert!(h.service.current_group().is_none());
        assert!(h.service.current_thread().is_none());
    }

    #[tokio::test]
    async fn test_mark_read_resets_unread() {
        let h = harness();
        let g1: GroupId = "g-1".into();
        let guest = UserContext::new("u-2", "Ren");
        h.service.join_group(Some(&guest), &g1).unwrap();

        h.tick(1);
        h.service
            .send_message(Some(&h.user), &g1, "hello", None)
            .await
            .unwrap();
        let guest_id: UserId = guest.id.clone();
        let unread = |svc: &ChatService| {
            consult_store::projections::unread_count(&svc.snapshot(), &g1, &guest_id)
        };
        assert_eq!(unread(&h.service), 1);

        h.tick(1);
        h.service.mark_read(Some(&guest), &g1).unwrap();
        assert_eq!(unread(&h.service), 0);
    }
}
