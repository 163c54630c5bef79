//! Service wired with deterministic seams for workflow tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use consult_shared::UserContext;
use consult_store::{EntityStore, Group, Member, MemberRole};

use crate::config::ChatConfig;
use crate::remote::ScriptedRemote;
use crate::runtime::{InstantDelay, ManualClock, SequentialIds};
use crate::service::ChatService;

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
}

pub struct Harness {
    pub service: ChatService,
    pub remote: Arc<ScriptedRemote>,
    pub clock: Arc<ManualClock>,
    pub user: UserContext,
}

impl Harness {
    pub fn tick(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }
}

fn admin(user: &UserContext) -> Member {
    Member {
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_picture: None,
        role: MemberRole::Admin,
        joined_at: start(),
        last_read_at: start(),
    }
}

fn group(id: &str, user: &UserContext) -> Group {
    Group {
        id: id.into(),
        name: format!("{id} name"),
        description: None,
        created_by: user.id.clone(),
        created_at: start(),
        members: vec![admin(user)],
        is_private: false,
        last_message_at: None,
        unread_count: None,
    }
}

/// Empty groups `g-1` and `g-2` owned by the harness user.
pub fn harness() -> Harness {
    harness_with(ChatConfig::default())
}

pub fn harness_with(config: ChatConfig) -> Harness {
    let user = UserContext::new("u-1", "Aiko");
    let store = EntityStore::new();
    store.apply(|s| {
        s.push_group(group("g-1", &user));
        s.push_group(group("g-2", &user));
    });

    let remote = Arc::new(ScriptedRemote::new());
    let clock = Arc::new(ManualClock::new(start()));
    let service = ChatService::builder(config)
        .store(store)
        .remote(remote.clone())
        .clock(clock.clone())
        .ids(Arc::new(SequentialIds::new()))
        .delay(Arc::new(InstantDelay))
        .build();

    Harness {
        service,
        remote,
        clock,
        user,
    }
}
