//! The chat service handle shared by every caller.
//!
//! [`ChatService`] is cheap to clone: all clones share one entity store, one
//! remote and one confirmation queue.  The workflows themselves live in
//! [`crate::commands`] as further `impl ChatService` blocks.

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tracing::trace;

use consult_shared::{GroupId, UserId};
use consult_store::projections::{self, GroupSummary};
use consult_store::{Activity, ChatState, EntityStore, ExternalFolder, Group, Message, Thread};

use crate::config::ChatConfig;
use crate::events::ChatEvent;
use crate::folder_source::{DemoFolderSource, FolderSource};
use crate::ordering::ConfirmationQueue;
use crate::remote::{Remote, SimulatedRemote};
use crate::runtime::{Clock, Delay, IdSource, RandomIds, SystemClock, TokioDelay};

pub(crate) struct Inner {
    pub config: ChatConfig,
    pub store: EntityStore,
    pub remote: Arc<dyn Remote>,
    pub folder_source: Arc<dyn FolderSource>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdSource>,
    pub confirmations: ConfirmationQueue,
    pub events: broadcast::Sender<ChatEvent>,
}

#[derive(Clone)]
pub struct ChatService {
    pub(crate) inner: Arc<Inner>,
}

impl ChatService {
    pub fn builder(config: ChatConfig) -> ChatServiceBuilder {
        ChatServiceBuilder {
            config,
            store: None,
            remote: None,
            folder_source: None,
            clock: None,
            ids: None,
            delay: None,
        }
    }

    /// Service over an empty store with the production seams.
    pub fn new(config: ChatConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &ChatConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.inner.store
    }

    pub(crate) fn emit(&self, event: ChatEvent) {
        // No subscriber is a normal condition.
        if self.inner.events.send(event).is_err() {
            trace!("No event subscribers");
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn groups(&self) -> Vec<Group> {
        self.inner.store.list_groups()
    }

    pub fn messages(&self, group: Option<&GroupId>) -> Vec<Message> {
        self.inner.store.list_messages(group)
    }

    pub fn threads(&self, group: Option<&GroupId>) -> Vec<Thread> {
        self.inner.store.list_threads(group)
    }

    pub fn folders(&self) -> Vec<ExternalFolder> {
        self.inner.store.list_folders()
    }

    pub fn current_group(&self) -> Option<Group> {
        self.inner.store.snapshot().current_group().cloned()
    }

    pub fn current_thread(&self) -> Option<Thread> {
        self.inner.store.snapshot().current_thread().cloned()
    }

    /// `true` while at least one upload is outstanding.
    pub fn is_loading(&self) -> bool {
        self.inner.store.snapshot().is_loading()
    }

    /// `true` while at least one folder connection is outstanding.
    pub fn is_connecting(&self) -> bool {
        self.inner.store.snapshot().is_connecting()
    }

    pub fn snapshot(&self) -> ChatState {
        self.inner.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.inner.store.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<ChatEvent> {
        self.inner.events.subscribe()
    }

    /// Sidebar rows for `user`, most recently active group first.
    pub fn overview(&self, user: &UserId) -> Vec<GroupSummary> {
        projections::group_overview(&self.inner.store.snapshot(), user)
    }
}

pub struct ChatServiceBuilder {
    config: ChatConfig,
    store: Option<EntityStore>,
    remote: Option<Arc<dyn Remote>>,
    folder_source: Option<Arc<dyn FolderSource>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdSource>>,
    delay: Option<Arc<dyn Delay>>,
}

impl ChatServiceBuilder {
    pub fn store(mut self, store: EntityStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn remote(mut self, remote: Arc<dyn Remote>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn folder_source(mut self, source: Arc<dyn FolderSource>) -> Self {
        self.folder_source = Some(source);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Delay used by the default remote and folder source.
    pub fn delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn build(self) -> ChatService {
        let config = self.config;
        let delay = self.delay.unwrap_or_else(|| Arc::new(TokioDelay));
        let remote = self.remote.unwrap_or_else(|| {
            Arc::new(SimulatedRemote::new(
                delay.clone(),
                config.latencies.clone(),
                config.failure_rate,
            ))
        });
        let folder_source = self.folder_source.unwrap_or_else(|| {
            Arc::new(DemoFolderSource::new(
                delay.clone(),
                config.latencies.folder_list,
            ))
        });
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        ChatService {
            inner: Arc::new(Inner {
                store: self.store.unwrap_or_default(),
                remote,
                folder_source,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                ids: self.ids.unwrap_or_else(|| Arc::new(RandomIds::new())),
                confirmations: ConfirmationQueue::new(),
                events,
                config,
            }),
        }
    }
}

/// Holds an activity counter up for as long as it lives.
pub(crate) struct ActivityGuard {
    store: EntityStore,
    activity: Activity,
}

impl ActivityGuard {
    pub fn begin(store: &EntityStore, activity: Activity) -> Self {
        store.apply(|s| s.begin(activity));
        Self {
            store: store.clone(),
            activity,
        }
    }
}

impl Drop for ActivityGuard {
    fn drop(&mut self) {
        let activity = self.activity;
        self.store.apply(|s| s.finish(activity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_guard_balances_counter() {
        let store = EntityStore::new();
        {
            let _outer = ActivityGuard::begin(&store, Activity::Loading);
            let _inner = ActivityGuard::begin(&store, Activity::Loading);
            assert_eq!(store.snapshot().loading_ops, 2);
        }
        assert!(!store.snapshot().is_loading());
    }

    #[test]
    fn test_clones_share_state() {
        let service = ChatService::new(ChatConfig::default());
        let other = service.clone();
        let user = consult_shared::UserContext::new("u-1", "Aiko");
        other
            .create_group(Some(&user), "Ops", None, false)
            .unwrap();
        assert_eq!(service.groups().len(), 1);
    }
}
