//! The in-memory entity store.
//!
//! [`ChatState`] holds every collection behind an `Arc<Vec<_>>`.  Mutations
//! go through [`EntityStore::apply`], which edits a state in place through
//! `Arc::make_mut` and publishes the result as one `watch` transition.
//! Anyone holding an older snapshot keeps the collections they cloned; a
//! collection is copied only when it is both shared and written to.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use consult_shared::{GroupId, ThreadId};

use crate::models::{ExternalFolder, Group, Message, Thread};

/// Outstanding-operation counters exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// File uploads.
    Loading,
    /// Folder connection handshakes.
    Connecting,
}

/// One immutable-by-convention view of every collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub groups: Arc<Vec<Group>>,
    pub messages: Arc<Vec<Message>>,
    pub threads: Arc<Vec<Thread>>,
    pub folders: Arc<Vec<ExternalFolder>>,

    /// Selected group, resolved against `groups` on read.
    pub current_group: Option<GroupId>,
    /// Selected thread, resolved against `threads` on read.
    pub current_thread: Option<ThreadId>,

    pub loading_ops: usize,
    pub connecting_ops: usize,

    /// Bumped once per published transition.
    pub version: u64,
}

impl ChatState {
    pub fn begin(&mut self, activity: Activity) {
        match activity {
            Activity::Loading => self.loading_ops += 1,
            Activity::Connecting => self.connecting_ops += 1,
        }
    }

    pub fn finish(&mut self, activity: Activity) {
        match activity {
            Activity::Loading => self.loading_ops = self.loading_ops.saturating_sub(1),
            Activity::Connecting => {
                self.connecting_ops = self.connecting_ops.saturating_sub(1)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading_ops > 0
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting_ops > 0
    }

    pub fn current_group(&self) -> Option<&Group> {
        let id = self.current_group.as_ref()?;
        self.group(id)
    }

    pub fn current_thread(&self) -> Option<&Thread> {
        let id = self.current_thread.as_ref()?;
        self.thread(id)
    }
}

/// Shared handle to the canonical state.  Cloning the handle shares the
/// same store.
#[derive(Debug, Clone)]
pub struct EntityStore {
    tx: Arc<watch::Sender<ChatState>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::with_state(ChatState::default())
    }

    pub fn with_state(state: ChatState) -> Self {
        let (tx, _rx) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Apply `f` to the current state and publish the result as a single
    /// transition.  Concurrent callers are serialized; every caller sees
    /// the state left by the previous one.
    pub fn apply<R>(&self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        let mut output = None;
        self.tx.send_modify(|state| {
            output = Some(f(state));
            state.version += 1;
            trace!(version = state.version, "store transition");
        });
        match output {
            Some(out) => out,
            None => unreachable!("send_modify always runs its closure"),
        }
    }

    /// Cheap copy of the current state.
    pub fn snapshot(&self) -> ChatState {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every published transition.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.tx.subscribe()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn list_groups(&self) -> Vec<Group> {
        self.tx.borrow().groups.as_ref().clone()
    }

    pub fn list_messages(&self, group: Option<&GroupId>) -> Vec<Message> {
        let state = self.tx.borrow();
        state
            .messages
            .iter()
            .filter(|m| group.map_or(true, |g| &m.group_id == g))
            .cloned()
            .collect()
    }

    pub fn list_threads(&self, group: Option<&GroupId>) -> Vec<Thread> {
        let state = self.tx.borrow();
        state
            .threads
            .iter()
            .filter(|t| group.map_or(true, |g| &t.group_id == g))
            .cloned()
            .collect()
    }

    pub fn list_folders(&self) -> Vec<ExternalFolder> {
        self.tx.borrow().folders.as_ref().clone()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
