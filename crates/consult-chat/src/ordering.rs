//! Per-group ordering of send confirmations.
//!
//! Each send takes a [`Turn`] when it is submitted.  After its remote call
//! returns it waits for the previous turn of the same group to be dropped,
//! applies its confirmation or rollback, then drops its own turn.  Groups
//! never wait on each other.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

use consult_shared::GroupId;

#[derive(Debug, Default)]
pub struct ConfirmationQueue {
    tails: Mutex<HashMap<GroupId, oneshot::Receiver<()>>>,
}

impl ConfirmationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next turn for `group`.
    pub fn enqueue(&self, group: &GroupId) -> Turn {
        let (done, tail) = oneshot::channel();
        let mut tails = self.tails.lock().unwrap_or_else(PoisonError::into_inner);
        let prev = tails.insert(group.clone(), tail).and_then(|mut prev| {
            // A finished predecessor has nothing left to wait for.
            match prev.try_recv() {
                Err(oneshot::error::TryRecvError::Empty) => Some(prev),
                _ => None,
            }
        });
        Turn {
            prev,
            _done: done,
        }
    }
}

/// A reserved place in a group's confirmation order.  Dropping it lets the
/// next turn of the group proceed.
#[derive(Debug)]
pub struct Turn {
    prev: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
}

impl Turn {
    /// Resolve once every earlier turn of the group has been dropped.
    pub async fn wait(&mut self) {
        if let Some(prev) = self.prev.take() {
            let _ = prev.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::poll;
    use std::task::Poll;

    #[tokio::test]
    async fn test_turns_resolve_in_submission_order() {
        let queue = ConfirmationQueue::new();
        let g1: GroupId = "g-1".into();

        let mut first = queue.enqueue(&g1);
        let mut second = queue.enqueue(&g1);

        let mut waiting = Box::pin(second.wait());
        assert_eq!(poll!(waiting.as_mut()), Poll::Pending);

        first.wait().await;
        drop(first);
        assert_eq!(poll!(waiting.as_mut()), Poll::Ready(()));
    }

    #[tokio::test]
    async fn test_groups_are_independent() {
        let queue = ConfirmationQueue::new();
        let _g1_turn = queue.enqueue(&"g-1".into());
        let mut g2_turn = queue.enqueue(&"g-2".into());

        let mut waiting = Box::pin(g2_turn.wait());
        assert_eq!(poll!(waiting.as_mut()), Poll::Ready(()));
    }

    #[tokio::test]
    async fn test_finished_predecessor_is_skipped() {
        let queue = ConfirmationQueue::new();
        let g1: GroupId = "g-1".into();
        drop(queue.enqueue(&g1));

        let mut turn = queue.enqueue(&g1);
        assert!(turn.prev.is_none());
        turn.wait().await;
    }
}
