//! The remote round-trip every workflow waits on.
//!
//! There is no real backend: [`SimulatedRemote`] sleeps for the configured
//! latency and optionally fails at random.  [`ScriptedRemote`] lets tests
//! decide each outcome up front and hold calls until released.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::BoxFuture;
use rand::Rng;
use tokio::sync::oneshot;
use tracing::debug;

use consult_shared::{FolderId, GroupId, ProviderType, RemoteError};

use crate::config::Latencies;
use crate::runtime::Delay;

/// What the workflow is asking the remote to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    SendMessage {
        group_id: GroupId,
    },
    UploadFile {
        group_id: GroupId,
        file_name: String,
        size: u64,
    },
    CreateMeeting {
        group_id: GroupId,
    },
    ConnectFolder {
        provider: ProviderType,
    },
    SyncFolder {
        folder_id: FolderId,
    },
}

pub trait Remote: Send + Sync + 'static {
    fn call(&self, call: RemoteCall) -> BoxFuture<'static, Result<(), RemoteError>>;
}

/// Latency-only remote with an optional random failure rate.
pub struct SimulatedRemote {
    delay: Arc<dyn Delay>,
    latencies: Latencies,
    failure_rate: f64,
}

impl SimulatedRemote {
    pub fn new(delay: Arc<dyn Delay>, latencies: Latencies, failure_rate: f64) -> Self {
        Self {
            delay,
            latencies,
            failure_rate,
        }
    }
}

impl Remote for SimulatedRemote {
    fn call(&self, call: RemoteCall) -> BoxFuture<'static, Result<(), RemoteError>> {
        let latency = self.latencies.for_call(&call);
        let fail = self.failure_rate > 0.0 && rand::thread_rng().gen::<f64>() < self.failure_rate;
        let sleep = self.delay.sleep(latency);

        Box::pin(async move {
            sleep.await;
            if fail {
                debug!(?call, "Simulated remote failure");
                Err(RemoteError::Rejected("simulated failure".into()))
            } else {
                Ok(())
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Scripted remote
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Script {
    outcomes: VecDeque<Result<(), RemoteError>>,
    hold: bool,
    parked: VecDeque<oneshot::Sender<()>>,
    calls: Vec<RemoteCall>,
}

/// Remote whose answers are queued in advance.  Calls succeed unless a
/// failure was queued with [`fail_next`](Self::fail_next).  While holding,
/// each call parks until one of the `release_*` methods lets it through.
#[derive(Default)]
pub struct ScriptedRemote {
    script: Mutex<Script>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue the outcome of the next call that is not yet decided.
    pub fn fail_next(&self, err: RemoteError) {
        self.script().outcomes.push_back(Err(err));
    }

    pub fn succeed_next(&self) {
        self.script().outcomes.push_back(Ok(()));
    }

    /// Park subsequent calls until released.
    pub fn hold(&self, hold: bool) {
        self.script().hold = hold;
    }

    /// Number of calls currently parked.
    pub fn parked(&self) -> usize {
        self.script().parked.len()
    }

    pub fn release_oldest(&self) -> bool {
        let tx = self.script().parked.pop_front();
        tx.map(|tx| tx.send(()).is_ok()).unwrap_or(false)
    }

    pub fn release_newest(&self) -> bool {
        let tx = self.script().parked.pop_back();
        tx.map(|tx| tx.send(()).is_ok()).unwrap_or(false)
    }

    pub fn release_all(&self) {
        let parked: Vec<_> = self.script().parked.drain(..).collect();
        for tx in parked {
            let _ = tx.send(());
        }
    }

    /// Every call received so far, in arrival order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.script().calls.clone()
    }
}

impl Remote for ScriptedRemote {
    fn call(&self, call: RemoteCall) -> BoxFuture<'static, Result<(), RemoteError>> {
        let mut script = self.script();
        script.calls.push(call);
        let outcome = script.outcomes.pop_front().unwrap_or(Ok(()));

        if script.hold {
            let (tx, rx) = oneshot::channel();
            script.parked.push_back(tx);
            Box::pin(async move {
                match rx.await {
                    Ok(()) => outcome,
                    Err(_) => Err(RemoteError::Unavailable),
                }
            })
        } else {
            Box::pin(async move {
                tokio::task::yield_now().await;
                outcome
            })
        }
    }
}
