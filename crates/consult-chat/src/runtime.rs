//! Injectable time, delay and identifier sources.
//!
//! Production code uses [`SystemClock`], [`TokioDelay`] and [`RandomIds`].
//! Tests swap in [`ManualClock`], [`InstantDelay`] and [`SequentialIds`] so
//! every timestamp and identifier is known in advance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use consult_shared::constants::{MEETING_ID_LEN, MEETING_PASSWORD_LEN};
use consult_shared::MessageId;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Delay
// ---------------------------------------------------------------------------

/// Suspension standing in for network latency.
pub trait Delay: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

impl Delay for TokioDelay {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Yields to the scheduler once instead of sleeping, so the suspension
/// point is kept but no time passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantDelay;

impl Delay for InstantDelay {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::task::yield_now())
    }
}

// ---------------------------------------------------------------------------
// Identifiers and credentials
// ---------------------------------------------------------------------------

pub trait IdSource: Send + Sync + 'static {
    /// Identifier for a provisional message.  Must never look like a
    /// permanent id.
    fn temp_message_id(&self) -> MessageId;

    /// Identifier for a confirmed record (message, group, thread, ...).
    fn permanent_id(&self) -> String;

    /// Fixed-length numeric meeting id.
    fn meeting_id(&self) -> String;

    /// Short upper-case alphanumeric meeting password.
    fn meeting_password(&self) -> String;
}

/// UUIDs for records, random digits and letters for meeting credentials.
#[derive(Debug, Default)]
pub struct RandomIds {
    temp_seq: AtomicU64,
}

impl RandomIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for RandomIds {
    fn temp_message_id(&self) -> MessageId {
        MessageId::provisional(self.temp_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn permanent_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn meeting_id(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..MEETING_ID_LEN)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    fn meeting_password(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(MEETING_PASSWORD_LEN)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect()
    }
}

/// Deterministic ids: `id-1`, `id-2`, ... and matching meeting credentials.
#[derive(Debug, Default)]
pub struct SequentialIds {
    temp_seq: AtomicU64,
    seq: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl IdSource for SequentialIds {
    fn temp_message_id(&self) -> MessageId {
        MessageId::provisional(self.temp_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn permanent_id(&self) -> String {
        format!("id-{}", self.next())
    }

    fn meeting_id(&self) -> String {
        format!("{:0width$}", self.next(), width = MEETING_ID_LEN)
    }

    fn meeting_password(&self) -> String {
        format!("PW{:0width$}", self.next(), width = MEETING_PASSWORD_LEN - 2)
    }
}
