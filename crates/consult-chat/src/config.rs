//! Chat core configuration loaded from environment variables.
//!
//! All settings have defaults matching the simulated latencies of the
//! original portal, so the core can start with zero configuration.

use std::time::Duration;

use consult_shared::constants::{
    FOLDER_CONNECT_LATENCY_MS, FOLDER_LIST_LATENCY_MS, MAX_FILE_SIZE, MEETING_LATENCY_MS,
    SEND_LATENCY_MS, UPLOAD_LATENCY_MS,
};

use crate::remote::RemoteCall;

/// Simulated round-trip time per kind of remote call.
#[derive(Debug, Clone, PartialEq)]
pub struct Latencies {
    /// Env: `CONSULT_SEND_LATENCY_MS`
    pub send: Duration,
    /// Env: `CONSULT_UPLOAD_LATENCY_MS`
    pub upload: Duration,
    /// Env: `CONSULT_MEETING_LATENCY_MS`
    pub meeting: Duration,
    /// Env: `CONSULT_FOLDER_CONNECT_LATENCY_MS`
    pub folder_connect: Duration,
    /// Env: `CONSULT_FOLDER_LIST_LATENCY_MS`
    pub folder_list: Duration,
}

impl Latencies {
    pub fn for_call(&self, call: &RemoteCall) -> Duration {
        match call {
            RemoteCall::SendMessage { .. } => self.send,
            RemoteCall::UploadFile { .. } => self.upload,
            RemoteCall::CreateMeeting { .. } => self.meeting,
            RemoteCall::ConnectFolder { .. } | RemoteCall::SyncFolder { .. } => {
                self.folder_connect
            }
        }
    }

    pub fn zero() -> Self {
        Self {
            send: Duration::ZERO,
            upload: Duration::ZERO,
            meeting: Duration::ZERO,
            folder_connect: Duration::ZERO,
            folder_list: Duration::ZERO,
        }
    }
}

impl Default for Latencies {
    fn default() -> Self {
        Self {
            send: Duration::from_millis(SEND_LATENCY_MS),
            upload: Duration::from_millis(UPLOAD_LATENCY_MS),
            meeting: Duration::from_millis(MEETING_LATENCY_MS),
            folder_connect: Duration::from_millis(FOLDER_CONNECT_LATENCY_MS),
            folder_list: Duration::from_millis(FOLDER_LIST_LATENCY_MS),
        }
    }
}

/// Chat core configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub latencies: Latencies,

    /// Largest accepted attachment in bytes.
    /// Env: `CONSULT_MAX_UPLOAD_BYTES`
    /// Default: 50 MiB
    pub max_upload_size: usize,

    /// Probability in `[0, 1]` that a simulated remote call fails.
    /// Env: `CONSULT_FAILURE_RATE`
    /// Default: `0.0`
    pub failure_rate: f64,

    /// Buffer size of the change-event broadcast channel.
    /// Env: `CONSULT_EVENT_CAPACITY`
    /// Default: `256`
    pub event_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            latencies: Latencies::default(),
            max_upload_size: MAX_FILE_SIZE,
            failure_rate: 0.0,
            event_capacity: 256,
        }
    }
}

impl ChatConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.  Invalid values
    /// are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let millis = |key: &str, slot: &mut Duration| {
            if let Some(raw) = lookup(key) {
                match raw.trim().parse::<u64>() {
                    Ok(ms) => *slot = Duration::from_millis(ms),
                    Err(e) => tracing::warn!(key, value = %raw, error = %e, "Invalid latency, using default"),
                }
            }
        };
        millis("CONSULT_SEND_LATENCY_MS", &mut config.latencies.send);
        millis("CONSULT_UPLOAD_LATENCY_MS", &mut config.latencies.upload);
        millis("CONSULT_MEETING_LATENCY_MS", &mut config.latencies.meeting);
        millis(
            "CONSULT_FOLDER_CONNECT_LATENCY_MS",
            &mut config.latencies.folder_connect,
        );
        millis(
            "CONSULT_FOLDER_LIST_LATENCY_MS",
            &mut config.latencies.folder_list,
        );

        if let Some(raw) = lookup("CONSULT_MAX_UPLOAD_BYTES") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.max_upload_size = n,
                _ => tracing::warn!(value = %raw, "Invalid CONSULT_MAX_UPLOAD_BYTES, using default"),
            }
        }

        if let Some(raw) = lookup("CONSULT_FAILURE_RATE") {
            match raw.trim().parse::<f64>() {
                Ok(rate) if (0.0..=1.0).contains(&rate) => config.failure_rate = rate,
                _ => tracing::warn!(value = %raw, "CONSULT_FAILURE_RATE must be within [0, 1], using default"),
            }
        }

        if let Some(raw) = lookup("CONSULT_EVENT_CAPACITY") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.event_capacity = n,
                _ => tracing::warn!(value = %raw, "Invalid CONSULT_EVENT_CAPACITY, using default"),
            }
        }

        config
    }
}
