//! # consult-demo
//!
//! Command-line driver for the consultation chat core.
//!
//! This binary:
//! - seeds (or restores) a chat session for a configured user
//! - runs a scripted session against the simulated remote: concurrent
//!   sends, a thread reply, uploads, a meeting and a folder connection
//! - logs every change event and prints the final group overview as JSON
//! - optionally saves the confirmed state to SQLite for the next run

mod config;
mod scenario;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use consult_chat::ChatService;
use consult_store::{ChatState, Database, EntityStore};

use crate::config::{DemoConfig, Persistence};

fn open_database(persistence: &Persistence) -> anyhow::Result<Option<Database>> {
    let db = match persistence {
        Persistence::Off => return Ok(None),
        Persistence::DefaultPath => Database::new().context("opening default database")?,
        Persistence::Path(path) => Database::open_at(path)
            .with_context(|| format!("opening database at {}", path.display()))?,
    };
    Ok(Some(db))
}

fn initial_state(db: Option<&Database>, config: &DemoConfig) -> anyhow::Result<ChatState> {
    if let Some(db) = db {
        let state = db.load_state().context("loading saved session")?;
        if !state.groups.is_empty() {
            info!(
                groups = state.groups.len(),
                messages = state.messages.len(),
                "Restored saved session"
            );
            return Ok(state);
        }
    }
    Ok(consult_chat::seed::demo_state(&config.user(), chrono::Utc::now()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,consult_chat=debug")),
        )
        .init();

    info!(
        "Starting {} demo v{}",
        consult_shared::constants::APP_NAME,
        env!("CARGO_PKG_VERSION")
    );

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = DemoConfig::from_env();
    info!(?config, "Loaded configuration");
    let user = config.user();

    // -----------------------------------------------------------------------
    // 3. Restore or seed the session
    // -----------------------------------------------------------------------
    let mut db = open_database(&config.persistence)?;
    if let Some(path) = db.as_ref().and_then(Database::path) {
        info!(path = %path.display(), "Snapshot database opened");
    }
    let mut state = initial_state(db.as_ref(), &config)?;
    if state.current_group.is_none() {
        state.current_group = state.groups.first().map(|g| g.id.clone());
    }

    let service = ChatService::builder(config.chat.clone())
        .store(EntityStore::with_state(state))
        .build();

    // -----------------------------------------------------------------------
    // 4. Log change events in the background
    // -----------------------------------------------------------------------
    let mut events = service.events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => debug!(event = %json, "Chat event"),
                    Err(e) => warn!(error = %e, "Failed to encode event"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // -----------------------------------------------------------------------
    // 5. Run the session (until done or Ctrl+C)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = scenario::run(&service, &user) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Session failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping session");
        }
    }

    // -----------------------------------------------------------------------
    // 6. Report and persist
    // -----------------------------------------------------------------------
    let overview = service.overview(&user.id);
    println!("{}", serde_json::to_string_pretty(&overview)?);

    if let Some(db) = db.as_mut() {
        db.save_state(&service.snapshot())
            .context("saving session snapshot")?;
        info!("Session saved");
    }

    Ok(())
}
