//! Demo driver configuration loaded from environment variables.
//!
//! Chat core settings are delegated to [`ChatConfig::from_env`]; this layer
//! only adds who the demo user is and where snapshots go.

use std::path::PathBuf;

use consult_chat::ChatConfig;
use consult_shared::UserContext;

/// Where the session snapshot is kept between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Persistence {
    /// Nothing is saved.
    Off,
    /// The per-user data directory (`consult.db`).
    DefaultPath,
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Env: `CONSULT_USER_ID`
    /// Default: `demo-user`
    pub user_id: String,

    /// Env: `CONSULT_USER_NAME`
    /// Default: `Demo User`
    pub user_name: String,

    /// Env: `CONSULT_DB_PATH` (a file path, or `default` for the per-user
    /// data directory)
    /// Default: off
    pub persistence: Persistence,

    pub chat: ChatConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            user_id: "demo-user".to_string(),
            user_name: "Demo User".to_string(),
            persistence: Persistence::Off,
            chat: ChatConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            chat: ChatConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(id) = lookup("CONSULT_USER_ID").filter(|v| !v.trim().is_empty()) {
            config.user_id = id.trim().to_string();
        }

        if let Some(name) = lookup("CONSULT_USER_NAME").filter(|v| !v.trim().is_empty()) {
            config.user_name = name.trim().to_string();
        }

        if let Some(path) = lookup("CONSULT_DB_PATH") {
            config.persistence = match path.trim() {
                "" => Persistence::Off,
                "default" => Persistence::DefaultPath,
                other => Persistence::Path(PathBuf::from(other)),
            };
        }

        config
    }

    pub fn user(&self) -> UserContext {
        UserContext::new(self.user_id.as_str(), self.user_name.as_str())
    }
}
