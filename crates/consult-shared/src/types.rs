use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{MEETING_DURATIONS, TEMP_ID_PREFIX};
use crate::error::ChatError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identity handed over by the surrounding login layer.
    UserId
);
string_id!(GroupId);
string_id!(
    /// Message identifier.  Provisional messages carry a `temp-` prefixed
    /// id that can never collide with a permanent UUID.
    MessageId
);
string_id!(ThreadId);
string_id!(AttachmentId);
string_id!(FolderId);
string_id!(FolderItemId);

impl MessageId {
    pub fn provisional(seq: u64) -> Self {
        Self(format!("{TEMP_ID_PREFIX}{seq}"))
    }

    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }
}

/// The signed-in user as seen by the chat core.
///
/// Passed explicitly into every operation that needs an author; there is no
/// ambient "current user".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserContext {
    pub id: UserId,
    pub name: String,
    pub picture: Option<String>,
}

impl UserContext {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            picture: None,
        }
    }
}

/// Resolve an optional user context, failing with
/// [`ChatError::Unauthenticated`] when absent.
pub fn require_user(user: Option<&UserContext>) -> Result<&UserContext, ChatError> {
    user.ok_or(ChatError::Unauthenticated)
}

/// Storage provider behind an external folder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Drive,
    Dropbox,
    OneDrive,
    Local,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Dropbox => "dropbox",
            Self::OneDrive => "onedrive",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderType {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drive" => Ok(Self::Drive),
            "dropbox" => Ok(Self::Dropbox),
            "onedrive" => Ok(Self::OneDrive),
            "local" => Ok(Self::Local),
            other => Err(ChatError::Validation(format!(
                "unknown folder provider: {other:?}"
            ))),
        }
    }
}

/// Meeting length, restricted to the slots offered when scheduling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub struct MeetingDuration(u32);

impl MeetingDuration {
    pub fn minutes(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for MeetingDuration {
    type Error = ChatError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        if MEETING_DURATIONS.contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(ChatError::Validation(format!(
                "meeting duration must be one of {MEETING_DURATIONS:?} minutes, got {minutes}"
            )))
        }
    }
}

impl From<MeetingDuration> for u32 {
    fn from(d: MeetingDuration) -> Self {
        d.0
    }
}
