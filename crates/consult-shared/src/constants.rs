/// Application name
pub const APP_NAME: &str = "Consult";

/// Prefix of provisional (not yet confirmed) message ids
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Simulated round-trip for a message send, in milliseconds
pub const SEND_LATENCY_MS: u64 = 500;

/// Simulated file upload time, in milliseconds
pub const UPLOAD_LATENCY_MS: u64 = 2_000;

/// Simulated meeting scheduling call, in milliseconds
pub const MEETING_LATENCY_MS: u64 = 1_500;

/// Simulated folder connection handshake, in milliseconds
pub const FOLDER_CONNECT_LATENCY_MS: u64 = 3_000;

/// Simulated folder listing fetch, in milliseconds
pub const FOLDER_LIST_LATENCY_MS: u64 = 1_000;

/// Maximum attachment size in bytes (50 MiB)
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Allowed meeting lengths in minutes
pub const MEETING_DURATIONS: [u32; 4] = [15, 30, 45, 60];

/// Number of digits in a meeting id
pub const MEETING_ID_LEN: usize = 10;

/// Number of characters in a meeting password
pub const MEETING_PASSWORD_LEN: usize = 6;

/// Meeting URLs
pub const MEETING_JOIN_BASE: &str = "https://zoom.us/j/";
pub const MEETING_START_BASE: &str = "https://zoom.us/s/";

/// Thread previews are cut at this many characters
pub const THREAD_PREVIEW_CHARS: usize = 50;

/// Unread badges saturate above this count ("9+")
pub const UNREAD_BADGE_CAP: usize = 9;
