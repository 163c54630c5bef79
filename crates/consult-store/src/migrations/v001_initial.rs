//! v001 -- Initial schema creation.
//!
//! Creates the four snapshot tables: `groups`, `messages`, `threads` and
//! `folders`.  Each carries a `position` column so insertion order survives
//! a save/load cycle.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Groups
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS groups (
    id              TEXT PRIMARY KEY NOT NULL,
    position        INTEGER NOT NULL,
    name            TEXT NOT NULL,
    description     TEXT,
    created_by      TEXT NOT NULL,
    created_at      TEXT NOT NULL,              -- RFC-3339
    members_json    TEXT NOT NULL,              -- JSON array of members
    is_private      INTEGER NOT NULL DEFAULT 0, -- boolean 0/1
    last_message_at TEXT,
    unread_count    INTEGER
);

-- ----------------------------------------------------------------
-- Messages (confirmed only)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS messages (
    id               TEXT PRIMARY KEY NOT NULL,
    position         INTEGER NOT NULL,
    group_id         TEXT NOT NULL,
    thread_id        TEXT,
    author_id        TEXT NOT NULL,
    author_name      TEXT NOT NULL,
    author_picture   TEXT,
    content          TEXT NOT NULL,
    timestamp        TEXT NOT NULL,
    attachments_json TEXT NOT NULL,             -- JSON array of attachments
    meeting_url      TEXT,
    edited_at        TEXT
);

CREATE INDEX IF NOT EXISTS idx_messages_group_position
    ON messages(group_id, position);

-- ----------------------------------------------------------------
-- Threads
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS threads (
    id                TEXT PRIMARY KEY NOT NULL,
    position          INTEGER NOT NULL,
    parent_message_id TEXT NOT NULL,
    group_id          TEXT NOT NULL,
    title             TEXT,
    created_at        TEXT NOT NULL,
    last_message_at   TEXT NOT NULL,
    message_count     INTEGER NOT NULL DEFAULT 0
);

-- ----------------------------------------------------------------
-- External folders
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS folders (
    id           TEXT PRIMARY KEY NOT NULL,
    position     INTEGER NOT NULL,
    name         TEXT NOT NULL,
    path         TEXT NOT NULL,
    provider     TEXT NOT NULL,                 -- drive | dropbox | onedrive | local
    connected_by TEXT NOT NULL,
    connected_at TEXT NOT NULL,
    last_sync_at TEXT
);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
