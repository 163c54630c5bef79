//! Save and restore whole [`ChatState`] snapshots.
//!
//! A save replaces every row inside one transaction.  Provisional messages
//! and view state (selection, activity counters) are never written: a
//! restored state starts with nothing in flight.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::params;

use consult_shared::ProviderType;

use crate::database::Database;
use crate::error::Result;
use crate::models::{ExternalFolder, Group, Message, Thread};
use crate::store::ChatState;

impl Database {
    pub fn save_state(&mut self, state: &ChatState) -> Result<()> {
        let tx = self.conn_mut().transaction()?;

        tx.execute_batch(
            "DELETE FROM groups; DELETE FROM messages; DELETE FROM threads; DELETE FROM folders;",
        )?;

        for (pos, g) in state.groups.iter().enumerate() {
            tx.execute(
                "INSERT INTO groups (id, position, name, description, created_by, created_at,
                                     members_json, is_private, last_message_at, unread_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    g.id.as_str(),
                    pos as i64,
                    g.name,
                    g.description,
                    g.created_by.as_str(),
                    g.created_at.to_rfc3339(),
                    serde_json::to_string(&g.members)?,
                    g.is_private as i32,
                    g.last_message_at.map(|t| t.to_rfc3339()),
                    g.unread_count,
                ],
            )?;
        }

        let confirmed = state.messages.iter().filter(|m| !m.optimistic);
        for (pos, m) in confirmed.enumerate() {
            tx.execute(
                "INSERT INTO messages (id, position, group_id, thread_id, author_id, author_name,
                                       author_picture, content, timestamp, attachments_json,
                                       meeting_url, edited_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    m.id.as_str(),
                    pos as i64,
                    m.group_id.as_str(),
                    m.thread_id.as_ref().map(|t| t.as_str()),
                    m.author_id.as_str(),
                    m.author_name,
                    m.author_picture,
                    m.content,
                    m.timestamp.to_rfc3339(),
                    serde_json::to_string(&m.attachments)?,
                    m.meeting_url,
                    m.edited_at.map(|t| t.to_rfc3339()),
                ],
            )?;
        }

        for (pos, t) in state.threads.iter().enumerate() {
            tx.execute(
                "INSERT INTO threads (id, position, parent_message_id, group_id, title,
                                      created_at, last_message_at, message_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    t.id.as_str(),
                    pos as i64,
                    t.parent_message_id.as_str(),
                    t.group_id.as_str(),
                    t.title,
                    t.created_at.to_rfc3339(),
                    t.last_message_at.to_rfc3339(),
                    t.message_count,
                ],
            )?;
        }

        for (pos, f) in state.folders.iter().enumerate() {
            tx.execute(
                "INSERT INTO folders (id, position, name, path, provider, connected_by,
                                      connected_at, last_sync_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    f.id.as_str(),
                    pos as i64,
                    f.name,
                    f.path,
                    f.provider.as_str(),
                    f.connected_by.as_str(),
                    f.connected_at.to_rfc3339(),
                    f.last_sync_at.map(|t| t.to_rfc3339()),
                ],
            )?;
        }

        tx.commit()?;

        tracing::debug!(
            groups = state.groups.len(),
            messages = state.messages.len(),
            threads = state.threads.len(),
            folders = state.folders.len(),
            "snapshot saved"
        );
        Ok(())
    }

    pub fn load_state(&self) -> Result<ChatState> {
        let state = ChatState {
            groups: Arc::new(self.load_groups()?),
            messages: Arc::new(self.load_messages()?),
            threads: Arc::new(self.load_threads()?),
            folders: Arc::new(self.load_folders()?),
            ..ChatState::default()
        };

        tracing::debug!(
            groups = state.groups.len(),
            messages = state.messages.len(),
            "snapshot loaded"
        );
        Ok(state)
    }

    fn load_groups(&self) -> Result<Vec<Group>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, description, created_by, created_at, members_json,
                    is_private, last_message_at, unread_count
             FROM groups
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let created_by: String = row.get(3)?;
            let created_str: String = row.get(4)?;
            let members_json: String = row.get(5)?;
            let is_private: i32 = row.get(6)?;
            let last_str: Option<String> = row.get(7)?;

            Ok(Group {
                id: id.into(),
                name: row.get(1)?,
                description: row.get(2)?,
                created_by: created_by.into(),
                created_at: parse_ts(4, &created_str)?,
                members: serde_json::from_str(&members_json)
                    .map_err(|e| conversion_failure(5, e))?,
                is_private: is_private != 0,
                last_message_at: parse_opt_ts(7, last_str)?,
                unread_count: row.get(8)?,
            })
        })?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }

    fn load_messages(&self) -> Result<Vec<Message>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, group_id, thread_id, author_id, author_name, author_picture,
                    content, timestamp, attachments_json, meeting_url, edited_at
             FROM messages
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let group_id: String = row.get(1)?;
            let thread_id: Option<String> = row.get(2)?;
            let author_id: String = row.get(3)?;
            let ts_str: String = row.get(7)?;
            let attachments_json: String = row.get(8)?;
            let edited_at = parse_opt_ts(10, row.get(10)?)?;

            Ok(Message {
                id: id.into(),
                content: row.get(6)?,
                author_id: author_id.into(),
                author_name: row.get(4)?,
                author_picture: row.get(5)?,
                timestamp: parse_ts(7, &ts_str)?,
                group_id: group_id.into(),
                thread_id: thread_id.map(Into::into),
                attachments: serde_json::from_str(&attachments_json)
                    .map_err(|e| conversion_failure(8, e))?,
                meeting_url: row.get(9)?,
                optimistic: false,
                edited: edited_at.is_some(),
                edited_at,
            })
        })?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }

    fn load_threads(&self) -> Result<Vec<Thread>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, parent_message_id, group_id, title, created_at, last_message_at,
                    message_count
             FROM threads
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let parent: String = row.get(1)?;
            let group_id: String = row.get(2)?;
            let created_str: String = row.get(4)?;
            let last_str: String = row.get(5)?;

            Ok(Thread {
                id: id.into(),
                parent_message_id: parent.into(),
                group_id: group_id.into(),
                title: row.get(3)?,
                created_at: parse_ts(4, &created_str)?,
                last_message_at: parse_ts(5, &last_str)?,
                message_count: row.get(6)?,
            })
        })?;

        let mut threads = Vec::new();
        for row in rows {
            threads.push(row?);
        }
        Ok(threads)
    }

    fn load_folders(&self) -> Result<Vec<ExternalFolder>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, path, provider, connected_by, connected_at, last_sync_at
             FROM folders
             ORDER BY position ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let provider_str: String = row.get(3)?;
            let connected_by: String = row.get(4)?;
            let connected_str: String = row.get(5)?;

            Ok(ExternalFolder {
                id: id.into(),
                name: row.get(1)?,
                path: row.get(2)?,
                provider: provider_str
                    .parse::<ProviderType>()
                    .map_err(|e| conversion_failure(3, e))?,
                connected_by: connected_by.into(),
                connected_at: parse_ts(5, &connected_str)?,
                last_sync_at: parse_opt_ts(6, row.get(6)?)?,
            })
        })?;

        let mut folders = Vec::new();
        for row in rows {
            folders.push(row?);
        }
        Ok(folders)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn conversion_failure<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn parse_ts(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_failure(idx, e))
}

fn parse_opt_ts(idx: usize, s: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    s.map(|s| parse_ts(idx, &s)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, folder, group, message, thread};

    fn sample_state() -> ChatState {
        let mut state = ChatState::default();
        let mut g = group("g-1", "owner");
        g.last_message_at = Some(at(3));
        g.unread_count = Some(2);
        state.push_group(g);
        state.push_group(group("g-2", "owner"));

        state.push_message(message("m-1", "g-1", "first", 1));
        let mut pending = message("temp-1", "g-1", "in flight", 2);
        pending.optimistic = true;
        state.push_message(pending);
        let mut edited = message("m-2", "g-1", "second", 3);
        edited.thread_id = Some("t-1".into());
        edited.edited = true;
        edited.edited_at = Some(at(4));
        state.push_message(edited);

        let mut t = thread("t-1", "g-1", 1);
        t.message_count = 1;
        t.last_message_at = at(3);
        state.push_thread(t);
        state.push_folder(folder("f-1"));

        state.current_group = Some("g-1".into());
        state.loading_ops = 1;
        state
    }

    #[test]
    fn test_save_and_load_skips_provisional() {
        let mut db = Database::open_in_memory().unwrap();
        let state = sample_state();
        db.save_state(&state).unwrap();

        let loaded = db.load_state().unwrap();
        assert_eq!(loaded.groups, state.groups);
        assert_eq!(loaded.threads, state.threads);
        assert_eq!(loaded.folders, state.folders);

        let ids: Vec<_> = loaded.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m-1", "m-2"]);
        assert_eq!(loaded.messages[1], state.messages[2]);

        assert!(loaded.current_group.is_none());
        assert!(!loaded.is_loading());
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(&dir.path().join("snap.db")).unwrap();

        db.save_state(&sample_state()).unwrap();
        db.save_state(&ChatState::default()).unwrap();

        let loaded = db.load_state().unwrap();
        assert!(loaded.groups.is_empty());
        assert!(loaded.messages.is_empty());
    }
}
