//! Session storage
//!
//! A small key/value store in SQLite. Each session keeps its transcript
//! under one key as a JSON array of messages.

mod schema;

pub use schema::chat_history_key;
use schema::SCHEMA;

use crate::session::Message;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt transcript under {key}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("Failed to serialize transcript: {0}")]
    Serialize(serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database
    #[allow(dead_code)] // Used by tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    // ==================== Raw Key/Value ====================

    pub fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM session_storage WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO session_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM session_storage WHERE key = ?1", params![key])?;
        Ok(())
    }

    // ==================== Transcript Operations ====================

    /// Load the stored transcript of a session, `None` on first visit
    pub fn load_transcript(&self, session_id: &str) -> DbResult<Option<Vec<Message>>> {
        let key = chat_history_key(session_id);
        let Some(raw) = self.get_item(&key)? else {
            return Ok(None);
        };
        let messages =
            serde_json::from_str(&raw).map_err(|source| DbError::Corrupt { key, source })?;
        Ok(Some(messages))
    }

    /// Overwrite the stored transcript of a session
    pub fn save_transcript(&self, session_id: &str, messages: &[Message]) -> DbResult<()> {
        let raw = serde_json::to_string(messages).map_err(DbError::Serialize)?;
        self.set_item(&chat_history_key(session_id), &raw)
    }

    /// Forget a session's transcript
    pub fn clear_transcript(&self, session_id: &str) -> DbResult<()> {
        self.remove_item(&chat_history_key(session_id))
    }
}
