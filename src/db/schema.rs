//! Database schema and storage keys

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS session_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Storage key holding the serialized transcript of a session
pub fn chat_history_key(session_id: &str) -> String {
    format!("dungeonmind:{session_id}:chat_history")
}
